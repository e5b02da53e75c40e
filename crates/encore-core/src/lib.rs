// SPDX-FileCopyrightText: 2026 Encore Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Encore karaoke request queue.
//!
//! Holds the domain model shared by every other crate in the workspace:
//! orders (song requests), notifications, history entries, realtime events,
//! the [`Changeset`] unit of atomic mutation, the [`EncoreError`] taxonomy,
//! and the [`QueueStore`] trait implemented by storage backends.

pub mod error;
pub mod traits;
pub mod types;

pub use error::EncoreError;
pub use traits::QueueStore;
pub use types::{
    Changeset, HealthStatus, HistoryEntry, Notification, NotificationKind, Order, OrderId,
    OrderKind, OrderStatus, QueueEvent, TIMESTAMP_FORMAT, TableId, timestamp_now,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encore_error_has_all_variants() {
        let _validation = EncoreError::Validation("song_title is required".into());
        let _not_found = EncoreError::NotFound { id: OrderId(7) };
        let _mismatch = EncoreError::ReorderMismatch {
            expected: 3,
            received: 2,
        };
        let _storage = EncoreError::Storage {
            source: Box::new(std::io::Error::other("disk")),
        };
        let _config = EncoreError::Config("bad".into());
        let _internal = EncoreError::Internal("oops".into());
    }

    #[test]
    fn store_trait_is_object_safe() {
        fn _assert_object_safe(_: &dyn QueueStore) {}
    }
}
