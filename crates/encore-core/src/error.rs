// SPDX-FileCopyrightText: 2026 Encore Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Encore request queue.

use thiserror::Error;

use crate::types::OrderId;

/// The error type returned by every queue command and storage operation.
///
/// Errors are local to a single command: a failed command leaves the
/// visible queue state untouched.
#[derive(Debug, Error)]
pub enum EncoreError {
    /// Required input is missing or malformed.
    #[error("validation error: {0}")]
    Validation(String),

    /// No order with this id exists.
    #[error("order {id} not found")]
    NotFound { id: OrderId },

    /// A reorder request did not name exactly the active orders.
    #[error("reorder mismatch: expected {expected} active orders, got {received} ids")]
    ReorderMismatch { expected: usize, received: usize },

    /// Storage backend failure (connection, query, serialization).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Invalid configuration detected at runtime.
    #[error("configuration error: {0}")]
    Config(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl EncoreError {
    /// Returns true for errors caused by the caller's input rather than the server.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::Validation(_) | Self::NotFound { .. } | Self::ReorderMismatch { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_message_names_the_id() {
        let err = EncoreError::NotFound { id: OrderId(42) };
        assert_eq!(err.to_string(), "order 42 not found");
    }

    #[test]
    fn client_errors_are_classified() {
        assert!(EncoreError::Validation("x".into()).is_client_error());
        assert!(
            EncoreError::ReorderMismatch {
                expected: 1,
                received: 0
            }
            .is_client_error()
        );
        assert!(!EncoreError::Internal("x".into()).is_client_error());
        assert!(
            !EncoreError::Storage {
                source: "locked".into()
            }
            .is_client_error()
        );
    }
}
