// SPDX-FileCopyrightText: 2026 Encore Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Storage trait for request-store backends (in-memory, SQLite, ...).

use async_trait::async_trait;

use crate::error::EncoreError;
use crate::types::{Changeset, HealthStatus, HistoryEntry, Order, OrderId};

/// Persistence for orders and the history archive.
///
/// The queue engine never mutates records directly; it computes a
/// [`Changeset`] per command and hands it to [`QueueStore::commit`], which
/// must apply it atomically. Callers serialize commits, so backends only need
/// to guarantee that a single changeset is all-or-nothing.
#[async_trait]
pub trait QueueStore: Send + Sync + 'static {
    /// Human-readable backend name.
    fn name(&self) -> &str;

    /// Opens connections and runs migrations. Must be called once before use.
    async fn initialize(&self) -> Result<(), EncoreError>;

    /// All orders, sorted by position then creation time.
    async fn load_orders(&self) -> Result<Vec<Order>, EncoreError>;

    /// Highest order id ever stored, including ids that only survive in history.
    async fn highest_order_id(&self) -> Result<Option<OrderId>, EncoreError>;

    /// Applies a changeset atomically.
    async fn commit(&self, changes: Changeset) -> Result<(), EncoreError>;

    /// History snapshots, newest first.
    async fn list_history(&self) -> Result<Vec<HistoryEntry>, EncoreError>;

    async fn health_check(&self) -> Result<HealthStatus, EncoreError>;

    /// Flushes pending writes and releases resources.
    async fn close(&self) -> Result<(), EncoreError>;
}
