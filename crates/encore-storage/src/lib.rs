// SPDX-FileCopyrightText: 2026 Encore Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Request-store backends for the Encore request queue.
//!
//! Two implementations of [`QueueStore`]:
//! - [`SqliteStore`]: WAL-mode SQLite with embedded migrations and a
//!   single-writer concurrency model via `tokio-rusqlite`.
//! - [`MemoryStore`]: volatile in-process maps, for tests and throwaway runs.

pub mod adapter;
pub mod database;
pub mod memory;
pub mod migrations;
pub mod queries;

use std::sync::Arc;

use encore_config::model::{StorageBackend, StorageConfig};
use encore_core::{EncoreError, QueueStore};

pub use adapter::SqliteStore;
pub use database::Database;
pub use memory::MemoryStore;

/// Build and initialize the backend selected by `config`.
pub async fn open_store(config: &StorageConfig) -> Result<Arc<dyn QueueStore>, EncoreError> {
    let store: Arc<dyn QueueStore> = match config.backend {
        StorageBackend::Memory => Arc::new(MemoryStore::new()),
        StorageBackend::Sqlite => Arc::new(SqliteStore::new(config.clone())),
    };
    store.initialize().await?;
    tracing::info!(backend = store.name(), "request store ready");
    Ok(store)
}
