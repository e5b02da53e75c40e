// SPDX-FileCopyrightText: 2026 Encore Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the QueueStore trait.

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::debug;

use encore_config::model::StorageConfig;
use encore_core::{Changeset, EncoreError, HealthStatus, HistoryEntry, Order, OrderId, QueueStore};

use crate::database::{map_tr_err, Database};
use crate::queries;

/// SQLite-backed request store.
///
/// The database is opened lazily by [`QueueStore::initialize`].
pub struct SqliteStore {
    config: StorageConfig,
    db: OnceCell<Database>,
}

impl SqliteStore {
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    fn db(&self) -> Result<&Database, EncoreError> {
        self.db.get().ok_or_else(|| EncoreError::Storage {
            source: "storage not initialized -- call initialize() first".into(),
        })
    }
}

#[async_trait]
impl QueueStore for SqliteStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    async fn initialize(&self) -> Result<(), EncoreError> {
        let db = Database::open(&self.config.database_path, self.config.wal_mode).await?;
        self.db.set(db).map_err(|_| EncoreError::Storage {
            source: "storage already initialized".into(),
        })?;
        debug!(path = %self.config.database_path, "SQLite store initialized");
        Ok(())
    }

    async fn load_orders(&self) -> Result<Vec<Order>, EncoreError> {
        queries::orders::load_orders(self.db()?).await
    }

    async fn highest_order_id(&self) -> Result<Option<OrderId>, EncoreError> {
        queries::orders::highest_order_id(self.db()?).await
    }

    async fn commit(&self, changes: Changeset) -> Result<(), EncoreError> {
        queries::changeset::commit(self.db()?, changes).await
    }

    async fn list_history(&self) -> Result<Vec<HistoryEntry>, EncoreError> {
        queries::history::list_history(self.db()?).await
    }

    async fn health_check(&self) -> Result<HealthStatus, EncoreError> {
        let db = self.db()?;
        db.connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("SELECT 1;")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        Ok(HealthStatus::Healthy)
    }

    async fn close(&self) -> Result<(), EncoreError> {
        if let Some(db) = self.db.get() {
            if self.config.wal_mode {
                db.checkpoint().await?;
                debug!("WAL checkpoint complete");
            }
        }
        Ok(())
    }
}
