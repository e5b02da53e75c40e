// SPDX-FileCopyrightText: 2026 Encore Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and migrations.
//!
//! All writes are serialized through tokio-rusqlite's single background thread.
//! Do NOT create additional Connection instances for writes.

use std::path::Path;

use encore_core::EncoreError;
use tokio_rusqlite::Connection;
use tracing::debug;

/// Convert a tokio-rusqlite error into `EncoreError::Storage`.
pub(crate) fn map_tr_err(e: tokio_rusqlite::Error<rusqlite::Error>) -> EncoreError {
    EncoreError::Storage {
        source: Box::new(e),
    }
}

/// Handle to the SQLite database. This is the single writer.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open (creating if needed) the database file at `path` and apply migrations.
    pub async fn open(path: &str, wal_mode: bool) -> Result<Self, EncoreError> {
        if let Some(parent) = Path::new(path).parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| EncoreError::Storage {
                source: Box::new(e),
            })?;
        }

        let conn = Connection::open(path)
            .await
            .map_err(|e| EncoreError::Storage {
                source: Box::new(e),
            })?;
        let db = Self { conn };
        db.prepare(wal_mode).await?;
        debug!(path, wal_mode, "database opened");
        Ok(db)
    }

    /// Open a private in-memory database. Used by tests.
    pub async fn open_in_memory() -> Result<Self, EncoreError> {
        let conn = Connection::open_in_memory()
            .await
            .map_err(|e| EncoreError::Storage {
                source: Box::new(e),
            })?;
        let db = Self { conn };
        db.prepare(false).await?;
        Ok(db)
    }

    async fn prepare(&self, wal_mode: bool) -> Result<(), EncoreError> {
        self.conn
            .call(move |conn| -> Result<(), rusqlite::Error> {
                if wal_mode {
                    conn.execute_batch("PRAGMA journal_mode = WAL; PRAGMA synchronous = NORMAL;")?;
                }
                conn.busy_timeout(std::time::Duration::from_secs(5))?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;

        self.conn
            .call(|conn| crate::migrations::run_migrations(conn))
            .await
            .map_err(|e| EncoreError::Storage {
                source: e.to_string().into(),
            })
    }

    /// The underlying connection. All query modules go through this.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Fold the WAL back into the main database file.
    pub async fn checkpoint(&self) -> Result<(), EncoreError> {
        self.conn
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn open_creates_file_and_parent_dirs() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("nested/dir/encore.db");
        let db = Database::open(db_path.to_str().unwrap(), true).await.unwrap();
        assert!(db_path.exists());
        db.checkpoint().await.unwrap();
    }

    #[tokio::test]
    async fn migrations_create_tables() {
        let db = Database::open_in_memory().await.unwrap();
        let tables = db
            .connection()
            .call(|conn| -> Result<Vec<String>, rusqlite::Error> {
                let mut stmt = conn.prepare(
                    "SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name",
                )?;
                let names = stmt
                    .query_map([], |row| row.get(0))?
                    .collect::<Result<Vec<String>, _>>()?;
                Ok(names)
            })
            .await
            .unwrap();
        assert!(tables.contains(&"orders".to_string()));
        assert!(tables.contains(&"history".to_string()));
    }

    #[tokio::test]
    async fn reopening_is_idempotent() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("twice.db");
        let path = db_path.to_str().unwrap();
        drop(Database::open(path, true).await.unwrap());
        Database::open(path, true).await.unwrap();
    }
}
