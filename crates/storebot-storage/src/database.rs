// SPDX-FileCopyrightText: 2026 Storebot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and lifecycle.
//!
//! All reads and writes are serialized through tokio-rusqlite's single
//! background thread. Do NOT create additional Connection instances for writes.

use std::path::Path;

use storebot_core::StorebotError;
use tracing::debug;

use crate::migrations::run_migrations;

/// Handle to the migrated SQLite database.
pub struct Database {
    conn: tokio_rusqlite::Connection,
}

impl Database {
    /// Open (creating if needed) the database at `path` in WAL mode and migrate it.
    pub async fn open(path: &str) -> Result<Self, StorebotError> {
        Self::open_with(path, true).await
    }

    /// Open the database, choosing the journal mode.
    pub async fn open_with(path: &str, wal_mode: bool) -> Result<Self, StorebotError> {
        if let Some(parent) = Path::new(path).parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| StorebotError::Storage {
                source: Box::new(e),
            })?;
        }

        let conn = tokio_rusqlite::Connection::open(path)
            .await
            .map_err(|e| StorebotError::Storage {
                source: Box::new(e),
            })?;

        let journal = if wal_mode { "WAL" } else { "DELETE" };
        conn.call(move |conn| -> Result<(), rusqlite::Error> {
            let _mode: String =
                conn.pragma_update_and_check(None, "journal_mode", journal, |row| row.get(0))?;
            conn.execute_batch(
                "PRAGMA foreign_keys = ON;
                 PRAGMA busy_timeout = 5000;
                 PRAGMA synchronous = NORMAL;",
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)?;

        let applied = conn
            .call(|conn| run_migrations(conn))
            .await
            .map_err(|e: tokio_rusqlite::Error<refinery::Error>| StorebotError::Storage {
                source: Box::new(e),
            })?;
        debug!(path, applied, "database opened");

        Ok(Self { conn })
    }

    /// The underlying async connection.
    pub fn connection(&self) -> &tokio_rusqlite::Connection {
        &self.conn
    }

    /// Close the connection, waiting for queued calls to finish.
    pub async fn close(self) -> Result<(), StorebotError> {
        self.conn.close().await.map_err(|e| StorebotError::Storage {
            source: Box::new(e),
        })
    }
}

/// Map a tokio-rusqlite error into a storage error.
pub fn map_tr_err(e: tokio_rusqlite::Error<rusqlite::Error>) -> StorebotError {
    StorebotError::Storage {
        source: Box::new(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn open_creates_schema() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("schema.db");
        let db = Database::open(path.to_str().unwrap()).await.unwrap();

        let tables: Vec<String> = db
            .connection()
            .call(|conn| -> Result<Vec<String>, rusqlite::Error> {
                let mut stmt = conn.prepare(
                    "SELECT name FROM sqlite_master WHERE type = 'table' AND name IN ('chats', 'messages') ORDER BY name",
                )?;
                let rows = stmt.query_map([], |row| row.get(0))?;
                rows.collect()
            })
            .await
            .unwrap();
        assert_eq!(tables, vec!["chats", "messages"]);
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn reopening_is_idempotent() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("reopen.db");
        let path = path.to_str().unwrap();

        Database::open(path).await.unwrap().close().await.unwrap();
        let db = Database::open(path).await.unwrap();
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn open_creates_missing_parent_directories() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested/deeper/storebot.db");
        let db = Database::open_with(path.to_str().unwrap(), false).await.unwrap();
        assert!(path.exists());
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn foreign_keys_are_enforced() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("fk.db");
        let db = Database::open(path.to_str().unwrap()).await.unwrap();

        let result = db
            .connection()
            .call(|conn| -> Result<usize, rusqlite::Error> {
                conn.execute(
                    "INSERT INTO messages (id, chat_id, content, sender, created_at)
                     VALUES ('m1', 'missing-chat', 'hi', 'CLIENT', '2026-01-01T00:00:00Z')",
                    [],
                )
            })
            .await;
        assert!(result.is_err());
    }
}
