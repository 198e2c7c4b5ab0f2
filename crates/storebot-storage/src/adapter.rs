// SPDX-FileCopyrightText: 2026 Storebot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the StorageAdapter trait.

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::debug;

use storebot_config::model::StorageConfig;
use storebot_core::types::{MessageQuery, NewChat, TransferRequest, validate_content};
use storebot_core::{
    AdapterType, Chat, HealthStatus, Intent, Message, PluginAdapter, Sender, StorageAdapter,
    StorebotError,
};

use crate::database::{Database, map_tr_err};
use crate::queries;

/// SQLite-backed storage adapter.
///
/// Wraps a [`Database`] handle and delegates to the typed query modules.
/// The database is opened by [`StorageAdapter::initialize`].
pub struct SqliteStorage {
    config: StorageConfig,
    db: OnceCell<Database>,
}

impl SqliteStorage {
    /// Create a new SqliteStorage with the given configuration.
    ///
    /// The database connection is not opened until [`StorageAdapter::initialize`] is called.
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    fn db(&self) -> Result<&Database, StorebotError> {
        self.db.get().ok_or_else(|| StorebotError::Storage {
            source: "storage not initialized -- call initialize() first".into(),
        })
    }

    async fn checkpoint(&self, db: &Database) -> Result<(), StorebotError> {
        if !self.config.wal_mode {
            return Ok(());
        }
        db.connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        debug!("WAL checkpoint complete");
        Ok(())
    }
}

#[async_trait]
impl PluginAdapter for SqliteStorage {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, StorebotError> {
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

    async fn shutdown(&self) -> Result<(), StorebotError> {
        match self.db.get() {
            Some(db) => self.checkpoint(db).await,
            None => Ok(()),
        }
    }
}

#[async_trait]
impl StorageAdapter for SqliteStorage {
    async fn initialize(&self) -> Result<(), StorebotError> {
        let db = Database::open_with(&self.config.database_path, self.config.wal_mode).await?;
        self.db.set(db).map_err(|_| StorebotError::Storage {
            source: "storage already initialized".into(),
        })?;
        debug!(path = %self.config.database_path, "SQLite storage initialized");
        Ok(())
    }

    async fn close(&self) -> Result<(), StorebotError> {
        let db = self.db()?;
        self.checkpoint(db).await
    }

    async fn create_chat(&self, chat: NewChat) -> Result<Chat, StorebotError> {
        let created = queries::chats::create_chat(self.db()?, chat).await?;
        debug!(chat_id = %created.id, "chat created");
        Ok(created)
    }

    async fn get_conversation(&self, chat_id: &str) -> Result<Option<Chat>, StorebotError> {
        queries::chats::get_chat(self.db()?, chat_id).await
    }

    async fn list_chats(&self, skip: u32, limit: u32) -> Result<Vec<Chat>, StorebotError> {
        let limit = limit.clamp(1, MessageQuery::MAX_LIMIT);
        queries::chats::list_chats(self.db()?, skip, limit).await
    }

    async fn append_message(
        &self,
        chat_id: &str,
        content: &str,
        sender: Sender,
        intent: Option<Intent>,
    ) -> Result<Message, StorebotError> {
        validate_content(content)?;
        queries::messages::insert_message(self.db()?, chat_id, content, sender, intent)
            .await?
            .ok_or_else(|| StorebotError::not_found("chat", chat_id))
    }

    async fn update_message_intent(
        &self,
        message_id: &str,
        intent: Intent,
    ) -> Result<Message, StorebotError> {
        queries::messages::update_intent(self.db()?, message_id, intent)
            .await?
            .ok_or_else(|| StorebotError::not_found("message", message_id))
    }

    async fn mark_transferred(&self, transfer: TransferRequest) -> Result<Chat, StorebotError> {
        let chat_id = transfer.chat_id.clone();
        let chat = queries::chats::mark_transferred(self.db()?, transfer)
            .await?
            .ok_or_else(|| StorebotError::not_found("chat", &chat_id))?;
        debug!(chat_id = %chat.id, "chat marked as transferred");
        Ok(chat)
    }

    async fn list_messages(&self, query: MessageQuery) -> Result<Vec<Message>, StorebotError> {
        queries::messages::list_messages(self.db()?, query).await
    }

    async fn conversation_history(&self, chat_id: &str) -> Result<Vec<Message>, StorebotError> {
        queries::messages::history(self.db()?, chat_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn make_config(path: &std::path::Path) -> StorageConfig {
        StorageConfig {
            database_path: path.to_string_lossy().into_owned(),
            wal_mode: true,
        }
    }

    async fn initialized(dir: &tempfile::TempDir) -> SqliteStorage {
        let storage = SqliteStorage::new(make_config(&dir.path().join("storebot.db")));
        storage.initialize().await.unwrap();
        storage
    }

    #[tokio::test]
    async fn sqlite_storage_implements_plugin_adapter() {
        let dir = tempdir().unwrap();
        let storage = SqliteStorage::new(make_config(&dir.path().join("test.db")));

        assert_eq!(storage.name(), "sqlite");
        assert_eq!(storage.version(), semver::Version::new(0, 1, 0));
        assert_eq!(storage.adapter_type(), AdapterType::Storage);
    }

    #[tokio::test]
    async fn initialize_twice_returns_error() {
        let dir = tempdir().unwrap();
        let storage = initialized(&dir).await;
        assert!(storage.initialize().await.is_err());
    }

    #[tokio::test]
    async fn operations_fail_before_initialize() {
        let dir = tempdir().unwrap();
        let storage = SqliteStorage::new(make_config(&dir.path().join("no_init.db")));
        assert!(storage.health_check().await.is_err());
        assert!(storage.get_conversation("x").await.is_err());
    }

    #[tokio::test]
    async fn health_check_returns_healthy_when_initialized() {
        let dir = tempdir().unwrap();
        let storage = initialized(&dir).await;
        assert_eq!(storage.health_check().await.unwrap(), HealthStatus::Healthy);
    }

    #[tokio::test]
    async fn append_rejects_invalid_content_and_unknown_chat() {
        let dir = tempdir().unwrap();
        let storage = initialized(&dir).await;
        let chat = storage.create_chat(NewChat::default()).await.unwrap();

        let blank = storage
            .append_message(&chat.id, "   ", Sender::Client, None)
            .await;
        assert!(matches!(blank, Err(StorebotError::Validation(_))));

        let ghost = storage
            .append_message("ghost", "hello", Sender::Client, None)
            .await;
        assert!(matches!(ghost, Err(StorebotError::NotFound { .. })));
    }

    #[tokio::test]
    async fn turn_writes_through_adapter() {
        let dir = tempdir().unwrap();
        let storage = initialized(&dir).await;
        let chat = storage.create_chat(NewChat::default()).await.unwrap();

        let user = storage
            .append_message(&chat.id, "Hello!", Sender::Client, None)
            .await
            .unwrap();
        storage
            .append_message(&chat.id, "Hi! How can I help?", Sender::Bot, Some(Intent::Greeting))
            .await
            .unwrap();
        let tagged = storage
            .update_message_intent(&user.id, Intent::Greeting)
            .await
            .unwrap();
        assert_eq!(tagged.intent, Some(Intent::Greeting));

        let history = storage.conversation_history(&chat.id).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].sender, Sender::Client);
        assert_eq!(history[1].sender, Sender::Bot);

        assert!(matches!(
            storage.update_message_intent("missing", Intent::Other).await,
            Err(StorebotError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn escalation_is_monotonic() {
        let dir = tempdir().unwrap();
        let storage = initialized(&dir).await;
        let chat = storage.create_chat(NewChat::default()).await.unwrap();

        let transfer = TransferRequest {
            chat_id: chat.id.clone(),
            name: "John Doe".into(),
            email: "john.doe@example.com".into(),
            query: "Order never arrived".into(),
            inquiry_id: "INQ-1".into(),
        };
        assert!(storage.mark_transferred(transfer.clone()).await.unwrap().transferred_to_operator);

        storage
            .append_message(&chat.id, "Any news?", Sender::Client, None)
            .await
            .unwrap();
        let chat = storage.get_conversation(&chat.id).await.unwrap().unwrap();
        assert!(chat.transferred_to_operator);

        let missing = storage
            .mark_transferred(TransferRequest {
                chat_id: "ghost".into(),
                ..transfer
            })
            .await;
        assert!(matches!(missing, Err(StorebotError::NotFound { .. })));
    }

    #[tokio::test]
    async fn shutdown_and_close_checkpoint() {
        let dir = tempdir().unwrap();
        let storage = initialized(&dir).await;
        storage.create_chat(NewChat::default()).await.unwrap();
        storage.shutdown().await.unwrap();
        storage.close().await.unwrap();
    }
}
