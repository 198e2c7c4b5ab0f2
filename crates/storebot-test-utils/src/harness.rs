// SPDX-FileCopyrightText: 2026 Storebot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end turn testing.
//!
//! `TestHarness` assembles the full turn stack over a temp SQLite database,
//! a scripted model, the bundled store facts and an offline catalog.

use std::sync::Arc;
use std::time::Duration;

use storebot_agent::{ConversationEngine, EngineSettings, TurnDispatcher, TurnOutcome, TurnProcessor};
use storebot_config::model::{StorageConfig, StorebotConfig};
use storebot_core::retail::Product;
use storebot_core::types::NewChat;
use storebot_core::{Chat, Message, Sender, StorageAdapter, StorebotError};
use storebot_storage::SqliteStorage;
use storebot_tools::ToolRegistry;

use crate::mock_catalog::{FixtureStore, MockCatalog, sample_products};
use crate::mock_provider::{MockProvider, ScriptedReply};

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    script: Vec<ScriptedReply>,
    products: Vec<Product>,
    max_round_trips: Option<usize>,
    tool_timeout: Option<Duration>,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            script: Vec::new(),
            products: sample_products(),
            max_round_trips: None,
            tool_timeout: None,
        }
    }

    /// Queue model replies in the order they should be returned.
    pub fn with_script(mut self, script: Vec<ScriptedReply>) -> Self {
        self.script = script;
        self
    }

    pub fn with_products(mut self, products: Vec<Product>) -> Self {
        self.products = products;
        self
    }

    pub fn with_max_round_trips(mut self, max: usize) -> Self {
        self.max_round_trips = Some(max);
        self
    }

    pub fn with_tool_timeout(mut self, timeout: Duration) -> Self {
        self.tool_timeout = Some(timeout);
        self
    }

    /// Build the test harness, creating all required subsystems.
    pub async fn build(self) -> Result<TestHarness, StorebotError> {
        let temp_dir =
            tempfile::TempDir::new().map_err(|e| StorebotError::Storage { source: e.into() })?;
        let db_path = temp_dir.path().join("test.db");

        let mut config = StorebotConfig::default();
        config.storage = StorageConfig {
            database_path: db_path.to_string_lossy().to_string(),
            wal_mode: true,
        };
        if let Some(max) = self.max_round_trips {
            config.agent.max_round_trips = max;
        }

        let storage = SqliteStorage::new(config.storage.clone());
        storage.initialize().await?;
        let storage: Arc<dyn StorageAdapter> = Arc::new(storage);

        let provider = Arc::new(MockProvider::with_script(self.script));
        let store = Arc::new(FixtureStore::new());
        let catalog = Arc::new(MockCatalog::new(self.products));

        let tools = Arc::new(ToolRegistry::storefront(
            Arc::clone(&storage),
            store.clone(),
            catalog.clone(),
            config.catalog.default_limit,
        ));

        let mut settings = EngineSettings::from_config(&config);
        if let Some(timeout) = self.tool_timeout {
            settings.tool_timeout = timeout;
        }
        let engine = Arc::new(ConversationEngine::new(provider.clone(), tools, settings));
        let processor = Arc::new(TurnProcessor::new(engine, Arc::clone(&storage)));
        let dispatcher = TurnDispatcher::new(processor, Arc::clone(&storage))
            .with_max_cached_chats(config.agent.max_cached_chats);

        Ok(TestHarness {
            provider,
            store,
            catalog,
            storage,
            dispatcher,
            config,
            _temp_dir: temp_dir,
        })
    }
}

pub struct TestHarness {
    pub provider: Arc<MockProvider>,
    pub store: Arc<FixtureStore>,
    pub catalog: Arc<MockCatalog>,
    pub storage: Arc<dyn StorageAdapter>,
    pub dispatcher: TurnDispatcher,
    pub config: StorebotConfig,
    _temp_dir: tempfile::TempDir,
}

impl TestHarness {
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    pub async fn create_chat(&self) -> Result<Chat, StorebotError> {
        self.storage.create_chat(NewChat::default()).await
    }

    /// Stores a client message, runs its turn and waits for the outcome.
    pub async fn send_client_message(
        &self,
        chat_id: &str,
        text: &str,
    ) -> Result<TurnOutcome, StorebotError> {
        let message = self
            .storage
            .append_message(chat_id, text, Sender::Client, None)
            .await?;
        self.dispatcher
            .dispatch(message)
            .await
            .map_err(|e| StorebotError::Internal(format!("turn task failed: {e}")))
    }

    pub async fn messages(&self, chat_id: &str) -> Result<Vec<Message>, StorebotError> {
        self.storage.conversation_history(chat_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storebot_core::Intent;

    #[tokio::test]
    async fn builder_creates_working_environment() {
        let harness = TestHarness::builder().build().await.unwrap();
        let chats = harness.storage.list_chats(0, 10).await.unwrap();
        assert!(chats.is_empty());
    }

    #[tokio::test]
    async fn scripted_reply_is_persisted() {
        let harness = TestHarness::builder()
            .with_script(vec![ScriptedReply::json("Hi there!", "GREETING")])
            .build()
            .await
            .unwrap();
        let chat = harness.create_chat().await.unwrap();

        let outcome = harness.send_client_message(&chat.id, "hello").await.unwrap();
        assert!(outcome.is_success());

        let messages = harness.messages(&chat.id).await.unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[1].content, "Hi there!");
        assert_eq!(messages[1].sender, Sender::Bot);
        assert_eq!(messages[1].intent, Some(Intent::Greeting));
    }

    #[tokio::test]
    async fn unknown_chat_is_rejected_before_dispatch() {
        let harness = TestHarness::builder().build().await.unwrap();
        let err = harness
            .send_client_message("missing", "hello")
            .await
            .unwrap_err();
        assert!(matches!(err, StorebotError::NotFound { .. }));
    }
}
