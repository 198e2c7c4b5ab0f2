// SPDX-FileCopyrightText: 2026 Storebot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wiring of the production collaborators into a turn dispatcher.

use std::sync::Arc;

use storebot_agent::{ConversationEngine, EngineSettings, TurnDispatcher, TurnProcessor};
use storebot_catalog::{FakeStoreClient, StoreDirectory};
use storebot_config::model::StorebotConfig;
use storebot_core::{HealthStatus, PluginAdapter, StorageAdapter, StorebotError};
use storebot_fireworks::FireworksProvider;
use storebot_storage::SqliteStorage;
use storebot_tools::ToolRegistry;
use tracing::{info, warn};

pub struct Stack {
    pub storage: Arc<dyn StorageAdapter>,
    pub dispatcher: TurnDispatcher,
}

impl Stack {
    /// Opens storage and builds the model, catalog, store and tools.
    pub async fn build(config: &StorebotConfig) -> Result<Self, StorebotError> {
        let storage = SqliteStorage::new(config.storage.clone());
        storage.initialize().await?;
        let storage: Arc<dyn StorageAdapter> = Arc::new(storage);

        let provider = Arc::new(FireworksProvider::new(config)?);
        let store = Arc::new(StoreDirectory::from_config(&config.store)?);

        let catalog = FakeStoreClient::from_config(&config.catalog)?;
        match catalog.health_check().await {
            Ok(HealthStatus::Healthy) => info!("product catalog reachable"),
            Ok(status) => warn!(?status, "product catalog degraded"),
            Err(e) => warn!(error = %e, "product catalog health check failed"),
        }
        let catalog = Arc::new(catalog);

        let tools = ToolRegistry::storefront(
            Arc::clone(&storage),
            store,
            catalog,
            config.catalog.default_limit,
        );
        info!(tools = tools.len(), "tool registry initialized");

        let engine = Arc::new(ConversationEngine::new(
            provider,
            Arc::new(tools),
            EngineSettings::from_config(config),
        ));
        let processor = Arc::new(TurnProcessor::new(engine, Arc::clone(&storage)));
        let dispatcher = TurnDispatcher::new(processor, Arc::clone(&storage))
            .with_max_cached_chats(config.agent.max_cached_chats);

        Ok(Self {
            storage,
            dispatcher,
        })
    }
}
