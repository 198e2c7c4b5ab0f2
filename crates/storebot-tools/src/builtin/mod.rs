// SPDX-FileCopyrightText: 2026 Storebot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The storefront tools offered to the model on every turn.

pub mod human;
pub mod products;
pub mod store;

pub use human::HumanAssistanceTool;
pub use products::ProductsDataTool;
pub use store::StoreDataTool;

use std::sync::Arc;

use storebot_core::traits::{CatalogAdapter, StorageAdapter, StoreInfoProvider};

use crate::ToolRegistry;

/// Registers `human_assistance`, `get_store_data` and `get_products_data`.
pub fn register_storefront(
    registry: &mut ToolRegistry,
    storage: Arc<dyn StorageAdapter>,
    store: Arc<dyn StoreInfoProvider>,
    catalog: Arc<dyn CatalogAdapter>,
    list_limit: u32,
) {
    registry.register(Arc::new(HumanAssistanceTool::new(storage)));
    registry.register(Arc::new(StoreDataTool::new(store)));
    registry.register(Arc::new(ProductsDataTool::new(catalog, list_limit)));
}

impl ToolRegistry {
    /// A registry holding exactly the three storefront tools.
    pub fn storefront(
        storage: Arc<dyn StorageAdapter>,
        store: Arc<dyn StoreInfoProvider>,
        catalog: Arc<dyn CatalogAdapter>,
        list_limit: u32,
    ) -> Self {
        let mut registry = Self::new();
        register_storefront(&mut registry, storage, store, catalog, list_limit);
        registry
    }
}

/// Trimmed, non-empty string argument.
pub(crate) fn string_arg(args: &serde_json::Value, key: &str) -> Option<String> {
    args.get(key)
        .and_then(serde_json::Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

pub(crate) fn unsupported_intent(raw: &str) -> String {
    format!("Intent '{raw}' is not supported.")
}
