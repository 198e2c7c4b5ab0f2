// SPDX-FileCopyrightText: 2026 Storebot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Catalog adapter trait for product lookups.

use async_trait::async_trait;

use crate::error::StorebotError;
use crate::retail::Product;
use crate::traits::adapter::PluginAdapter;

/// Adapter for a remote product catalog.
#[async_trait]
pub trait CatalogAdapter: PluginAdapter {
    /// Lists up to `limit` products.
    async fn list_products(&self, limit: u32) -> Result<Vec<Product>, StorebotError>;

    /// Fetches one product, failing with `NotFound` for an unknown id.
    async fn get_product(&self, product_id: u64) -> Result<Product, StorebotError>;

    async fn list_categories(&self) -> Result<Vec<String>, StorebotError>;

    /// Lists the products of a known category.
    async fn products_by_category(&self, category: &str) -> Result<Vec<Product>, StorebotError>;
}
