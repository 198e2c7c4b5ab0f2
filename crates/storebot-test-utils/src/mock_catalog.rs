// SPDX-FileCopyrightText: 2026 Storebot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Offline stand-ins for the product catalog and the store directory.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;

use storebot_catalog::StoreDirectory;
use storebot_core::StorebotError;
use storebot_core::retail::{
    ContactDetails, Hours, Location, Product, Promotion, Rating, SocialMedia, StoreInfo,
};
use storebot_core::traits::{CatalogAdapter, PluginAdapter, StoreInfoProvider};
use storebot_core::types::{AdapterType, HealthStatus};

/// Error text returned while a [`MockCatalog`] is failing.
pub const MOCK_CATALOG_FAILURE: &str = "Products service is currently unavailable";

/// Builds a small product record.
pub fn sample_product(id: u64, title: &str, category: &str, price: f64) -> Product {
    Product {
        id,
        title: title.to_string(),
        price,
        description: format!("{title} from the sample catalog"),
        category: category.to_string(),
        image: None,
        rating: Some(Rating {
            rate: 4.5,
            count: 10,
        }),
    }
}

/// Three products over two categories.
pub fn sample_products() -> Vec<Product> {
    vec![
        sample_product(1, "Canvas Backpack", "men's clothing", 109.95),
        sample_product(2, "Slim Fit T-Shirt", "men's clothing", 22.3),
        sample_product(3, "Silver Ring", "jewelery", 168.0),
    ]
}

/// A [`CatalogAdapter`] over a fixed product list.
pub struct MockCatalog {
    products: Vec<Product>,
    calls: AtomicUsize,
    failing: AtomicBool,
}

impl MockCatalog {
    pub fn new(products: Vec<Product>) -> Self {
        Self {
            products,
            calls: AtomicUsize::new(0),
            failing: AtomicBool::new(false),
        }
    }

    /// While failing, every query returns a catalog error.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Total catalog queries received.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn begin(&self) -> Result<(), StorebotError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(StorebotError::catalog(MOCK_CATALOG_FAILURE));
        }
        Ok(())
    }

    fn categories(&self) -> Vec<String> {
        let mut categories: Vec<String> = Vec::new();
        for product in &self.products {
            if !categories.contains(&product.category) {
                categories.push(product.category.clone());
            }
        }
        categories
    }
}

impl Default for MockCatalog {
    fn default() -> Self {
        Self::new(sample_products())
    }
}

#[async_trait]
impl PluginAdapter for MockCatalog {
    fn name(&self) -> &str {
        "mock-catalog"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Catalog
    }

    async fn health_check(&self) -> Result<HealthStatus, StorebotError> {
        if self.failing.load(Ordering::SeqCst) {
            return Ok(HealthStatus::Degraded(MOCK_CATALOG_FAILURE.to_string()));
        }
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), StorebotError> {
        Ok(())
    }
}

#[async_trait]
impl CatalogAdapter for MockCatalog {
    async fn list_products(&self, limit: u32) -> Result<Vec<Product>, StorebotError> {
        self.begin()?;
        Ok(self.products.iter().take(limit as usize).cloned().collect())
    }

    async fn get_product(&self, product_id: u64) -> Result<Product, StorebotError> {
        self.begin()?;
        self.products
            .iter()
            .find(|p| p.id == product_id)
            .cloned()
            .ok_or_else(|| StorebotError::not_found("product", product_id.to_string()))
    }

    async fn list_categories(&self) -> Result<Vec<String>, StorebotError> {
        self.begin()?;
        Ok(self.categories())
    }

    async fn products_by_category(&self, category: &str) -> Result<Vec<Product>, StorebotError> {
        self.begin()?;
        let categories = self.categories();
        let Some(canonical) = categories.iter().find(|c| c.eq_ignore_ascii_case(category)) else {
            return Err(StorebotError::not_found("category", category));
        };
        Ok(self
            .products
            .iter()
            .filter(|p| &p.category == canonical)
            .cloned()
            .collect())
    }
}

/// The bundled store facts with a call counter and a failing mode.
pub struct FixtureStore {
    directory: Option<StoreDirectory>,
    calls: AtomicUsize,
    failing: AtomicBool,
}

impl FixtureStore {
    /// Serves the bundled store data. If that data cannot be decoded every
    /// lookup fails with a store data error.
    pub fn new() -> Self {
        Self::with_directory(StoreDirectory::bundled().ok())
    }

    pub fn with_directory(directory: Option<StoreDirectory>) -> Self {
        Self {
            directory,
            calls: AtomicUsize::new(0),
            failing: AtomicBool::new(false),
        }
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn directory(&self) -> Result<&StoreDirectory, StorebotError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(StorebotError::StoreData("fixture store is offline".to_string()));
        }
        self.directory
            .as_ref()
            .ok_or_else(|| StorebotError::StoreData("fixture store has no data".to_string()))
    }
}

impl Default for FixtureStore {
    fn default() -> Self {
        Self::new()
    }
}

impl StoreInfoProvider for FixtureStore {
    fn store_info(&self) -> Result<StoreInfo, StorebotError> {
        self.directory()?.store_info()
    }

    fn hours(&self) -> Result<Hours, StorebotError> {
        self.directory()?.hours()
    }

    fn contact(&self) -> Result<ContactDetails, StorebotError> {
        self.directory()?.contact()
    }

    fn promotions(&self) -> Result<Vec<Promotion>, StorebotError> {
        self.directory()?.promotions()
    }

    fn payment_methods(&self) -> Result<Vec<String>, StorebotError> {
        self.directory()?.payment_methods()
    }

    fn social_media(&self) -> Result<SocialMedia, StorebotError> {
        self.directory()?.social_media()
    }

    fn location(&self) -> Result<Location, StorebotError> {
        self.directory()?.location()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn category_lookup_is_case_insensitive() {
        let catalog = MockCatalog::default();
        let jewelery = catalog.products_by_category("JEWELERY").await.unwrap();
        assert_eq!(jewelery.len(), 1);
        assert_eq!(catalog.call_count(), 1);
    }

    #[tokio::test]
    async fn unknown_product_is_not_found() {
        let catalog = MockCatalog::default();
        let err = catalog.get_product(99).await.unwrap_err();
        assert_eq!(err.to_string(), "product not found: 99");
    }

    #[tokio::test]
    async fn failing_catalog_reports_unavailable() {
        let catalog = MockCatalog::default();
        catalog.set_failing(true);
        let err = catalog.list_categories().await.unwrap_err();
        assert_eq!(err.to_string(), MOCK_CATALOG_FAILURE);
    }

    #[test]
    fn fixture_store_counts_and_fails() {
        let store = FixtureStore::new();
        assert!(store.hours().is_ok());
        store.set_failing(true);
        assert!(matches!(store.contact(), Err(StorebotError::StoreData(_))));
        assert_eq!(store.call_count(), 2);
    }
}
