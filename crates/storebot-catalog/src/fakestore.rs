// SPDX-FileCopyrightText: 2026 Storebot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Client for the FakeStore product API.

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use storebot_config::model::CatalogConfig;
use storebot_core::retail::Product;
use storebot_core::traits::{CatalogAdapter, PluginAdapter};
use storebot_core::types::{AdapterType, HealthStatus};
use storebot_core::StorebotError;
use tracing::{debug, error};

const SERVICE_ERROR: &str = "Error communicating with the products service";
const SERVICE_UNAVAILABLE: &str = "Products service is currently unavailable";

/// Read-only FakeStore client implementing [`CatalogAdapter`].
#[derive(Debug, Clone)]
pub struct FakeStoreClient {
    client: reqwest::Client,
    base_url: String,
}

/// Outcome of a GET that distinguishes "absent" from failure.
enum Fetched<T> {
    Found(T),
    Missing,
}

impl FakeStoreClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, StorebotError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| StorebotError::Catalog {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &CatalogConfig) -> Result<Self, StorebotError> {
        Self::new(&config.base_url, Duration::from_secs(config.timeout_secs))
    }

    /// GETs `{base_url}/{path}` and decodes the body.
    ///
    /// 404 and an empty or `null` body both come back as [`Fetched::Missing`].
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<Fetched<T>, StorebotError> {
        let url = format!("{}/{path}", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|e| {
                error!(url = %url, error = %e, "request to products service failed");
                StorebotError::Catalog {
                    message: SERVICE_UNAVAILABLE.into(),
                    source: Some(Box::new(e)),
                }
            })?;

        let status = response.status();
        debug!(url = %url, status = %status, "products service responded");

        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(Fetched::Missing);
        }
        if !status.is_success() {
            error!(url = %url, status = %status, "products service returned an error status");
            return Err(StorebotError::catalog(SERVICE_ERROR));
        }

        let body = response.text().await.map_err(|e| StorebotError::Catalog {
            message: SERVICE_UNAVAILABLE.into(),
            source: Some(Box::new(e)),
        })?;
        let trimmed = body.trim();
        if trimmed.is_empty() || trimmed == "null" {
            return Ok(Fetched::Missing);
        }

        serde_json::from_str(trimmed)
            .map(Fetched::Found)
            .map_err(|e| {
                error!(url = %url, error = %e, "products service returned an undecodable body");
                StorebotError::Catalog {
                    message: SERVICE_ERROR.into(),
                    source: Some(Box::new(e)),
                }
            })
    }
}

#[async_trait]
impl PluginAdapter for FakeStoreClient {
    fn name(&self) -> &str {
        "fakestore"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Catalog
    }

    async fn health_check(&self) -> Result<HealthStatus, StorebotError> {
        match self.list_categories().await {
            Ok(_) => Ok(HealthStatus::Healthy),
            Err(e) => Ok(HealthStatus::Degraded(e.to_string())),
        }
    }

    async fn shutdown(&self) -> Result<(), StorebotError> {
        Ok(())
    }
}

#[async_trait]
impl CatalogAdapter for FakeStoreClient {
    async fn list_products(&self, limit: u32) -> Result<Vec<Product>, StorebotError> {
        match self
            .get_json::<Vec<Product>>("products", &[("limit", limit.to_string())])
            .await?
        {
            Fetched::Found(products) => Ok(products),
            Fetched::Missing => Ok(Vec::new()),
        }
    }

    async fn get_product(&self, product_id: u64) -> Result<Product, StorebotError> {
        match self.get_json(&format!("products/{product_id}"), &[]).await? {
            Fetched::Found(product) => Ok(product),
            Fetched::Missing => Err(StorebotError::not_found("product", product_id.to_string())),
        }
    }

    async fn list_categories(&self) -> Result<Vec<String>, StorebotError> {
        match self.get_json("products/categories", &[]).await? {
            Fetched::Found(categories) => Ok(categories),
            Fetched::Missing => Ok(Vec::new()),
        }
    }

    async fn products_by_category(&self, category: &str) -> Result<Vec<Product>, StorebotError> {
        let known = self.list_categories().await?;
        let Some(canonical) = known.iter().find(|c| c.eq_ignore_ascii_case(category)) else {
            return Err(StorebotError::not_found("category", category));
        };

        match self
            .get_json::<Vec<Product>>(&format!("products/category/{canonical}"), &[])
            .await?
        {
            Fetched::Found(products) if !products.is_empty() => Ok(products),
            _ => Err(StorebotError::not_found("products for category", canonical.as_str())),
        }
    }
}
