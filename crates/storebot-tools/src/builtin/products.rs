// SPDX-FileCopyrightText: 2026 Storebot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Product catalog queries.

use std::sync::Arc;

use async_trait::async_trait;
use storebot_core::intent::{Intent, parse_intent};
use storebot_core::state::StateUpdate;
use storebot_core::traits::CatalogAdapter;
use storebot_core::StorebotError;
use tracing::{error, info};

use super::{string_arg, unsupported_intent};
use crate::format::format_result;
use crate::tool::Tool;

pub const MISSING_CATEGORY_REPLY: &str = "Please provide a category.";
pub const MISSING_PRODUCT_ID_REPLY: &str = "Please provide a product ID.";

/// Answers the four product intents from a [`CatalogAdapter`].
pub struct ProductsDataTool {
    catalog: Arc<dyn CatalogAdapter>,
    list_limit: u32,
}

/// A validated product request.
enum ProductQuery {
    List,
    Categories,
    Details(u64),
    ByCategory(String),
}

impl ProductsDataTool {
    /// `list_limit` bounds the plain product listing.
    pub fn new(catalog: Arc<dyn CatalogAdapter>, list_limit: u32) -> Self {
        Self {
            catalog,
            list_limit,
        }
    }

    async fn run(&self, query: ProductQuery) -> Result<String, StorebotError> {
        let text = match query {
            ProductQuery::List => format_result(&self.catalog.list_products(self.list_limit).await?),
            ProductQuery::Categories => format_result(&self.catalog.list_categories().await?),
            ProductQuery::Details(id) => format_result(&self.catalog.get_product(id).await?),
            ProductQuery::ByCategory(category) => {
                format_result(&self.catalog.products_by_category(&category).await?)
            }
        };
        Ok(text)
    }
}

/// Accepts a positive integer or a numeric string. Zero counts as absent.
fn product_id_arg(args: &serde_json::Value) -> Option<u64> {
    let value = args.get("product_id")?;
    let id = match value {
        serde_json::Value::Number(n) => n.as_u64(),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }?;
    (id > 0).then_some(id)
}

#[async_trait]
impl Tool for ProductsDataTool {
    fn name(&self) -> &str {
        "get_products_data"
    }

    fn description(&self) -> &str {
        "Fetch product information. Supported intents: product_list (all products), \
         product_categories (all categories), product_details (one product, needs \
         product_id), product_list_by_category (products of a category, needs category)."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        let intents: Vec<String> = Intent::all()
            .filter(|i| i.is_product_query())
            .map(|i| i.as_tool_key())
            .collect();
        serde_json::json!({
            "type": "object",
            "properties": {
                "intent": {"type": "string", "enum": intents},
                "category": {"type": "string", "description": "Category name for product_list_by_category"},
                "product_id": {"type": "integer", "description": "Product id for product_details"}
            },
            "required": ["intent"]
        })
    }

    async fn invoke(
        &self,
        args: serde_json::Value,
        call_id: &str,
    ) -> Result<StateUpdate, StorebotError> {
        let raw = string_arg(&args, "intent").unwrap_or_default();

        let query = match parse_intent(&raw) {
            Intent::ProductList => ProductQuery::List,
            Intent::ProductCategories => ProductQuery::Categories,
            Intent::ProductDetails => match product_id_arg(&args) {
                Some(id) => ProductQuery::Details(id),
                None => return Ok(StateUpdate::tool_reply(call_id, MISSING_PRODUCT_ID_REPLY)),
            },
            Intent::ProductListByCategory => match string_arg(&args, "category") {
                Some(category) => ProductQuery::ByCategory(category),
                None => return Ok(StateUpdate::tool_reply(call_id, MISSING_CATEGORY_REPLY)),
            },
            _ => return Ok(StateUpdate::tool_reply(call_id, unsupported_intent(&raw))),
        };

        info!(intent = %raw, "get_products_data called");

        let reply = match self.run(query).await {
            Ok(text) => text,
            Err(e) => {
                error!(intent = %raw, error = %e, "product lookup failed");
                format!("Error fetching product data: {e}")
            }
        };
        Ok(StateUpdate::tool_reply(call_id, reply))
    }
}
