// SPDX-FileCopyrightText: 2026 Storebot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Static store facts.

use std::sync::Arc;

use async_trait::async_trait;
use storebot_core::intent::{Intent, parse_intent};
use storebot_core::state::StateUpdate;
use storebot_core::traits::StoreInfoProvider;
use storebot_core::StorebotError;
use tracing::{debug, error};

use super::{string_arg, unsupported_intent};
use crate::format::format_result;
use crate::tool::Tool;

/// Answers the seven store-fact intents from a [`StoreInfoProvider`].
pub struct StoreDataTool {
    store: Arc<dyn StoreInfoProvider>,
}

impl StoreDataTool {
    pub fn new(store: Arc<dyn StoreInfoProvider>) -> Self {
        Self { store }
    }

    fn lookup(&self, intent: Intent) -> Result<String, StorebotError> {
        let text = match intent {
            Intent::StoreInfo => format_result(&self.store.store_info()?),
            Intent::StoreHours => format_result(&self.store.hours()?),
            Intent::StoreContact => format_result(&self.store.contact()?),
            Intent::StorePromotions => format_result(&self.store.promotions()?),
            Intent::StorePaymentMethods => format_result(&self.store.payment_methods()?),
            Intent::StoreSocialMedia => format_result(&self.store.social_media()?),
            Intent::StoreLocation => format_result(&self.store.location()?),
            other => {
                return Err(StorebotError::Internal(format!(
                    "{other} is not a store intent"
                )));
            }
        };
        Ok(text)
    }
}

#[async_trait]
impl Tool for StoreDataTool {
    fn name(&self) -> &str {
        "get_store_data"
    }

    fn description(&self) -> &str {
        "Fetch store information. Supported intents: store_info, store_hours, \
         store_contact, store_promotions, store_payment_methods, store_social_media, \
         store_location."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        let intents: Vec<String> = Intent::all()
            .filter(|i| i.is_store_fact())
            .map(|i| i.as_tool_key())
            .collect();
        serde_json::json!({
            "type": "object",
            "properties": {
                "intent": {
                    "type": "string",
                    "enum": intents,
                    "description": "Which store fact to fetch"
                }
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
        let intent = parse_intent(&raw);
        debug!(intent = %raw, "get_store_data called");

        if !intent.is_store_fact() {
            return Ok(StateUpdate::tool_reply(call_id, unsupported_intent(&raw)));
        }

        let reply = match self.lookup(intent) {
            Ok(text) => text,
            Err(e) => {
                error!(intent = %raw, error = %e, "store lookup failed");
                format!("Error fetching store data: {e}")
            }
        };
        Ok(StateUpdate::tool_reply(call_id, reply))
    }
}
