// SPDX-FileCopyrightText: 2026 Storebot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Escalation to a human operator.

use std::sync::Arc;

use async_trait::async_trait;
use storebot_core::state::StateUpdate;
use storebot_core::traits::StorageAdapter;
use storebot_core::types::TransferRequest;
use storebot_core::StorebotError;
use tracing::{error, info};

use super::string_arg;
use crate::tool::Tool;

pub const NO_CHAT_REPLY: &str =
    "Sorry, now we can't register your inquiry. Please try again later.";
pub const MISSING_FIELDS_REPLY: &str = "Please provide a name, email, and query.";
pub const PERSIST_FAILED_REPLY: &str =
    "An error occurred while registering your inquiry, please try again later.";

/// Registers an inquiry for email follow-up and marks the chat transferred.
pub struct HumanAssistanceTool {
    storage: Arc<dyn StorageAdapter>,
}

impl HumanAssistanceTool {
    pub fn new(storage: Arc<dyn StorageAdapter>) -> Self {
        Self { storage }
    }
}

/// Time-derived inquiry id, `INQ-<unix seconds>`.
pub fn new_inquiry_id() -> String {
    format!("INQ-{}", chrono::Utc::now().timestamp())
}

#[async_trait]
impl Tool for HumanAssistanceTool {
    fn name(&self) -> &str {
        "human_assistance"
    }

    fn description(&self) -> &str {
        "Register the user's inquiry for follow-up by a human team member via email. \
         Use it when you cannot answer or the user asks for a person. If the name or \
         email is not known yet, ask the user for them before calling this tool. \
         Always pass the chat_id of the current conversation."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "name": {"type": "string", "description": "Name of the person making the inquiry"},
                "email": {"type": "string", "description": "Email where they can be contacted"},
                "query": {"type": "string", "description": "The question or request they have"},
                "chat_id": {"type": "string", "description": "The chat_id of the current conversation"}
            },
            "required": ["name", "email", "query", "chat_id"]
        })
    }

    async fn invoke(
        &self,
        args: serde_json::Value,
        call_id: &str,
    ) -> Result<StateUpdate, StorebotError> {
        let Some(chat_id) = string_arg(&args, "chat_id") else {
            info!("human_assistance called without chat_id");
            return Ok(StateUpdate::tool_reply(call_id, NO_CHAT_REPLY));
        };
        info!(chat_id = %chat_id, "human_assistance tool called");

        let (Some(name), Some(email), Some(query)) = (
            string_arg(&args, "name"),
            string_arg(&args, "email"),
            string_arg(&args, "query"),
        ) else {
            return Ok(StateUpdate::tool_reply(call_id, MISSING_FIELDS_REPLY));
        };

        let inquiry_id = new_inquiry_id();
        let transfer = TransferRequest {
            chat_id: chat_id.clone(),
            name: name.clone(),
            email: email.clone(),
            query,
            inquiry_id: inquiry_id.clone(),
        };

        if let Err(e) = self.storage.mark_transferred(transfer).await {
            error!(chat_id = %chat_id, error = %e, "failed to register inquiry");
            return Ok(StateUpdate::tool_reply(call_id, PERSIST_FAILED_REPLY));
        }

        info!(chat_id = %chat_id, inquiry_id = %inquiry_id, "inquiry registered, chat transferred to operator");

        let reply = format!(
            "Thank you, {name}! Your inquiry has been registered (ID: {inquiry_id}). \
             A member of our team will contact you at {email} within 24-48 hours. \
             Please include your inquiry ID in any follow-up communications."
        );

        Ok(StateUpdate {
            name: Some(name),
            email: Some(email),
            last_inquiry_id: Some(inquiry_id),
            ..StateUpdate::tool_reply(call_id, reply)
        })
    }
}
