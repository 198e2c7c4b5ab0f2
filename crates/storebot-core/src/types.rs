// SPDX-FileCopyrightText: 2026 Storebot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types used across collaborator traits and the turn pipeline.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::StorebotError;
use crate::intent::Intent;
use crate::state::ChatMessage;

/// Maximum number of characters in a stored message.
pub const MAX_MESSAGE_LENGTH: usize = 2000;

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the kind of collaborator behind an adapter.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Provider,
    Storage,
    Catalog,
}

/// Who authored a message.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum Sender {
    Client,
    Bot,
}

/// A support conversation.
///
/// `transferred_to_operator` only ever moves from `false` to `true`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chat {
    pub id: String,
    pub client_name: Option<String>,
    pub client_email: Option<String>,
    pub initial_intent: Option<Intent>,
    pub transfer_inquiry_id: Option<String>,
    pub transfer_query: Option<String>,
    pub transferred_to_operator: bool,
    pub operator_transfer_time: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// A persisted message belonging to a [`Chat`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub chat_id: String,
    pub content: String,
    pub sender: Sender,
    pub intent: Option<Intent>,
    pub created_at: String,
}

/// Fields accepted when opening a new chat.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewChat {
    #[serde(default)]
    pub client_name: Option<String>,
    #[serde(default)]
    pub client_email: Option<String>,
    #[serde(default)]
    pub initial_intent: Option<Intent>,
}

/// Everything recorded when a chat is escalated to a human operator.
#[derive(Debug, Clone, PartialEq)]
pub struct TransferRequest {
    pub chat_id: String,
    pub name: String,
    pub email: String,
    pub query: String,
    pub inquiry_id: String,
}

/// Ordering of listed records by creation time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

/// Filters for listing messages.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageQuery {
    pub chat_id: Option<String>,
    pub sender: Option<Sender>,
    pub intent: Option<Intent>,
    pub sort_order: SortOrder,
    pub skip: u32,
    pub limit: u32,
}

impl MessageQuery {
    /// Largest page a caller may request.
    pub const MAX_LIMIT: u32 = 100;

    /// All messages of one chat in chronological order, first page.
    pub fn for_chat(chat_id: impl Into<String>) -> Self {
        Self {
            chat_id: Some(chat_id.into()),
            ..Self::default()
        }
    }
}

impl Default for MessageQuery {
    fn default() -> Self {
        Self {
            chat_id: None,
            sender: None,
            intent: None,
            sort_order: SortOrder::Asc,
            skip: 0,
            limit: Self::MAX_LIMIT,
        }
    }
}

/// Rejects empty or over-long message content.
pub fn validate_content(content: &str) -> Result<(), StorebotError> {
    if content.trim().is_empty() {
        return Err(StorebotError::Validation(
            "message content must not be empty".into(),
        ));
    }
    let chars = content.chars().count();
    if chars > MAX_MESSAGE_LENGTH {
        return Err(StorebotError::Validation(format!(
            "message content is {chars} characters, the limit is {MAX_MESSAGE_LENGTH}"
        )));
    }
    Ok(())
}

/// Cuts `content` down to [`MAX_MESSAGE_LENGTH`] characters.
pub fn truncate_content(content: &str) -> &str {
    match content.char_indices().nth(MAX_MESSAGE_LENGTH) {
        Some((idx, _)) => &content[..idx],
        None => content,
    }
}

/// Current UTC time in the fixed-width format used for stored timestamps.
pub fn now_timestamp() -> String {
    chrono::Utc::now()
        .format("%Y-%m-%dT%H:%M:%S%.6fZ")
        .to_string()
}

// --- Provider types ---

/// A tool offered to the model, described by a JSON Schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

/// A request to a language model provider.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub tools: Vec<ToolDefinition>,
    pub max_tokens: u32,
    pub temperature: Option<f32>,
}

/// Token usage statistics from a provider response.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

/// A complete response from a language model provider.
///
/// `message` is an assistant message; it carries either final text or tool calls.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderResponse {
    pub id: String,
    pub message: ChatMessage,
    pub finish_reason: Option<String>,
    pub usage: TokenUsage,
    pub model: String,
}
