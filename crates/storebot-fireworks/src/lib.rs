// SPDX-FileCopyrightText: 2026 Storebot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fireworks model provider for Storebot.
//!
//! Implements [`ProviderAdapter`] over the OpenAI-compatible chat completions
//! API, translating the transcript and tool definitions to the wire format
//! and the returned choice back into a [`ChatMessage`].

pub mod client;
pub mod types;

use std::time::Duration;

use async_trait::async_trait;
use storebot_config::StorebotConfig;
use storebot_core::error::StorebotError;
use storebot_core::traits::{PluginAdapter, ProviderAdapter};
use storebot_core::types::{
    AdapterType, HealthStatus, ProviderRequest, ProviderResponse, TokenUsage, ToolDefinition,
};
use storebot_core::{ChatMessage, Role, ToolCall};
use tracing::{debug, info, warn};

use crate::client::FireworksClient;
use crate::types::{
    ApiFunction, ApiFunctionCall, ApiMessage, ApiTool, ApiToolCall, ChatCompletionRequest,
    ChatCompletionResponse,
};

/// Environment variable consulted when the config carries no key.
pub const API_KEY_ENV: &str = "FIREWORKS_API_KEY";

/// Fireworks provider implementing [`ProviderAdapter`].
pub struct FireworksProvider {
    client: FireworksClient,
}

impl FireworksProvider {
    /// Creates a provider from the loaded configuration.
    ///
    /// The key comes from `fireworks.api_key`, then `FIREWORKS_API_KEY`.
    pub fn new(config: &StorebotConfig) -> Result<Self, StorebotError> {
        let api_key = resolve_api_key(&config.fireworks.api_key)?;
        let client = FireworksClient::new(
            &api_key,
            &config.fireworks.base_url,
            Duration::from_secs(config.agent.model_timeout_secs),
        )?;

        info!(
            model = %config.fireworks.model,
            endpoint = %client.endpoint(),
            "Fireworks provider initialized"
        );

        Ok(Self { client })
    }

    /// Creates a provider around an existing client.
    pub fn with_client(client: FireworksClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PluginAdapter for FireworksProvider {
    fn name(&self) -> &str {
        "fireworks"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Provider
    }

    async fn health_check(&self) -> Result<HealthStatus, StorebotError> {
        // Probing the API would spend tokens.
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), StorebotError> {
        debug!("Fireworks provider shutting down");
        Ok(())
    }
}

#[async_trait]
impl ProviderAdapter for FireworksProvider {
    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, StorebotError> {
        let api_request = to_completion_request(&request);
        let response = self.client.complete(&api_request).await?;
        from_completion_response(response)
    }
}

/// Converts a [`ProviderRequest`] to the wire request.
fn to_completion_request(request: &ProviderRequest) -> ChatCompletionRequest {
    ChatCompletionRequest {
        model: request.model.clone(),
        messages: request.messages.iter().map(to_api_message).collect(),
        tools: request.tools.iter().map(to_api_tool).collect(),
        max_tokens: request.max_tokens,
        temperature: request.temperature,
        stream: false,
    }
}

fn to_api_message(message: &ChatMessage) -> ApiMessage {
    let role = match message.role {
        Role::System => "system",
        Role::User => "user",
        Role::Assistant => "assistant",
        Role::Tool => "tool",
    };

    let content = if message.role == Role::Assistant
        && message.has_tool_calls()
        && message.content.is_empty()
    {
        None
    } else {
        Some(message.content.clone())
    };

    ApiMessage {
        role: role.to_string(),
        content,
        tool_calls: message
            .tool_calls
            .iter()
            .map(|call| ApiToolCall {
                id: call.id.clone(),
                type_: "function".to_string(),
                function: ApiFunctionCall {
                    name: call.name.clone(),
                    arguments: call.arguments.to_string(),
                },
            })
            .collect(),
        tool_call_id: message.tool_call_id.clone(),
    }
}

fn to_api_tool(tool: &ToolDefinition) -> ApiTool {
    ApiTool {
        type_: "function".to_string(),
        function: ApiFunction {
            name: tool.name.clone(),
            description: tool.description.clone(),
            parameters: tool.parameters.clone(),
        },
    }
}

/// Maps the first choice of a completion to a [`ProviderResponse`].
fn from_completion_response(
    response: ChatCompletionResponse,
) -> Result<ProviderResponse, StorebotError> {
    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| StorebotError::Provider {
            message: "response contained no choices".into(),
            source: None,
        })?;

    let calls: Vec<ToolCall> = choice
        .message
        .tool_calls
        .into_iter()
        .map(|call| ToolCall {
            arguments: decode_arguments(&call.function.name, &call.function.arguments),
            id: call.id,
            name: call.function.name,
        })
        .collect();

    let content = choice.message.content.unwrap_or_default();
    let message = if calls.is_empty() {
        ChatMessage::assistant(content)
    } else {
        ChatMessage::assistant_with_calls(content, calls)
    };

    let usage = response.usage.unwrap_or_default();

    Ok(ProviderResponse {
        id: response.id,
        message,
        finish_reason: choice.finish_reason,
        usage: TokenUsage {
            input_tokens: usage.prompt_tokens,
            output_tokens: usage.completion_tokens,
        },
        model: response.model,
    })
}

/// Decodes JSON-string arguments. Anything that is not a JSON object becomes `{}`.
fn decode_arguments(tool: &str, raw: &str) -> serde_json::Value {
    let empty = || serde_json::Value::Object(serde_json::Map::new());
    if raw.trim().is_empty() {
        return empty();
    }
    match serde_json::from_str::<serde_json::Value>(raw) {
        Ok(value @ serde_json::Value::Object(_)) => value,
        Ok(_) => {
            warn!(tool, "tool arguments were not a JSON object");
            empty()
        }
        Err(e) => {
            warn!(tool, error = %e, "failed to decode tool arguments");
            empty()
        }
    }
}

/// Resolves the API key from config or environment.
fn resolve_api_key(config_key: &Option<String>) -> Result<String, StorebotError> {
    if let Some(key) = config_key
        && !key.is_empty()
    {
        return Ok(key.clone());
    }

    match std::env::var(API_KEY_ENV) {
        Ok(key) if !key.is_empty() => Ok(key),
        _ => Err(StorebotError::Config(format!(
            "Fireworks API key not found. Set fireworks.api_key in config or the {API_KEY_ENV} environment variable."
        ))),
    }
}
