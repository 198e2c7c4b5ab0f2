// SPDX-FileCopyrightText: 2026 Storebot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Scripted model provider for deterministic turns.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use storebot_core::state::{ChatMessage, ToolCall};
use storebot_core::traits::{PluginAdapter, ProviderAdapter};
use storebot_core::types::{
    AdapterType, HealthStatus, ProviderRequest, ProviderResponse, TokenUsage,
};
use storebot_core::StorebotError;

/// Text returned once the script runs out.
pub const DEFAULT_MOCK_REPLY: &str = "mock response";

/// One scripted model response.
#[derive(Debug, Clone)]
pub enum ScriptedReply {
    Text(String),
    ToolCalls(Vec<ToolCall>),
    /// The call fails with a provider error.
    Failure(String),
    /// Waits before producing the inner reply.
    Delayed(Duration, Box<ScriptedReply>),
}

impl ScriptedReply {
    /// A fenced `{reply, intent}` answer, as the prompt asks for.
    pub fn json(reply: &str, intent: &str) -> Self {
        let body = serde_json::json!({"reply": reply, "intent": intent});
        Self::Text(format!("```json\n{body}\n```"))
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// A single tool call with the given arguments.
    pub fn tool_call(id: &str, name: &str, arguments: serde_json::Value) -> Self {
        Self::ToolCalls(vec![ToolCall {
            id: id.to_string(),
            name: name.to_string(),
            arguments,
        }])
    }

    pub fn delayed(self, delay: Duration) -> Self {
        Self::Delayed(delay, Box::new(self))
    }
}

/// A provider that pops replies from a FIFO script and records requests.
#[derive(Default)]
pub struct MockProvider {
    script: Arc<Mutex<VecDeque<ScriptedReply>>>,
    requests: Arc<Mutex<Vec<ProviderRequest>>>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_script(script: Vec<ScriptedReply>) -> Self {
        Self {
            script: Arc::new(Mutex::new(VecDeque::from(script))),
            requests: Arc::default(),
        }
    }

    pub async fn push(&self, reply: ScriptedReply) {
        self.script.lock().await.push_back(reply);
    }

    /// Requests received so far, oldest first.
    pub async fn requests(&self) -> Vec<ProviderRequest> {
        self.requests.lock().await.clone()
    }

    pub async fn call_count(&self) -> usize {
        self.requests.lock().await.len()
    }

    pub async fn remaining(&self) -> usize {
        self.script.lock().await.len()
    }

    async fn next_reply(&self) -> ScriptedReply {
        let mut next = self
            .script
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| ScriptedReply::text(DEFAULT_MOCK_REPLY));
        loop {
            match next {
                ScriptedReply::Delayed(delay, inner) => {
                    tokio::time::sleep(delay).await;
                    next = *inner;
                }
                other => return other,
            }
        }
    }
}

#[async_trait]
impl PluginAdapter for MockProvider {
    fn name(&self) -> &str {
        "mock-provider"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Provider
    }

    async fn health_check(&self) -> Result<HealthStatus, StorebotError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), StorebotError> {
        Ok(())
    }
}

#[async_trait]
impl ProviderAdapter for MockProvider {
    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, StorebotError> {
        let model = request.model.clone();
        self.requests.lock().await.push(request);

        let message = match self.next_reply().await {
            ScriptedReply::Text(text) => ChatMessage::assistant(text),
            ScriptedReply::ToolCalls(calls) => ChatMessage::assistant_with_calls("", calls),
            ScriptedReply::Failure(message) => {
                return Err(StorebotError::Provider {
                    message,
                    source: None,
                });
            }
            ScriptedReply::Delayed(..) => ChatMessage::assistant(DEFAULT_MOCK_REPLY),
        };

        let finish_reason = if message.has_tool_calls() {
            "tool_calls"
        } else {
            "stop"
        };

        Ok(ProviderResponse {
            id: format!("mock-resp-{}", uuid::Uuid::new_v4()),
            message,
            finish_reason: Some(finish_reason.to_string()),
            usage: TokenUsage {
                input_tokens: 10,
                output_tokens: 20,
            },
            model,
        })
    }
}
