// SPDX-FileCopyrightText: 2026 Storebot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The bounded assistant/tools loop behind every turn.
//!
//! The loop starts at the assistant node. An assistant message with tool
//! calls moves to the tools node, which answers every call and returns to
//! the assistant. A message without tool calls ends the loop. The number of
//! assistant calls per turn is capped; on reaching the cap any pending calls
//! are answered as skipped and the turn degrades.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::future::join_all;
use storebot_config::StorebotConfig;
use storebot_core::intent::Intent;
use storebot_core::state::{ChatMessage, ConversationState, StateUpdate, ToolCall};
use storebot_core::traits::ProviderAdapter;
use storebot_core::types::ProviderRequest;
use storebot_core::StorebotError;
use storebot_tools::ToolRegistry;
use tracing::{debug, instrument, warn};

use crate::parser::extract;
use crate::prompt::system_prompt;

/// Content of the reply used whenever a turn cannot complete.
pub const FALLBACK_REPLY: &str = "No reply provided.";

const SKIPPED_TOOL_REPLY: &str = "Skipped: the tool call limit for this turn was reached.";

/// Tunables of the turn loop.
#[derive(Debug, Clone)]
pub struct EngineSettings {
    pub assistant_name: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: Option<f32>,
    /// Maximum assistant calls in one turn. Values below 1 are treated as 1.
    pub max_round_trips: usize,
    pub model_timeout: Duration,
    pub tool_timeout: Duration,
}

impl EngineSettings {
    pub fn from_config(config: &StorebotConfig) -> Self {
        Self {
            assistant_name: config.agent.name.clone(),
            model: config.fireworks.model.clone(),
            max_tokens: config.agent.max_tokens,
            temperature: Some(config.agent.temperature),
            max_round_trips: config.agent.max_round_trips,
            model_timeout: Duration::from_secs(config.agent.model_timeout_secs),
            tool_timeout: Duration::from_secs(config.agent.tool_timeout_secs),
        }
    }
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self::from_config(&StorebotConfig::default())
    }
}

/// The answer of one turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineReply {
    pub content: String,
    pub intent: Intent,
}

impl EngineReply {
    pub fn fallback() -> Self {
        Self {
            content: FALLBACK_REPLY.to_string(),
            intent: Intent::Other,
        }
    }
}

/// Produces the reply for the latest user message in `state`.
#[async_trait]
pub trait Responder: Send + Sync {
    async fn respond(
        &self,
        thread_id: &str,
        state: &mut ConversationState,
    ) -> Result<EngineReply, StorebotError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Node {
    Assistant,
    Tools,
}

/// Model-driven [`Responder`] with the storefront tools bound.
pub struct ConversationEngine {
    provider: Arc<dyn ProviderAdapter>,
    tools: Arc<ToolRegistry>,
    settings: EngineSettings,
}

impl ConversationEngine {
    pub fn new(
        provider: Arc<dyn ProviderAdapter>,
        tools: Arc<ToolRegistry>,
        settings: EngineSettings,
    ) -> Self {
        Self {
            provider,
            tools,
            settings,
        }
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Runs the loop to completion and returns the raw text of the final
    /// assistant message.
    async fn run_graph(&self, state: &mut ConversationState) -> Result<String, StorebotError> {
        let cap = self.settings.max_round_trips.max(1);
        let mut round_trips = 0usize;
        let mut node = Node::Assistant;

        loop {
            match node {
                Node::Assistant => {
                    round_trips += 1;
                    let message = self.call_model(state).await?;
                    let has_calls = message.has_tool_calls();
                    state.push(message);

                    if !has_calls {
                        let raw = state
                            .last_message()
                            .map(|m| m.content.clone())
                            .unwrap_or_default();
                        return Ok(raw);
                    }
                    if round_trips >= cap {
                        self.skip_pending(state);
                        warn!(
                            chat_id = %state.chat_id,
                            round_trips,
                            "round-trip limit reached with tool calls pending"
                        );
                        return Err(StorebotError::Internal(format!(
                            "round-trip limit of {cap} reached"
                        )));
                    }
                    node = Node::Tools;
                }
                Node::Tools => {
                    self.run_tools(state).await;
                    node = Node::Assistant;
                }
            }
        }
    }

    async fn call_model(&self, state: &ConversationState) -> Result<ChatMessage, StorebotError> {
        let request = ProviderRequest {
            model: self.settings.model.clone(),
            messages: state.messages.clone(),
            tools: self.tools.tool_definitions(),
            max_tokens: self.settings.max_tokens,
            temperature: self.settings.temperature,
        };

        let timeout = self.settings.model_timeout;
        let response = match tokio::time::timeout(timeout, self.provider.complete(request)).await {
            Ok(result) => result?,
            Err(_) => {
                warn!(chat_id = %state.chat_id, ?timeout, "model call timed out");
                return Err(StorebotError::Timeout { duration: timeout });
            }
        };

        debug!(
            chat_id = %state.chat_id,
            input_tokens = response.usage.input_tokens,
            output_tokens = response.usage.output_tokens,
            tool_calls = response.message.tool_calls.len(),
            "model responded"
        );
        Ok(response.message)
    }

    /// Executes every pending call concurrently and merges the updates in
    /// call order.
    async fn run_tools(&self, state: &mut ConversationState) {
        let calls = state.pending_tool_calls();
        let updates = join_all(calls.iter().map(|call| self.run_tool(call))).await;
        for update in updates {
            state.apply(update);
        }
    }

    async fn run_tool(&self, call: &ToolCall) -> StateUpdate {
        let Some(tool) = self.tools.get(&call.name) else {
            warn!(tool = %call.name, "model requested an unknown tool");
            return StateUpdate::tool_reply(
                &call.id,
                format!("Tool '{}' is not available.", call.name),
            );
        };

        debug!(tool = %call.name, call_id = %call.id, "dispatching tool call");
        let timeout = self.settings.tool_timeout;
        match tokio::time::timeout(timeout, tool.invoke(call.arguments.clone(), &call.id)).await {
            Ok(Ok(mut update)) => {
                let answered = update
                    .messages
                    .iter()
                    .any(|m| m.tool_call_id.as_deref() == Some(call.id.as_str()));
                if !answered {
                    update
                        .messages
                        .push(ChatMessage::tool(&call.id, "The tool returned no result."));
                }
                update
            }
            Ok(Err(e)) => {
                warn!(tool = %call.name, error = %e, "tool call failed");
                StateUpdate::tool_reply(&call.id, format!("Tool '{}' failed: {e}", call.name))
            }
            Err(_) => {
                warn!(tool = %call.name, ?timeout, "tool call timed out");
                StateUpdate::tool_reply(
                    &call.id,
                    format!("Tool '{}' timed out after {}s.", call.name, timeout.as_secs()),
                )
            }
        }
    }

    fn skip_pending(&self, state: &mut ConversationState) {
        for call in state.pending_tool_calls() {
            state.push(ChatMessage::tool(&call.id, SKIPPED_TOOL_REPLY));
        }
    }
}

#[async_trait]
impl Responder for ConversationEngine {
    /// Never fails: any error inside the loop degrades to [`EngineReply::fallback`].
    #[instrument(skip_all, fields(thread_id = %thread_id))]
    async fn respond(
        &self,
        thread_id: &str,
        state: &mut ConversationState,
    ) -> Result<EngineReply, StorebotError> {
        let prompt = system_prompt(&self.settings.assistant_name, thread_id, &self.tools);
        if state.ensure_system_message(prompt) {
            debug!("system prompt inserted");
        }

        match self.run_graph(state).await {
            Ok(raw) => {
                let parsed = extract(&raw);
                debug!(intent = %parsed.intent, "turn completed");
                Ok(EngineReply {
                    content: parsed.reply,
                    intent: parsed.intent,
                })
            }
            Err(e) => {
                warn!(error = %e, "turn degraded to fallback reply");
                Ok(EngineReply::fallback())
            }
        }
    }
}
