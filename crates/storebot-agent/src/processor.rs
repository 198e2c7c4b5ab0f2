// SPDX-FileCopyrightText: 2026 Storebot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The per-message use case: run a turn and persist its outcome.

use std::sync::Arc;

use storebot_core::intent::Intent;
use storebot_core::state::{ChatMessage, ConversationState};
use storebot_core::traits::StorageAdapter;
use storebot_core::types::{Message, Sender, truncate_content};
use storebot_core::StorebotError;
use tracing::{debug, error, info, warn};

use crate::engine::{EngineReply, Responder};

/// Stored when the engine hands back no usable content.
pub const EMPTY_CONTENT_REPLY: &str =
    "I couldn't generate a response. Please try again or rephrase your question.";

/// Result of [`TurnProcessor::process`].
#[derive(Debug, Clone)]
pub enum TurnOutcome {
    /// The bot reply is stored and the client message carries the detected intent.
    Completed {
        user_message: Message,
        bot_message: Message,
    },
    Failed { error: String },
}

impl TurnOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Completed { .. })
    }
}

/// Threads a client message through a [`Responder`] and writes the results.
pub struct TurnProcessor {
    engine: Arc<dyn Responder>,
    storage: Arc<dyn StorageAdapter>,
}

impl TurnProcessor {
    pub fn new(engine: Arc<dyn Responder>, storage: Arc<dyn StorageAdapter>) -> Self {
        Self { engine, storage }
    }

    /// Runs one turn. Errors never escape; they come back as [`TurnOutcome::Failed`].
    ///
    /// The bot message and the client intent update are two separate writes.
    pub async fn process(
        &self,
        state: &mut ConversationState,
        user_message: &Message,
    ) -> TurnOutcome {
        state.push(ChatMessage::user(user_message.content.clone()));

        match self.run(state, user_message).await {
            Ok((user_message, bot_message)) => {
                info!(
                    chat_id = %state.chat_id,
                    intent = ?bot_message.intent,
                    "turn completed"
                );
                TurnOutcome::Completed {
                    user_message,
                    bot_message,
                }
            }
            Err(e) => {
                error!(chat_id = %state.chat_id, error = %e, "turn failed");
                TurnOutcome::Failed {
                    error: e.to_string(),
                }
            }
        }
    }

    async fn run(
        &self,
        state: &mut ConversationState,
        user_message: &Message,
    ) -> Result<(Message, Message), StorebotError> {
        let chat_id = state.chat_id.clone();
        let reply = self.engine.respond(&chat_id, state).await?;
        let (content, intent) = resolve_reply(reply);
        debug!(chat_id = %chat_id, intent = %intent, "engine replied");

        let content = truncate_content(&content);
        state.record_reply(content);

        let bot_message = self
            .storage
            .append_message(&chat_id, content, Sender::Bot, Some(intent))
            .await?;
        let user_message = self
            .storage
            .update_message_intent(&user_message.id, intent)
            .await?;

        Ok((user_message, bot_message))
    }
}

fn resolve_reply(reply: EngineReply) -> (String, Intent) {
    if reply.content.trim().is_empty() {
        warn!("engine returned empty content");
        return (EMPTY_CONTENT_REPLY.to_string(), reply.intent);
    }
    (reply.content, reply.intent)
}
