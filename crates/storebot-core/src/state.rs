// SPDX-FileCopyrightText: 2026 Storebot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-conversation state threaded through the engine across turns.
//!
//! A [`ConversationState`] holds the role-tagged transcript the model sees
//! plus the contact fields tools collect along the way. Tools never mutate
//! it directly; they return a [`StateUpdate`] that the engine merges.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::types::{Message, Sender};

/// Role of a message in the model transcript.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
}

/// A tool invocation requested by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Correlation id echoed back on the tool result message.
    pub id: String,
    pub name: String,
    pub arguments: serde_json::Value,
}

/// One entry of the model transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
    /// Tool calls requested by an assistant message.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,
    /// For tool messages, the id of the call being answered.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl ChatMessage {
    fn plain(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            tool_calls: Vec::new(),
            tool_call_id: None,
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::plain(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::plain(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::plain(Role::Assistant, content)
    }

    /// An assistant message that requests tool calls.
    pub fn assistant_with_calls(content: impl Into<String>, calls: Vec<ToolCall>) -> Self {
        Self {
            tool_calls: calls,
            ..Self::plain(Role::Assistant, content)
        }
    }

    /// A tool result answering the call `call_id`.
    pub fn tool(call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            tool_call_id: Some(call_id.into()),
            ..Self::plain(Role::Tool, content)
        }
    }

    /// Converts a persisted message to its transcript form.
    pub fn from_stored(message: &Message) -> Self {
        match message.sender {
            Sender::Client => Self::user(message.content.clone()),
            Sender::Bot => Self::assistant(message.content.clone()),
        }
    }

    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }
}

/// Changes a tool asks the engine to merge into the conversation state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StateUpdate {
    pub messages: Vec<ChatMessage>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub last_inquiry_id: Option<String>,
}

impl StateUpdate {
    /// An update carrying a single tool result message.
    pub fn tool_reply(call_id: &str, content: impl Into<String>) -> Self {
        Self {
            messages: vec![ChatMessage::tool(call_id, content)],
            ..Self::default()
        }
    }
}

/// Transcript and collected fields for one conversation thread.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConversationState {
    pub chat_id: String,
    pub messages: Vec<ChatMessage>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub last_inquiry_id: Option<String>,
}

impl ConversationState {
    pub fn new(chat_id: impl Into<String>) -> Self {
        Self {
            chat_id: chat_id.into(),
            ..Self::default()
        }
    }

    /// Builds a state whose transcript replays persisted history.
    pub fn from_history<'a>(
        chat_id: impl Into<String>,
        history: impl IntoIterator<Item = &'a Message>,
    ) -> Self {
        Self {
            messages: history.into_iter().map(ChatMessage::from_stored).collect(),
            ..Self::new(chat_id)
        }
    }

    /// Puts `prompt` first unless a system message already leads the transcript.
    ///
    /// Returns `true` when the message was inserted.
    pub fn ensure_system_message(&mut self, prompt: impl Into<String>) -> bool {
        if self
            .messages
            .first()
            .is_some_and(|m| m.role == Role::System)
        {
            return false;
        }
        self.messages.insert(0, ChatMessage::system(prompt));
        true
    }

    pub fn push(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    /// Merges a tool's update. Fields left `None` keep their current value.
    pub fn apply(&mut self, update: StateUpdate) {
        self.messages.extend(update.messages);
        if update.name.is_some() {
            self.name = update.name;
        }
        if update.email.is_some() {
            self.email = update.email;
        }
        if update.last_inquiry_id.is_some() {
            self.last_inquiry_id = update.last_inquiry_id;
        }
    }

    /// Ends a turn with its user-facing reply.
    ///
    /// A trailing assistant message without tool calls is the raw model
    /// output for this turn and is overwritten, so each answered turn leaves
    /// exactly one assistant message behind.
    pub fn record_reply(&mut self, content: impl Into<String>) {
        match self.messages.last_mut() {
            Some(last) if last.role == Role::Assistant && !last.has_tool_calls() => {
                last.content = content.into();
            }
            _ => self.messages.push(ChatMessage::assistant(content)),
        }
    }

    pub fn last_message(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    /// Tool calls of the last assistant message that have no tool result yet.
    pub fn pending_tool_calls(&self) -> Vec<ToolCall> {
        let Some(idx) = self
            .messages
            .iter()
            .rposition(|m| m.role == Role::Assistant)
        else {
            return Vec::new();
        };
        let answered: Vec<&str> = self.messages[idx + 1..]
            .iter()
            .filter_map(|m| m.tool_call_id.as_deref())
            .collect();
        self.messages[idx]
            .tool_calls
            .iter()
            .filter(|c| !answered.contains(&c.id.as_str()))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intent::Intent;

    fn call(id: &str) -> ToolCall {
        ToolCall {
            id: id.into(),
            name: "get_store_data".into(),
            arguments: serde_json::json!({"intent": "store_hours"}),
        }
    }

    #[test]
    fn system_message_is_inserted_once() {
        let mut state = ConversationState::new("chat-1");
        state.push(ChatMessage::user("Hello!"));

        assert!(state.ensure_system_message("prompt"));
        assert!(!state.ensure_system_message("prompt"));
        assert!(!state.ensure_system_message("another prompt"));

        let systems = state
            .messages
            .iter()
            .filter(|m| m.role == Role::System)
            .count();
        assert_eq!(systems, 1);
        assert_eq!(state.messages[0].content, "prompt");
        assert_eq!(state.messages[1].content, "Hello!");
    }

    #[test]
    fn apply_keeps_existing_fields_when_update_is_empty() {
        let mut state = ConversationState::new("chat-1");
        state.apply(StateUpdate {
            name: Some("John Doe".into()),
            email: Some("john.doe@example.com".into()),
            ..StateUpdate::tool_reply("call-1", "done")
        });
        state.apply(StateUpdate::tool_reply("call-2", "again"));

        assert_eq!(state.name.as_deref(), Some("John Doe"));
        assert_eq!(state.email.as_deref(), Some("john.doe@example.com"));
        assert_eq!(state.messages.len(), 2);
        assert_eq!(state.messages[1].tool_call_id.as_deref(), Some("call-2"));
    }

    #[test]
    fn reply_overwrites_raw_model_output() {
        let mut state = ConversationState::new("chat-1");
        state.push(ChatMessage::user("Hello!"));
        state.push(ChatMessage::assistant("```json\n{\"reply\": \"Hi\"}\n```"));

        state.record_reply("Hi");

        assert_eq!(state.messages.len(), 2);
        assert_eq!(state.messages[1].role, Role::Assistant);
        assert_eq!(state.messages[1].content, "Hi");
    }

    #[test]
    fn reply_is_appended_after_tool_results() {
        let mut state = ConversationState::new("chat-1");
        state.push(ChatMessage::user("Hours?"));
        state.push(ChatMessage::assistant_with_calls("", vec![call("a")]));
        state.push(ChatMessage::tool("a", "skipped"));

        state.record_reply("Sorry, try again later.");

        assert_eq!(state.messages.len(), 4);
        assert_eq!(state.messages[3].role, Role::Assistant);
        assert_eq!(state.messages[1].tool_calls.len(), 1);
    }

    #[test]
    fn reply_after_user_message_is_appended() {
        let mut state = ConversationState::new("chat-1");
        state.push(ChatMessage::user("Hello!"));

        state.record_reply("fallback");

        assert_eq!(state.messages.len(), 2);
        assert_eq!(state.messages[0].content, "Hello!");
        assert_eq!(state.messages[1].content, "fallback");
    }

    #[test]
    fn pending_calls_exclude_answered_ones() {
        let mut state = ConversationState::new("chat-1");
        state.push(ChatMessage::assistant_with_calls("", vec![call("a"), call("b")]));
        state.push(ChatMessage::tool("a", "result"));

        let pending = state.pending_tool_calls();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id, "b");

        state.push(ChatMessage::tool("b", "result"));
        assert!(state.pending_tool_calls().is_empty());
    }

    #[test]
    fn history_maps_senders_to_roles() {
        let stored = vec![
            Message {
                id: "m1".into(),
                chat_id: "c".into(),
                content: "Hi".into(),
                sender: Sender::Client,
                intent: Some(Intent::Greeting),
                created_at: "t1".into(),
            },
            Message {
                id: "m2".into(),
                chat_id: "c".into(),
                content: "Hello, how can I help?".into(),
                sender: Sender::Bot,
                intent: Some(Intent::Greeting),
                created_at: "t2".into(),
            },
        ];
        let state = ConversationState::from_history("c", &stored);
        assert_eq!(state.messages[0].role, Role::User);
        assert_eq!(state.messages[1].role, Role::Assistant);
    }

    #[test]
    fn tool_message_serializes_call_id() {
        let json = serde_json::to_value(ChatMessage::tool("call-9", "ok")).unwrap();
        assert_eq!(json["role"], "tool");
        assert_eq!(json["tool_call_id"], "call-9");
        assert!(json.get("tool_calls").is_none());
    }
}
