// SPDX-FileCopyrightText: 2026 Storebot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Storage adapter trait for chat and message persistence.

use async_trait::async_trait;

use crate::error::StorebotError;
use crate::intent::Intent;
use crate::traits::adapter::PluginAdapter;
use crate::types::{Chat, Message, MessageQuery, NewChat, Sender, TransferRequest};

/// Adapter for persisting chats and their messages.
///
/// Every write is its own transaction; a turn spans several writes.
#[async_trait]
pub trait StorageAdapter: PluginAdapter {
    /// Initializes the storage backend (migrations, connection, etc.).
    async fn initialize(&self) -> Result<(), StorebotError>;

    /// Closes the storage backend, flushing pending writes and releasing connections.
    async fn close(&self) -> Result<(), StorebotError>;

    async fn create_chat(&self, chat: NewChat) -> Result<Chat, StorebotError>;

    /// Looks up a chat by id.
    async fn get_conversation(&self, chat_id: &str) -> Result<Option<Chat>, StorebotError>;

    /// Lists chats, most recently created first.
    async fn list_chats(&self, skip: u32, limit: u32) -> Result<Vec<Chat>, StorebotError>;

    /// Appends a message to an existing chat and touches the chat's `updated_at`.
    async fn append_message(
        &self,
        chat_id: &str,
        content: &str,
        sender: Sender,
        intent: Option<Intent>,
    ) -> Result<Message, StorebotError>;

    async fn update_message_intent(
        &self,
        message_id: &str,
        intent: Intent,
    ) -> Result<Message, StorebotError>;

    /// Records an escalation and marks the chat as transferred to an operator.
    async fn mark_transferred(&self, transfer: TransferRequest) -> Result<Chat, StorebotError>;

    async fn list_messages(&self, query: MessageQuery) -> Result<Vec<Message>, StorebotError>;

    /// All messages of a chat in chronological order.
    async fn conversation_history(&self, chat_id: &str) -> Result<Vec<Message>, StorebotError>;
}
