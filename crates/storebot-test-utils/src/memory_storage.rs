// SPDX-FileCopyrightText: 2026 Storebot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory persistence with call counters and failure injection.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use storebot_core::traits::{PluginAdapter, StorageAdapter};
use storebot_core::types::{
    AdapterType, Chat, HealthStatus, Message, MessageQuery, NewChat, Sender, SortOrder,
    TransferRequest, now_timestamp, validate_content,
};
use storebot_core::{Intent, StorebotError};

#[derive(Default)]
struct Tables {
    chats: Vec<Chat>,
    messages: Vec<Message>,
}

/// A [`StorageAdapter`] over two vectors.
#[derive(Default)]
pub struct MemoryStorage {
    tables: Mutex<Tables>,
    appends: AtomicUsize,
    intent_updates: AtomicUsize,
    transfers: AtomicUsize,
    fail_appends: AtomicBool,
    fail_bot_appends: AtomicBool,
    fail_transfers: AtomicBool,
}

fn injected(what: &str) -> StorebotError {
    StorebotError::Storage {
        source: format!("injected {what} failure").into(),
    }
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every `append_message` fails.
    pub fn fail_appends(&self, fail: bool) {
        self.fail_appends.store(fail, Ordering::SeqCst);
    }

    /// Only BOT appends fail.
    pub fn fail_bot_appends(&self, fail: bool) {
        self.fail_bot_appends.store(fail, Ordering::SeqCst);
    }

    pub fn fail_transfers(&self, fail: bool) {
        self.fail_transfers.store(fail, Ordering::SeqCst);
    }

    pub fn append_calls(&self) -> usize {
        self.appends.load(Ordering::SeqCst)
    }

    pub fn intent_update_calls(&self) -> usize {
        self.intent_updates.load(Ordering::SeqCst)
    }

    pub fn transfer_calls(&self) -> usize {
        self.transfers.load(Ordering::SeqCst)
    }

    /// All stored messages of a chat in insertion order.
    pub async fn messages_of(&self, chat_id: &str) -> Vec<Message> {
        self.tables
            .lock()
            .await
            .messages
            .iter()
            .filter(|m| m.chat_id == chat_id)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl PluginAdapter for MemoryStorage {
    fn name(&self) -> &str {
        "memory"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, StorebotError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), StorebotError> {
        Ok(())
    }
}

#[async_trait]
impl StorageAdapter for MemoryStorage {
    async fn initialize(&self) -> Result<(), StorebotError> {
        Ok(())
    }

    async fn close(&self) -> Result<(), StorebotError> {
        Ok(())
    }

    async fn create_chat(&self, chat: NewChat) -> Result<Chat, StorebotError> {
        let now = now_timestamp();
        let created = Chat {
            id: uuid::Uuid::new_v4().to_string(),
            client_name: chat.client_name,
            client_email: chat.client_email,
            initial_intent: chat.initial_intent,
            transfer_inquiry_id: None,
            transfer_query: None,
            transferred_to_operator: false,
            operator_transfer_time: None,
            created_at: now.clone(),
            updated_at: now,
        };
        self.tables.lock().await.chats.push(created.clone());
        Ok(created)
    }

    async fn get_conversation(&self, chat_id: &str) -> Result<Option<Chat>, StorebotError> {
        let tables = self.tables.lock().await;
        Ok(tables.chats.iter().find(|c| c.id == chat_id).cloned())
    }

    async fn list_chats(&self, skip: u32, limit: u32) -> Result<Vec<Chat>, StorebotError> {
        let limit = limit.clamp(1, MessageQuery::MAX_LIMIT) as usize;
        let tables = self.tables.lock().await;
        Ok(tables
            .chats
            .iter()
            .rev()
            .skip(skip as usize)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn append_message(
        &self,
        chat_id: &str,
        content: &str,
        sender: Sender,
        intent: Option<Intent>,
    ) -> Result<Message, StorebotError> {
        self.appends.fetch_add(1, Ordering::SeqCst);
        if self.fail_appends.load(Ordering::SeqCst)
            || (sender == Sender::Bot && self.fail_bot_appends.load(Ordering::SeqCst))
        {
            return Err(injected("append"));
        }
        validate_content(content)?;

        let mut tables = self.tables.lock().await;
        let now = now_timestamp();
        let chat = tables
            .chats
            .iter_mut()
            .find(|c| c.id == chat_id)
            .ok_or_else(|| StorebotError::not_found("chat", chat_id))?;
        chat.updated_at = now.clone();

        let message = Message {
            id: uuid::Uuid::new_v4().to_string(),
            chat_id: chat_id.to_string(),
            content: content.to_string(),
            sender,
            intent,
            created_at: now,
        };
        tables.messages.push(message.clone());
        Ok(message)
    }

    async fn update_message_intent(
        &self,
        message_id: &str,
        intent: Intent,
    ) -> Result<Message, StorebotError> {
        self.intent_updates.fetch_add(1, Ordering::SeqCst);
        let mut tables = self.tables.lock().await;
        let message = tables
            .messages
            .iter_mut()
            .find(|m| m.id == message_id)
            .ok_or_else(|| StorebotError::not_found("message", message_id))?;
        message.intent = Some(intent);
        Ok(message.clone())
    }

    async fn mark_transferred(&self, transfer: TransferRequest) -> Result<Chat, StorebotError> {
        self.transfers.fetch_add(1, Ordering::SeqCst);
        if self.fail_transfers.load(Ordering::SeqCst) {
            return Err(injected("transfer"));
        }
        let mut tables = self.tables.lock().await;
        let chat = tables
            .chats
            .iter_mut()
            .find(|c| c.id == transfer.chat_id)
            .ok_or_else(|| StorebotError::not_found("chat", transfer.chat_id.as_str()))?;

        let now = now_timestamp();
        chat.client_name = Some(transfer.name);
        chat.client_email = Some(transfer.email);
        chat.transfer_inquiry_id = Some(transfer.inquiry_id);
        chat.transfer_query = Some(transfer.query);
        chat.transferred_to_operator = true;
        chat.operator_transfer_time = Some(now.clone());
        chat.updated_at = now;
        Ok(chat.clone())
    }

    async fn list_messages(&self, query: MessageQuery) -> Result<Vec<Message>, StorebotError> {
        let tables = self.tables.lock().await;
        let mut matching: Vec<Message> = tables
            .messages
            .iter()
            .filter(|m| query.chat_id.as_ref().is_none_or(|id| &m.chat_id == id))
            .filter(|m| query.sender.is_none_or(|s| m.sender == s))
            .filter(|m| query.intent.is_none_or(|i| m.intent == Some(i)))
            .cloned()
            .collect();
        if query.sort_order == SortOrder::Desc {
            matching.reverse();
        }
        let limit = query.limit.clamp(1, MessageQuery::MAX_LIMIT) as usize;
        Ok(matching
            .into_iter()
            .skip(query.skip as usize)
            .take(limit)
            .collect())
    }

    async fn conversation_history(&self, chat_id: &str) -> Result<Vec<Message>, StorebotError> {
        Ok(self.messages_of(chat_id).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn transfer_sets_fields_and_counts() {
        let storage = MemoryStorage::new();
        let chat = storage.create_chat(NewChat::default()).await.unwrap();

        let updated = storage
            .mark_transferred(TransferRequest {
                chat_id: chat.id.clone(),
                name: "Ana".into(),
                email: "ana@example.com".into(),
                query: "Refund".into(),
                inquiry_id: "INQ-1".into(),
            })
            .await
            .unwrap();

        assert!(updated.transferred_to_operator);
        assert_eq!(updated.transfer_inquiry_id.as_deref(), Some("INQ-1"));
        assert_eq!(storage.transfer_calls(), 1);
    }

    #[tokio::test]
    async fn injected_bot_failure_keeps_client_appends() {
        let storage = MemoryStorage::new();
        let chat = storage.create_chat(NewChat::default()).await.unwrap();
        storage.fail_bot_appends(true);

        assert!(
            storage
                .append_message(&chat.id, "hi", Sender::Client, None)
                .await
                .is_ok()
        );
        assert!(
            storage
                .append_message(&chat.id, "hello", Sender::Bot, Some(Intent::Greeting))
                .await
                .is_err()
        );
        assert_eq!(storage.messages_of(&chat.id).await.len(), 1);
        assert_eq!(storage.append_calls(), 2);
    }

    #[tokio::test]
    async fn list_filters_and_orders() {
        let storage = MemoryStorage::new();
        let chat = storage.create_chat(NewChat::default()).await.unwrap();
        for (text, sender) in [("a", Sender::Client), ("b", Sender::Bot), ("c", Sender::Client)] {
            storage.append_message(&chat.id, text, sender, None).await.unwrap();
        }

        let query = MessageQuery {
            sender: Some(Sender::Client),
            sort_order: SortOrder::Desc,
            ..MessageQuery::for_chat(&chat.id)
        };
        let listed: Vec<String> = storage
            .list_messages(query)
            .await
            .unwrap()
            .into_iter()
            .map(|m| m.content)
            .collect();
        assert_eq!(listed, vec!["c", "a"]);
    }
}
