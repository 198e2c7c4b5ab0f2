// SPDX-FileCopyrightText: 2026 Storebot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Storebot support backend.
//!
//! This crate provides the domain types, the intent taxonomy, the
//! conversation state, the error type, and the collaborator traits that
//! storage, model, and catalog adapters implement.

pub mod error;
pub mod intent;
pub mod retail;
pub mod state;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::StorebotError;
pub use intent::{Intent, parse_intent};
pub use state::{ChatMessage, ConversationState, Role, StateUpdate, ToolCall};
pub use types::{AdapterType, Chat, HealthStatus, Message, Sender};

pub use traits::{
    CatalogAdapter, PluginAdapter, ProviderAdapter, StorageAdapter, StoreInfoProvider,
};
