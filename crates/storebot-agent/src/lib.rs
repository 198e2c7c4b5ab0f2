// SPDX-FileCopyrightText: 2026 Storebot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation orchestration for Storebot.
//!
//! [`ConversationEngine`] drives the model through the bounded tool loop,
//! [`TurnProcessor`] persists each turn, and [`TurnDispatcher`] runs turns
//! in the background with per-chat serialization.

pub mod dispatcher;
pub mod engine;
pub mod parser;
pub mod processor;
pub mod prompt;
pub mod shutdown;

pub use dispatcher::TurnDispatcher;
pub use engine::{ConversationEngine, EngineReply, EngineSettings, FALLBACK_REPLY, Responder};
pub use parser::{ParsedReply, extract};
pub use processor::{EMPTY_CONTENT_REPLY, TurnOutcome, TurnProcessor};
pub use prompt::system_prompt;
pub use shutdown::{drain_turns, install_signal_handler};
