// SPDX-FileCopyrightText: 2026 Storebot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP surface of the Storebot support backend.
//!
//! Exposes chats and messages over axum. Creating a client message
//! schedules a background turn on the [`storebot_agent::TurnDispatcher`].

pub mod error;
pub mod handlers;
pub mod server;

pub use error::{ApiError, ErrorResponse};
pub use server::{AppState, build_router, cors_layer, start_server};
