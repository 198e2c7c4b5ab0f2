// SPDX-FileCopyrightText: 2026 Storebot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence layer for Storebot.
//!
//! Provides WAL-mode SQLite storage with embedded migrations, a single-writer
//! concurrency model via `tokio-rusqlite`, and typed operations for chats
//! and messages.

pub mod adapter;
pub mod database;
pub mod migrations;
pub mod queries;

pub use adapter::SqliteStorage;
pub use database::Database;
