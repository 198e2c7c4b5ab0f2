// SPDX-FileCopyrightText: 2026 Storebot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tools the assistant can call during a turn.
//!
//! Each tool holds explicit references to its collaborators and answers a
//! call with a [`StateUpdate`](storebot_core::StateUpdate) whose tool
//! message is plain bullet text, never raw JSON.

pub mod builtin;
pub mod format;
pub mod tool;

pub use builtin::{HumanAssistanceTool, ProductsDataTool, StoreDataTool, register_storefront};
pub use tool::{Tool, ToolRegistry};
