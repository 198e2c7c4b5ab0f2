// SPDX-FileCopyrightText: 2026 Storebot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Storebot integration testing.
//!
//! Provides a scripted model, in-memory storage, offline retail
//! collaborators and a harness that wires the full turn stack.

pub mod harness;
pub mod memory_storage;
pub mod mock_catalog;
pub mod mock_provider;

pub use harness::TestHarness;
pub use memory_storage::MemoryStorage;
pub use mock_catalog::{FixtureStore, MockCatalog, sample_product, sample_products};
pub use mock_provider::{MockProvider, ScriptedReply};
