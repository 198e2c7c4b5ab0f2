// SPDX-FileCopyrightText: 2026 Storebot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Collaborator trait definitions.
//!
//! Network-backed collaborators extend the [`PluginAdapter`] base trait and
//! use `#[async_trait]` for dynamic dispatch compatibility. The store
//! directory is in-memory and synchronous.

pub mod adapter;
pub mod catalog;
pub mod provider;
pub mod storage;
pub mod store;

pub use adapter::PluginAdapter;
pub use catalog::CatalogAdapter;
pub use provider::ProviderAdapter;
pub use storage::StorageAdapter;
pub use store::StoreInfoProvider;
