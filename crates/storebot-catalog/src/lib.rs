// SPDX-FileCopyrightText: 2026 Storebot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Read-only retail collaborators for Storebot.
//!
//! [`StoreDirectory`] serves the static store facts and [`FakeStoreClient`]
//! queries the remote product catalog.

pub mod directory;
pub mod fakestore;

pub use directory::{BUNDLED_STORE_JSON, StoreDirectory};
pub use fakestore::FakeStoreClient;
