// SPDX-FileCopyrightText: 2026 Storebot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Provider adapter trait for language model integrations.

use async_trait::async_trait;

use crate::error::StorebotError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{ProviderRequest, ProviderResponse};

/// Adapter for language model APIs with tool calling.
///
/// The response message either holds final text or one or more tool calls.
#[async_trait]
pub trait ProviderAdapter: PluginAdapter {
    /// Sends a completion request and returns the full response.
    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, StorebotError>;
}
