// SPDX-FileCopyrightText: 2026 Storebot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Store-info provider trait.

use crate::error::StorebotError;
use crate::retail::{ContactDetails, Hours, Location, Promotion, SocialMedia, StoreInfo};

/// Synchronous access to the static facts about the store.
pub trait StoreInfoProvider: Send + Sync {
    fn store_info(&self) -> Result<StoreInfo, StorebotError>;

    fn hours(&self) -> Result<Hours, StorebotError>;

    fn contact(&self) -> Result<ContactDetails, StorebotError>;

    /// Promotions that are still valid today.
    fn promotions(&self) -> Result<Vec<Promotion>, StorebotError>;

    fn payment_methods(&self) -> Result<Vec<String>, StorebotError>;

    fn social_media(&self) -> Result<SocialMedia, StorebotError>;

    fn location(&self) -> Result<Location, StorebotError>;
}
