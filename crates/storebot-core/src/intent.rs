// SPDX-FileCopyrightText: 2026 Storebot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The closed intent taxonomy shared by the prompt, the parser and persistence.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

/// Classification label attached to a message.
///
/// Labels render as `SCREAMING_SNAKE_CASE` and parse case-insensitively.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumString,
    EnumIter,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Intent {
    GeneralQuestion,
    Greeting,
    StoreInfo,
    StoreHours,
    StoreContact,
    StorePromotions,
    StorePaymentMethods,
    StoreSocialMedia,
    StoreLocation,
    ProductList,
    ProductCategories,
    ProductDetails,
    ProductListByCategory,
    HumanAssistance,
    Other,
}

impl Intent {
    /// All labels in declaration order.
    pub fn all() -> impl Iterator<Item = Intent> {
        Intent::iter()
    }

    /// Lowercase form used as a tool argument (`store_hours`, `product_list`).
    pub fn as_tool_key(&self) -> String {
        self.to_string().to_ascii_lowercase()
    }

    /// Whether this label names one of the seven store facts.
    pub fn is_store_fact(&self) -> bool {
        matches!(
            self,
            Intent::StoreInfo
                | Intent::StoreHours
                | Intent::StoreContact
                | Intent::StorePromotions
                | Intent::StorePaymentMethods
                | Intent::StoreSocialMedia
                | Intent::StoreLocation
        )
    }

    /// Whether this label names one of the four catalog queries.
    pub fn is_product_query(&self) -> bool {
        matches!(
            self,
            Intent::ProductList
                | Intent::ProductCategories
                | Intent::ProductDetails
                | Intent::ProductListByCategory
        )
    }
}

/// Maps arbitrary model output to an [`Intent`], falling back to [`Intent::Other`].
///
/// Surrounding whitespace is ignored and matching is case-insensitive.
pub fn parse_intent(raw: &str) -> Intent {
    Intent::from_str(raw.trim()).unwrap_or(Intent::Other)
}
