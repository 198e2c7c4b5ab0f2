// SPDX-FileCopyrightText: 2026 Storebot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Static store facts loaded from a JSON document.

use std::path::Path;

use chrono::{Local, NaiveDate};
use storebot_config::model::StoreConfig;
use storebot_core::StorebotError;
use storebot_core::retail::{
    ContactDetails, Hours, Location, Promotion, SocialMedia, StoreDocument, StoreInfo,
};
use storebot_core::traits::StoreInfoProvider;
use tracing::debug;

/// Document compiled into the binary, used when no data file is configured.
pub const BUNDLED_STORE_JSON: &str = include_str!("../data/store.json");

/// In-memory store facts.
#[derive(Debug, Clone)]
pub struct StoreDirectory {
    store: StoreInfo,
}

impl StoreDirectory {
    pub fn new(store: StoreInfo) -> Self {
        Self { store }
    }

    /// Parses a `{"store": {...}}` document.
    pub fn from_json_str(json: &str) -> Result<Self, StorebotError> {
        let doc: StoreDocument = serde_json::from_str(json)
            .map_err(|e| StorebotError::StoreData(format!("invalid store document: {e}")))?;
        Ok(Self::new(doc.store))
    }

    pub fn from_path(path: &Path) -> Result<Self, StorebotError> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            StorebotError::StoreData(format!(
                "store data file not readable: {}: {e}",
                path.display()
            ))
        })?;
        Self::from_json_str(&raw)
    }

    pub fn bundled() -> Result<Self, StorebotError> {
        Self::from_json_str(BUNDLED_STORE_JSON)
    }

    /// Loads the configured data file, or the bundled document when unset.
    pub fn from_config(config: &StoreConfig) -> Result<Self, StorebotError> {
        match config.data_file.as_deref() {
            Some(path) => {
                debug!(path, "loading store data file");
                Self::from_path(Path::new(path))
            }
            None => Self::bundled(),
        }
    }

    /// Promotions whose last valid day is on or after `day`.
    pub fn promotions_active_on(&self, day: NaiveDate) -> Vec<Promotion> {
        self.store
            .promotions
            .iter()
            .filter(|p| p.is_active_on(day))
            .cloned()
            .collect()
    }
}

impl StoreInfoProvider for StoreDirectory {
    fn store_info(&self) -> Result<StoreInfo, StorebotError> {
        Ok(self.store.clone())
    }

    fn hours(&self) -> Result<Hours, StorebotError> {
        Ok(self.store.hours.clone())
    }

    fn contact(&self) -> Result<ContactDetails, StorebotError> {
        Ok(ContactDetails {
            contact: self.store.contact.clone(),
            social_media: self.store.social_media.clone(),
        })
    }

    fn promotions(&self) -> Result<Vec<Promotion>, StorebotError> {
        Ok(self.promotions_active_on(Local::now().date_naive()))
    }

    fn payment_methods(&self) -> Result<Vec<String>, StorebotError> {
        Ok(self.store.payment_methods.clone())
    }

    fn social_media(&self) -> Result<SocialMedia, StorebotError> {
        Ok(self.store.social_media.clone())
    }

    fn location(&self) -> Result<Location, StorebotError> {
        Ok(self.store.location.clone())
    }
}
