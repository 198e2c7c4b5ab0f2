// SPDX-FileCopyrightText: 2026 Storebot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Store facts and catalog records handed to the tools.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Root of the store document: `{"store": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreDocument {
    pub store: StoreInfo,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreInfo {
    pub name: String,
    pub location: Location,
    pub contact: Contact,
    pub hours: Hours,
    #[serde(default)]
    pub promotions: Vec<Promotion>,
    #[serde(default)]
    pub payment_methods: Vec<String>,
    pub social_media: SocialMedia,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub city: String,
    pub country: String,
    pub address: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    pub phone: String,
    pub email: String,
    pub website: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hours {
    pub monday_to_friday: String,
    pub saturday: String,
    pub sunday: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Promotion {
    pub title: String,
    pub valid_until: NaiveDate,
}

impl Promotion {
    /// A promotion is active through the whole of its `valid_until` day.
    pub fn is_active_on(&self, day: NaiveDate) -> bool {
        self.valid_until >= day
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SocialMedia {
    pub facebook: String,
    pub instagram: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tiktok: Option<String>,
}

/// Contact channels together with social links.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactDetails {
    pub contact: Contact,
    pub social_media: SocialMedia,
}

/// A catalog product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: u64,
    pub title: String,
    pub price: f64,
    pub description: String,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<Rating>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rating {
    pub rate: f64,
    pub count: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn promotion_is_active_until_end_of_day() {
        let promo = Promotion {
            title: "Spring sale".into(),
            valid_until: NaiveDate::from_ymd_opt(2026, 3, 31).unwrap(),
        };
        assert!(promo.is_active_on(NaiveDate::from_ymd_opt(2026, 3, 31).unwrap()));
        assert!(promo.is_active_on(NaiveDate::from_ymd_opt(2026, 1, 1).unwrap()));
        assert!(!promo.is_active_on(NaiveDate::from_ymd_opt(2026, 4, 1).unwrap()));
    }

    #[test]
    fn product_tolerates_missing_optional_fields() {
        let json = r#"{"id": 1, "title": "Backpack", "price": 109.95,
            "description": "Fits 15 inch laptops", "category": "men's clothing"}"#;
        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.id, 1);
        assert!(product.rating.is_none());
        assert!(product.image.is_none());
    }
}
