// SPDX-FileCopyrightText: 2026 Storebot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Storebot support backend.

use thiserror::Error;

/// The primary error type used across all collaborator traits and core operations.
#[derive(Debug, Error)]
pub enum StorebotError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (database connection, query failure, serialization).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Language model provider errors (API failure, malformed response).
    #[error("provider error: {message}")]
    Provider {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Product catalog errors (service unreachable, unexpected status).
    #[error("{message}")]
    Catalog {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Store facts could not be loaded or decoded.
    #[error("store data error: {0}")]
    StoreData(String),

    /// A referenced record does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Input rejected before reaching a collaborator.
    #[error("validation error: {0}")]
    Validation(String),

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl StorebotError {
    /// Shorthand for a [`StorebotError::NotFound`].
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Shorthand for a [`StorebotError::Catalog`] without an underlying cause.
    pub fn catalog(message: impl Into<String>) -> Self {
        Self::Catalog {
            message: message.into(),
            source: None,
        }
    }
}
