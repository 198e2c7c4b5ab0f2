// SPDX-FileCopyrightText: 2026 Storebot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Storebot support backend.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Storebot configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorebotConfig {
    /// Assistant identity and turn loop settings.
    #[serde(default)]
    pub agent: AgentConfig,

    /// Fireworks (OpenAI-compatible) model API settings.
    #[serde(default)]
    pub fireworks: FireworksConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Product catalog API settings.
    #[serde(default)]
    pub catalog: CatalogConfig,

    /// Store facts source.
    #[serde(default)]
    pub store: StoreConfig,

    /// HTTP gateway settings.
    #[serde(default)]
    pub gateway: GatewayConfig,
}

/// Assistant identity and turn loop configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    /// Display name of the assistant and the HTTP app.
    #[serde(default = "default_agent_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Upper bound on assistant round-trips within one turn.
    #[serde(default = "default_max_round_trips")]
    pub max_round_trips: usize,

    /// Seconds allowed for a single model call.
    #[serde(default = "default_call_timeout_secs")]
    pub model_timeout_secs: u64,

    /// Seconds allowed for a single tool invocation.
    #[serde(default = "default_call_timeout_secs")]
    pub tool_timeout_secs: u64,

    /// Maximum tokens the model may generate per call.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Sampling temperature.
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Chat states kept in memory before idle ones are evicted.
    #[serde(default = "default_max_cached_chats")]
    pub max_cached_chats: usize,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: default_agent_name(),
            log_level: default_log_level(),
            max_round_trips: default_max_round_trips(),
            model_timeout_secs: default_call_timeout_secs(),
            tool_timeout_secs: default_call_timeout_secs(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            max_cached_chats: default_max_cached_chats(),
        }
    }
}

fn default_agent_name() -> String {
    "Store Helper Bot".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_max_round_trips() -> usize {
    10
}

fn default_call_timeout_secs() -> u64 {
    30
}

fn default_max_tokens() -> u32 {
    1024
}

fn default_temperature() -> f32 {
    0.2
}

fn default_max_cached_chats() -> usize {
    1000
}

/// Fireworks API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct FireworksConfig {
    /// API key. Falls back to the `FIREWORKS_API_KEY` environment variable.
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_fireworks_base_url")]
    pub base_url: String,

    /// Model identifier sent with every request.
    #[serde(default = "default_fireworks_model")]
    pub model: String,
}

impl Default for FireworksConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_fireworks_base_url(),
            model: default_fireworks_model(),
        }
    }
}

fn default_fireworks_base_url() -> String {
    "https://api.fireworks.ai/inference/v1".to_string()
}

fn default_fireworks_model() -> String {
    "accounts/fireworks/models/qwen3-30b-a3b".to_string()
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("storebot").join("storebot.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("storebot.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_wal_mode() -> bool {
    true
}

/// Product catalog API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CatalogConfig {
    #[serde(default = "default_catalog_base_url")]
    pub base_url: String,

    /// Request timeout in seconds.
    #[serde(default = "default_catalog_timeout_secs")]
    pub timeout_secs: u64,

    /// Number of products returned by a plain listing.
    #[serde(default = "default_catalog_limit")]
    pub default_limit: u32,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: default_catalog_base_url(),
            timeout_secs: default_catalog_timeout_secs(),
            default_limit: default_catalog_limit(),
        }
    }
}

fn default_catalog_base_url() -> String {
    "https://fakestoreapi.com".to_string()
}

fn default_catalog_timeout_secs() -> u64 {
    10
}

fn default_catalog_limit() -> u32 {
    10
}

/// Store facts configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StoreConfig {
    /// Path to a store JSON document. The bundled document is used when unset.
    #[serde(default)]
    pub data_file: Option<String>,
}

/// HTTP gateway configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    #[serde(default = "default_gateway_host")]
    pub host: String,

    #[serde(default = "default_gateway_port")]
    pub port: u16,

    /// Allowed CORS origins. `"*"` allows any origin.
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,

    /// Deployment label reported by the root endpoint.
    #[serde(default = "default_environment")]
    pub environment: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_gateway_host(),
            port: default_gateway_port(),
            cors_origins: default_cors_origins(),
            environment: default_environment(),
        }
    }
}

fn default_gateway_host() -> String {
    "127.0.0.1".to_string()
}

fn default_gateway_port() -> u16 {
    8000
}

fn default_cors_origins() -> Vec<String> {
    vec!["*".to_string()]
}

fn default_environment() -> String {
    "development".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = StorebotConfig::default();
        assert_eq!(config.agent.name, "Store Helper Bot");
        assert_eq!(config.agent.max_round_trips, 10);
        assert_eq!(config.agent.model_timeout_secs, 30);
        assert_eq!(config.agent.tool_timeout_secs, 30);
        assert_eq!(config.catalog.base_url, "https://fakestoreapi.com");
        assert_eq!(config.catalog.timeout_secs, 10);
        assert_eq!(config.fireworks.model, "accounts/fireworks/models/qwen3-30b-a3b");
        assert!(config.fireworks.api_key.is_none());
        assert!(config.store.data_file.is_none());
        assert_eq!(config.gateway.port, 8000);
        assert!(config.storage.database_path.ends_with("storebot.db"));
    }

    #[test]
    fn defaults_serialize_to_toml() {
        let rendered = toml::to_string(&StorebotConfig::default()).unwrap();
        assert!(rendered.contains("[agent]"));
        assert!(rendered.contains("max_round_trips = 10"));
    }
}
