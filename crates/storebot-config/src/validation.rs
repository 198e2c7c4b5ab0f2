// SPDX-FileCopyrightText: 2026 Storebot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde attributes,
//! such as non-empty paths, positive timeouts, and well-formed base URLs.

use crate::diagnostic::ConfigError;
use crate::model::StorebotConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Collects every failure instead of stopping at the first one.
pub fn validate_config(config: &StorebotConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.agent.name.trim().is_empty() {
        errors.push(ConfigError::validation("agent.name must not be empty"));
    }

    if !LOG_LEVELS.contains(&config.agent.log_level.to_ascii_lowercase().as_str()) {
        errors.push(ConfigError::validation(format!(
            "agent.log_level `{}` is not one of {}",
            config.agent.log_level,
            LOG_LEVELS.join(", ")
        )));
    }

    if config.agent.max_round_trips == 0 {
        errors.push(ConfigError::validation(
            "agent.max_round_trips must be at least 1",
        ));
    }

    if config.agent.max_cached_chats == 0 {
        errors.push(ConfigError::validation(
            "agent.max_cached_chats must be at least 1",
        ));
    }

    for (key, secs) in [
        ("agent.model_timeout_secs", config.agent.model_timeout_secs),
        ("agent.tool_timeout_secs", config.agent.tool_timeout_secs),
        ("catalog.timeout_secs", config.catalog.timeout_secs),
    ] {
        if secs == 0 {
            errors.push(ConfigError::validation(format!(
                "{key} must be greater than 0"
            )));
        }
    }

    if !(0.0..=2.0).contains(&config.agent.temperature) {
        errors.push(ConfigError::validation(format!(
            "agent.temperature must be between 0.0 and 2.0, got {}",
            config.agent.temperature
        )));
    }

    if config.agent.max_tokens == 0 {
        errors.push(ConfigError::validation("agent.max_tokens must be at least 1"));
    }

    if config.fireworks.model.trim().is_empty() {
        errors.push(ConfigError::validation("fireworks.model must not be empty"));
    }

    for (key, url) in [
        ("fireworks.base_url", &config.fireworks.base_url),
        ("catalog.base_url", &config.catalog.base_url),
    ] {
        if !is_http_url(url) {
            errors.push(ConfigError::validation(format!(
                "{key} `{url}` must start with http:// or https://"
            )));
        }
    }

    if config.catalog.default_limit == 0 {
        errors.push(ConfigError::validation(
            "catalog.default_limit must be at least 1",
        ));
    }

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::validation(
            "storage.database_path must not be empty",
        ));
    }

    if let Some(path) = &config.store.data_file
        && path.trim().is_empty()
    {
        errors.push(ConfigError::validation(
            "store.data_file must not be empty when set",
        ));
    }

    if config.gateway.host.trim().is_empty() {
        errors.push(ConfigError::validation("gateway.host must not be empty"));
    }

    if config.gateway.cors_origins.iter().any(|o| o.trim().is_empty()) {
        errors.push(ConfigError::validation(
            "gateway.cors_origins must not contain empty entries",
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn is_http_url(url: &str) -> bool {
    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"));
    rest.is_some_and(|host| !host.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn messages(errors: &[ConfigError]) -> Vec<String> {
        errors.iter().map(|e| e.to_string()).collect()
    }

    #[test]
    fn default_config_is_valid() {
        assert!(validate_config(&StorebotConfig::default()).is_ok());
    }

    #[test]
    fn zero_round_trips_is_rejected() {
        let mut config = StorebotConfig::default();
        config.agent.max_round_trips = 0;
        let errors = validate_config(&config).unwrap_err();
        assert!(messages(&errors)[0].contains("agent.max_round_trips"));
    }

    #[test]
    fn zero_cached_chats_is_rejected() {
        let mut config = StorebotConfig::default();
        config.agent.max_cached_chats = 0;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(messages(&errors)[0].contains("agent.max_cached_chats"));
    }

    #[test]
    fn all_errors_are_collected() {
        let mut config = StorebotConfig::default();
        config.agent.model_timeout_secs = 0;
        config.agent.tool_timeout_secs = 0;
        config.catalog.base_url = "fakestoreapi.com".into();
        config.storage.database_path = "  ".into();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 4, "got: {:?}", messages(&errors));
    }

    #[test]
    fn temperature_out_of_range_is_rejected() {
        let mut config = StorebotConfig::default();
        config.agent.temperature = 3.5;
        let errors = validate_config(&config).unwrap_err();
        assert!(messages(&errors)[0].contains("agent.temperature"));
    }

    #[test]
    fn log_level_is_case_insensitive() {
        let mut config = StorebotConfig::default();
        config.agent.log_level = "DEBUG".into();
        assert!(validate_config(&config).is_ok());
        config.agent.log_level = "verbose".into();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn http_url_check() {
        assert!(is_http_url("https://fakestoreapi.com"));
        assert!(is_http_url("http://127.0.0.1:9000"));
        assert!(!is_http_url("https://"));
        assert!(!is_http_url("ftp://example.com"));
    }
}
