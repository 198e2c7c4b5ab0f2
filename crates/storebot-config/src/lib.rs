// SPDX-FileCopyrightText: 2026 Storebot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration system for the Storebot support backend.
//!
//! Provides TOML configuration parsing with strict validation (`deny_unknown_fields`),
//! XDG file hierarchy lookup, environment variable overrides, and diagnostic
//! error rendering with typo suggestions.
//!
//! # Usage
//!
//! ```no_run
//! use storebot_config::load_and_validate;
//!
//! let config = load_and_validate().expect("config errors");
//! println!("Assistant name: {}", config.agent.name);
//! ```

pub mod diagnostic;
pub mod loader;
pub mod model;
pub mod validation;

pub use diagnostic::{ConfigError, render_errors};
pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::StorebotConfig;

/// Load configuration from the XDG hierarchy and validate it.
///
/// Figment errors become diagnostics with typo suggestions; a config that
/// deserializes is then checked by [`validation::validate_config`].
pub fn load_and_validate() -> Result<StorebotConfig, Vec<ConfigError>> {
    match loader::load_config() {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => Err(diagnostic::figment_to_config_errors(
            err,
            &collect_toml_sources(),
        )),
    }
}

/// Load configuration from a specific TOML string and validate it.
pub fn load_and_validate_str(toml_content: &str) -> Result<StorebotConfig, Vec<ConfigError>> {
    match loader::load_config_from_str(toml_content) {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => {
            let sources = vec![("<inline>".to_string(), toml_content.to_string())];
            Err(diagnostic::figment_to_config_errors(err, &sources))
        }
    }
}

/// Load configuration from an explicit file (plus env overrides) and validate it.
pub fn load_and_validate_path(
    path: &std::path::Path,
) -> Result<StorebotConfig, Vec<ConfigError>> {
    match loader::load_config_from_path(path) {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => {
            let sources: Vec<(String, String)> = std::fs::read_to_string(path)
                .map(|content| vec![(path.display().to_string(), content)])
                .unwrap_or_default();
            Err(diagnostic::figment_to_config_errors(err, &sources))
        }
    }
}

/// Contents of every config file that exists, keyed by the path figment reports.
fn collect_toml_sources() -> Vec<(String, String)> {
    loader::config_file_paths()
        .into_iter()
        .filter_map(|path| {
            let content = std::fs::read_to_string(&path).ok()?;
            let shown = if path.is_relative() {
                std::env::current_dir()
                    .map(|d| d.join(&path))
                    .unwrap_or_else(|_| path.clone())
            } else {
                path
            };
            tracing::debug!(path = %shown.display(), "read config file");
            Some((shown.display().to_string(), content))
        })
        .collect()
}
