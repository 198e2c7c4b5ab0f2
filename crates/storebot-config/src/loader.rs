// SPDX-FileCopyrightText: 2026 Storebot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./storebot.toml` > `~/.config/storebot/storebot.toml` >
//! `/etc/storebot/storebot.toml` with environment variable overrides via `STOREBOT_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::StorebotConfig;

/// Section names that environment keys may address.
const SECTIONS: &[&str] = &["agent", "fireworks", "storage", "catalog", "store", "gateway"];

/// Config file locations, lowest precedence first.
pub fn config_file_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from("/etc/storebot/storebot.toml")];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("storebot/storebot.toml"));
    }
    paths.push(PathBuf::from("storebot.toml"));
    paths
}

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/storebot/storebot.toml` (system-wide)
/// 3. `~/.config/storebot/storebot.toml` (user XDG config)
/// 4. `./storebot.toml` (local directory)
/// 5. `STOREBOT_*` environment variables
pub fn load_config() -> Result<StorebotConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<StorebotConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(StorebotConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<StorebotConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(StorebotConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used internally for config loading.
pub fn build_figment() -> Figment {
    config_file_paths().into_iter().fold(
        Figment::new().merge(Serialized::defaults(StorebotConfig::default())),
        |figment, path| figment.merge(Toml::file(path)),
    )
    .merge(env_provider())
}

/// Environment provider mapping `STOREBOT_<SECTION>_<KEY>` to `<section>.<key>`.
///
/// Only the first underscore after a known section name becomes a dot, so
/// `STOREBOT_FIREWORKS_API_KEY` maps to `fireworks.api_key`.
fn env_provider() -> Env {
    Env::prefixed("STOREBOT_").map(|key| map_env_key(key.as_str()).into())
}

fn map_env_key(key: &str) -> String {
    for section in SECTIONS {
        if let Some(rest) = key.strip_prefix(section).and_then(|r| r.strip_prefix('_')) {
            return format!("{section}.{rest}");
        }
    }
    key.to_string()
}
