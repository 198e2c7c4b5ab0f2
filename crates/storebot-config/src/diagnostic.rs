// SPDX-FileCopyrightText: 2026 Storebot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Turns figment errors into miette diagnostics.
//!
//! Unknown keys carry a "did you mean" hint computed with Jaro-Winkler
//! similarity and, when the offending file is known, a source span.

#![allow(unused_assignments)] // miette's Diagnostic derive generates code triggering this lint

use figment::error::Kind;
use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Minimum Jaro-Winkler similarity score to suggest a correction.
/// Catches typos like `max_round_trps` without suggesting unrelated keys.
const SUGGESTION_THRESHOLD: f64 = 0.75;

/// A configuration error with rich diagnostic information.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("unknown configuration key `{key}`")]
    #[diagnostic(
        code(storebot::config::unknown_key),
        help("{}", format_unknown_key_help(suggestion.as_deref(), valid_keys))
    )]
    UnknownKey {
        key: String,
        suggestion: Option<String>,
        /// Comma-separated keys accepted by the section.
        valid_keys: String,
        #[label("this key is not recognized")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    #[error("invalid type for key `{key}`: found {found}")]
    #[diagnostic(code(storebot::config::invalid_type), help("expected {expected}"))]
    InvalidType {
        key: String,
        found: String,
        expected: String,
    },

    #[error("missing required key `{key}`")]
    #[diagnostic(
        code(storebot::config::missing_key),
        help("add `{key} = <value>` to your storebot.toml")
    )]
    MissingKey { key: String },

    /// A value that deserialized but breaks a semantic rule.
    #[error("validation error: {message}")]
    #[diagnostic(code(storebot::config::validation))]
    Validation { message: String },

    #[error("configuration error: {0}")]
    #[diagnostic(code(storebot::config::other))]
    Other(String),
}

impl ConfigError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }
}

fn format_unknown_key_help(suggestion: Option<&str>, valid_keys: &str) -> String {
    match suggestion {
        Some(s) => format!("did you mean `{s}`? Valid keys: {valid_keys}"),
        None => format!("valid keys: {valid_keys}"),
    }
}

/// Convert a `figment::Error` (which may hold several errors) into diagnostics.
///
/// `toml_sources` pairs file paths with their contents for span lookup.
pub fn figment_to_config_errors(
    err: figment::Error,
    toml_sources: &[(String, String)],
) -> Vec<ConfigError> {
    err.into_iter()
        .map(|error| match &error.kind {
            Kind::UnknownField(field, expected) => {
                let (span, src) = locate_key(&error, field, toml_sources);
                ConfigError::UnknownKey {
                    key: field.clone(),
                    suggestion: suggest_key(field, expected),
                    valid_keys: expected.join(", "),
                    span,
                    src,
                }
            }
            Kind::MissingField(field) => ConfigError::MissingKey {
                key: field.to_string(),
            },
            Kind::InvalidType(found, expected) => ConfigError::InvalidType {
                key: error.path.join("."),
                found: found.to_string(),
                expected: expected.clone(),
            },
            _ => ConfigError::Other(error.to_string()),
        })
        .collect()
}

/// Span of an unknown key inside the file figment read it from, if that file was collected.
fn locate_key(
    error: &figment::error::Error,
    field: &str,
    toml_sources: &[(String, String)],
) -> (Option<SourceSpan>, Option<NamedSource<String>>) {
    let Some(figment::Source::File(origin)) = error.metadata.as_ref().and_then(|m| m.source.as_ref())
    else {
        return (None, None);
    };
    let origin = origin.display().to_string();
    let Some((path, content)) = toml_sources.iter().find(|(p, _)| *p == origin) else {
        return (None, None);
    };

    match find_key_offset(content, &error.path, field) {
        Some(offset) => (
            Some(SourceSpan::new(offset.into(), field.len())),
            Some(NamedSource::new(path, content.clone())),
        ),
        None => (None, None),
    }
}

/// Byte offset of `field` at the start of a line, searching after the `[section]`
/// header named by the first element of `path` (or from the top when `path` is empty).
pub fn find_key_offset(content: &str, path: &[String], field: &str) -> Option<usize> {
    let start = match path.first() {
        Some(section) => {
            let header = format!("[{section}]");
            content.find(&header)? + header.len()
        }
        None => 0,
    };

    let mut offset = start;
    for line in content[start..].split_inclusive('\n') {
        let trimmed = line.trim_start();
        if trimmed.starts_with('[') {
            return None;
        }
        if let Some(after) = trimmed.strip_prefix(field)
            && after.trim_start().starts_with('=')
        {
            return Some(offset + (line.len() - trimmed.len()));
        }
        offset += line.len();
    }
    None
}

/// Best match for `unknown` among `valid_keys` above the similarity threshold.
pub fn suggest_key(unknown: &str, valid_keys: &[&str]) -> Option<String> {
    valid_keys
        .iter()
        .map(|key| (strsim::jaro_winkler(unknown, key), *key))
        .filter(|(score, _)| *score > SUGGESTION_THRESHOLD)
        .max_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, key)| key.to_string())
}

/// Render diagnostics to stderr with miette's graphical handler.
pub fn render_errors(errors: &[ConfigError]) {
    let handler = miette::GraphicalReportHandler::new();
    for error in errors {
        let mut buf = String::new();
        match handler.render_report(&mut buf, error as &dyn Diagnostic) {
            Ok(()) => eprint!("{buf}"),
            Err(_) => eprintln!("Error: {error}"),
        }
    }
}
