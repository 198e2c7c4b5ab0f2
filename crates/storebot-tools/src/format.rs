// SPDX-FileCopyrightText: 2026 Storebot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Renders collaborator results as bullet text for tool messages.
//!
//! Objects become one `- Key Name: value` line per leaf, with nested keys
//! joined by a space. Lists become one bullet per item. Scalars are
//! stringified as is.

use serde::Serialize;
use serde_json::{Map, Value};

/// Text used when a result has nothing to show.
pub const EMPTY_RESULT: &str = "No data available.";

/// Serializes `result` and renders it with [`format_value`].
pub fn format_result<T: Serialize>(result: &T) -> String {
    match serde_json::to_value(result) {
        Ok(value) => format_value(&value),
        Err(e) => format!("Unreadable result: {e}"),
    }
}

pub fn format_value(value: &Value) -> String {
    let lines: Vec<String> = match value {
        Value::Object(map) => flatten(map, "")
            .into_iter()
            .map(|(key, leaf)| format!("- {}: {}", title_case(&key), inline(leaf)))
            .collect(),
        Value::Array(items) => items.iter().map(|item| format!("- {}", inline(item))).collect(),
        scalar => return scalar_text(scalar),
    };

    if lines.is_empty() {
        EMPTY_RESULT.to_string()
    } else {
        lines.join("\n")
    }
}

/// Leaf entries of `map` keyed by their space-joined path.
fn flatten<'a>(map: &'a Map<String, Value>, prefix: &str) -> Vec<(String, &'a Value)> {
    let mut out = Vec::new();
    for (key, value) in map {
        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix} {key}")
        };
        match value {
            Value::Object(nested) => out.extend(flatten(nested, &path)),
            leaf => out.push((path, leaf)),
        }
    }
    out
}

/// Single-line rendering used inside a bullet.
fn inline(value: &Value) -> String {
    match value {
        Value::Object(map) => flatten(map, "")
            .into_iter()
            .map(|(key, leaf)| format!("{}: {}", title_case(&key), inline(leaf)))
            .collect::<Vec<_>>()
            .join(", "),
        Value::Array(items) => {
            let sep = if items.iter().any(Value::is_object) { "; " } else { ", " };
            items.iter().map(inline).collect::<Vec<_>>().join(sep)
        }
        scalar => scalar_text(scalar),
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::Null => "N/A".to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// `monday_to_friday` -> `Monday To Friday`.
fn title_case(key: &str) -> String {
    key.replace('_', " ")
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}
