// SPDX-FileCopyrightText: 2026 Storebot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Recovers the `{reply, intent}` object from free-form model output.
//!
//! Candidates are fenced ```` ```json ```` blocks, or balanced top-level
//! `{...}` spans when no fence is present. The last candidate that decodes
//! as a JSON object wins. `<think>` sections are dropped before scanning.

use std::sync::LazyLock;

use regex::Regex;
use storebot_core::intent::{Intent, parse_intent};

pub const EMPTY_RESPONSE: &str = "Empty response";
pub const INVALID_JSON: &str = "Invalid or missing JSON";

static FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)```json\s*(.*?)```").expect("fence pattern is valid"));

static THINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<think>.*?(</think>|$)").expect("think pattern is valid")
});

/// The structured answer carried by a model reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedReply {
    pub reply: String,
    pub intent: Intent,
}

impl ParsedReply {
    fn fallback(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            intent: Intent::Other,
        }
    }
}

/// Total: every input yields a reply and an intent from the closed set.
pub fn extract(raw_text: &str) -> ParsedReply {
    if raw_text.trim().is_empty() {
        return ParsedReply::fallback(EMPTY_RESPONSE);
    }

    let text = THINK.replace_all(raw_text, "");

    let mut candidates: Vec<&str> = FENCE
        .captures_iter(&text)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str())
        .collect();
    if candidates.is_empty() {
        candidates = brace_spans(&text);
    }

    for candidate in candidates.iter().rev() {
        if let Ok(serde_json::Value::Object(obj)) =
            serde_json::from_str::<serde_json::Value>(candidate.trim())
        {
            let reply = match obj.get("reply") {
                Some(serde_json::Value::String(s)) => s.clone(),
                Some(serde_json::Value::Null) | None => String::new(),
                Some(other) => other.to_string(),
            };
            let intent = obj
                .get("intent")
                .and_then(serde_json::Value::as_str)
                .map(parse_intent)
                .unwrap_or(Intent::Other);
            return ParsedReply { reply, intent };
        }
    }

    ParsedReply::fallback(INVALID_JSON)
}

/// Top-level balanced `{...}` spans. Braces inside JSON strings are ignored.
fn brace_spans(text: &str) -> Vec<&str> {
    let mut spans = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (idx, ch) in text.char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' if depth > 0 => in_string = true,
            '{' => {
                if depth == 0 {
                    start = idx;
                }
                depth += 1;
            }
            '}' if depth > 0 => {
                depth -= 1;
                if depth == 0 {
                    spans.push(&text[start..=idx]);
                }
            }
            _ => {}
        }
    }
    spans
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_and_whitespace() {
        assert_eq!(extract(""), ParsedReply::fallback(EMPTY_RESPONSE));
        assert_eq!(extract("  \n\t "), ParsedReply::fallback(EMPTY_RESPONSE));
    }

    #[test]
    fn plain_text_is_invalid() {
        assert_eq!(extract("Hello there!"), ParsedReply::fallback(INVALID_JSON));
    }

    #[test]
    fn bare_object() {
        let parsed = extract(r#"{"reply": "Hi!", "intent": "GREETING"}"#);
        assert_eq!(parsed.reply, "Hi!");
        assert_eq!(parsed.intent, Intent::Greeting);
    }

    #[test]
    fn fenced_object_with_noise() {
        let raw = "Sure, here you go:\n```json\n{\"reply\": \"We open at 9.\", \"intent\": \"store_hours\"}\n```\nAnything else?";
        let parsed = extract(raw);
        assert_eq!(parsed.reply, "We open at 9.");
        assert_eq!(parsed.intent, Intent::StoreHours);
    }

    #[test]
    fn last_valid_fence_wins() {
        let raw = "```json\n{\"reply\": \"broken\", \n```\nOops, corrected:\n```json\n{\"reply\": \"fixed\", \"intent\": \"OTHER\"}\n```";
        assert_eq!(extract(raw).reply, "fixed");
    }

    #[test]
    fn later_valid_block_preferred_over_earlier_valid() {
        let raw = r#"{"reply": "first", "intent": "GREETING"} then {"reply": "second", "intent": "STORE_INFO"}"#;
        let parsed = extract(raw);
        assert_eq!(parsed.reply, "second");
        assert_eq!(parsed.intent, Intent::StoreInfo);
    }

    #[test]
    fn falls_back_to_earlier_candidate_when_last_is_malformed() {
        let raw = r#"{"reply": "good", "intent": "GREETING"} and then {reply: bad}"#;
        assert_eq!(extract(raw).reply, "good");
    }

    #[test]
    fn fence_marker_is_case_insensitive() {
        let raw = "```JSON\n{\"reply\": \"ok\", \"intent\": \"GREETING\"}\n```";
        assert_eq!(extract(raw).intent, Intent::Greeting);
    }

    #[test]
    fn missing_fields_default() {
        let parsed = extract(r#"{"intent": "GREETING"}"#);
        assert_eq!(parsed.reply, "");
        assert_eq!(parsed.intent, Intent::Greeting);

        let parsed = extract(r#"{"reply": "hi"}"#);
        assert_eq!(parsed.intent, Intent::Other);
    }

    #[test]
    fn unknown_intent_is_other() {
        assert_eq!(
            extract(r#"{"reply": "x", "intent": "SMALL_TALK"}"#).intent,
            Intent::Other
        );
    }

    #[test]
    fn nested_object_and_braces_in_strings() {
        let raw = r#"Answer: {"reply": "Use {code} at checkout", "intent": "STORE_PROMOTIONS", "meta": {"a": 1}}"#;
        let parsed = extract(raw);
        assert_eq!(parsed.reply, "Use {code} at checkout");
        assert_eq!(parsed.intent, Intent::StorePromotions);
    }

    #[test]
    fn think_section_is_ignored() {
        let raw = "<think>The user greets me. Maybe {\"reply\": \"no\"}</think>\n{\"reply\": \"Hello!\", \"intent\": \"GREETING\"}";
        assert_eq!(extract(raw).reply, "Hello!");
    }

    #[test]
    fn json_array_is_not_an_object() {
        assert_eq!(
            extract("```json\n[1, 2, 3]\n```"),
            ParsedReply::fallback(INVALID_JSON)
        );
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn extract_is_total(raw in any::<String>()) {
                let parsed = extract(&raw);
                prop_assert!(Intent::all().any(|i| i == parsed.intent));
            }

            #[test]
            fn wrapped_object_round_trips(reply in "[a-zA-Z0-9 .,!?]{0,40}", prefix in "[a-z ]{0,20}") {
                let body = serde_json::json!({"reply": reply, "intent": "GREETING"}).to_string();
                let raw = format!("{prefix}```json\n{body}\n```");
                let parsed = extract(&raw);
                prop_assert_eq!(parsed.reply, reply);
                prop_assert_eq!(parsed.intent, Intent::Greeting);
            }
        }
    }
}
