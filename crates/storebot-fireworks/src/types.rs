// SPDX-FileCopyrightText: 2026 Storebot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wire types for the OpenAI-compatible chat completions API.

use serde::{Deserialize, Serialize};

// --- Request types ---

/// Request body for `POST /chat/completions`.
#[derive(Debug, Clone, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ApiMessage>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<ApiTool>,
    pub max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    pub stream: bool,
}

/// A transcript message as the API represents it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiMessage {
    pub role: String,
    /// Null for assistant messages that only carry tool calls.
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ApiToolCall>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

/// A function call requested by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiToolCall {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "type", default = "function_type")]
    pub type_: String,
    pub function: ApiFunctionCall,
}

/// Name and JSON-encoded arguments of a requested call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiFunctionCall {
    pub name: String,
    /// Arguments as a JSON string.
    #[serde(default)]
    pub arguments: String,
}

/// A tool offered to the model.
#[derive(Debug, Clone, Serialize)]
pub struct ApiTool {
    #[serde(rename = "type")]
    pub type_: String,
    pub function: ApiFunction,
}

#[derive(Debug, Clone, Serialize)]
pub struct ApiFunction {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

fn function_type() -> String {
    "function".to_string()
}

// --- Response types ---

/// Response body of a non-streaming completion.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub model: String,
    pub choices: Vec<Choice>,
    #[serde(default)]
    pub usage: Option<ApiUsage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Choice {
    #[serde(default)]
    pub index: u32,
    pub message: ApiMessage,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// Token usage statistics from the API.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct ApiUsage {
    #[serde(default)]
    pub prompt_tokens: u32,
    #[serde(default)]
    pub completion_tokens: u32,
}

/// API error body.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorDetail {
    #[serde(rename = "type", default)]
    pub type_: Option<String>,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_omits_empty_tools_and_temperature() {
        let req = ChatCompletionRequest {
            model: "accounts/fireworks/models/qwen3-30b-a3b".into(),
            messages: vec![ApiMessage {
                role: "user".into(),
                content: Some("Hello".into()),
                tool_calls: vec![],
                tool_call_id: None,
            }],
            tools: vec![],
            max_tokens: 256,
            temperature: None,
            stream: false,
        };
        let json = serde_json::to_value(&req).unwrap();
        assert!(json.get("tools").is_none());
        assert!(json.get("temperature").is_none());
        assert_eq!(json["messages"][0]["content"], "Hello");
        assert!(json["messages"][0].get("tool_calls").is_none());
    }

    #[test]
    fn tool_serializes_as_function() {
        let tool = ApiTool {
            type_: "function".into(),
            function: ApiFunction {
                name: "get_store_data".into(),
                description: "Store facts".into(),
                parameters: serde_json::json!({"type": "object"}),
            },
        };
        let json = serde_json::to_value(&tool).unwrap();
        assert_eq!(json["type"], "function");
        assert_eq!(json["function"]["name"], "get_store_data");
    }

    #[test]
    fn response_with_tool_calls_and_null_content() {
        let body = r#"{
            "id": "cmpl-1",
            "model": "qwen3",
            "choices": [{
                "index": 0,
                "message": {
                    "role": "assistant",
                    "content": null,
                    "tool_calls": [{
                        "id": "call_1",
                        "type": "function",
                        "function": {"name": "get_store_data", "arguments": "{\"intent\": \"store_hours\"}"}
                    }]
                },
                "finish_reason": "tool_calls"
            }]
        }"#;
        let resp: ChatCompletionResponse = serde_json::from_str(body).unwrap();
        let msg = &resp.choices[0].message;
        assert!(msg.content.is_none());
        assert_eq!(msg.tool_calls[0].function.name, "get_store_data");
        assert!(resp.usage.is_none());
    }

    #[test]
    fn error_body_without_type() {
        let body = r#"{"error": {"message": "model not found"}}"#;
        let err: ApiErrorResponse = serde_json::from_str(body).unwrap();
        assert!(err.error.type_.is_none());
        assert_eq!(err.error.message, "model not found");
    }
}
