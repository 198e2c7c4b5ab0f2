// SPDX-FileCopyrightText: 2026 Storebot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the Fireworks chat completions endpoint.

use std::time::Duration;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use storebot_core::StorebotError;
use tracing::{debug, warn};

use crate::types::{ApiErrorResponse, ChatCompletionRequest, ChatCompletionResponse};

/// Bearer-authenticated client with a single retry on transient statuses.
#[derive(Debug, Clone)]
pub struct FireworksClient {
    client: reqwest::Client,
    endpoint: String,
    max_retries: u32,
    retry_delay: Duration,
}

impl FireworksClient {
    /// Builds a client that posts to `{base_url}/chat/completions`.
    ///
    /// `timeout` bounds a whole request including the body read.
    pub fn new(api_key: &str, base_url: &str, timeout: Duration) -> Result<Self, StorebotError> {
        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("Bearer {api_key}"))
            .map_err(|e| StorebotError::Config(format!("invalid API key header value: {e}")))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| StorebotError::Provider {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            endpoint: format!("{}/chat/completions", base_url.trim_end_matches('/')),
            max_retries: 1,
            retry_delay: Duration::from_secs(1),
        })
    }

    #[cfg(test)]
    fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Sends a non-streaming completion request.
    ///
    /// On 429, 500 and 503 the request is retried once after a short pause.
    pub async fn complete(
        &self,
        request: &ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse, StorebotError> {
        let mut req = request.clone();
        req.stream = false;

        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                warn!(attempt, "retrying completion request after transient error");
                tokio::time::sleep(self.retry_delay).await;
            }

            let response = self
                .client
                .post(&self.endpoint)
                .json(&req)
                .send()
                .await
                .map_err(|e| StorebotError::Provider {
                    message: format!("HTTP request failed: {e}"),
                    source: Some(Box::new(e)),
                })?;

            let status = response.status();
            debug!(status = %status, attempt, "completion response received");

            if status.is_success() {
                return response
                    .json::<ChatCompletionResponse>()
                    .await
                    .map_err(|e| StorebotError::Provider {
                        message: format!("failed to parse API response: {e}"),
                        source: Some(Box::new(e)),
                    });
            }

            let body = response.text().await.unwrap_or_default();

            if is_transient_error(status) && attempt < self.max_retries {
                warn!(status = %status, "transient error, will retry");
                last_error = Some(StorebotError::Provider {
                    message: format!("API returned {status}: {body}"),
                    source: None,
                });
                continue;
            }

            return Err(StorebotError::Provider {
                message: describe_failure(status, &body),
                source: None,
            });
        }

        Err(last_error.unwrap_or_else(|| StorebotError::Provider {
            message: "completion request failed after retries".into(),
            source: None,
        }))
    }
}

fn describe_failure(status: reqwest::StatusCode, body: &str) -> String {
    match serde_json::from_str::<ApiErrorResponse>(body) {
        Ok(api_err) => match api_err.error.type_ {
            Some(kind) => format!("Fireworks API error ({kind}): {}", api_err.error.message),
            None => format!("Fireworks API error ({status}): {}", api_err.error.message),
        },
        Err(_) => format!("API returned {status}: {body}"),
    }
}

/// Returns true for HTTP statuses worth one more attempt.
fn is_transient_error(status: reqwest::StatusCode) -> bool {
    matches!(status.as_u16(), 429 | 500 | 503)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ApiMessage;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(base_url: &str) -> FireworksClient {
        FireworksClient::new("fw-test-key", base_url, Duration::from_secs(5))
            .unwrap()
            .with_retry_delay(Duration::from_millis(10))
    }

    fn test_request() -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: "accounts/fireworks/models/qwen3-30b-a3b".into(),
            messages: vec![ApiMessage {
                role: "user".into(),
                content: Some("Hello".into()),
                tool_calls: vec![],
                tool_call_id: None,
            }],
            tools: vec![],
            max_tokens: 256,
            temperature: Some(0.2),
            stream: true,
        }
    }

    fn text_body(id: &str, text: &str) -> serde_json::Value {
        serde_json::json!({
            "id": id,
            "model": "accounts/fireworks/models/qwen3-30b-a3b",
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": text},
                "finish_reason": "stop"
            }],
            "usage": {"prompt_tokens": 12, "completion_tokens": 4}
        })
    }

    #[test]
    fn endpoint_joins_base_url() {
        let client = test_client("https://api.fireworks.ai/inference/v1/");
        assert_eq!(
            client.endpoint(),
            "https://api.fireworks.ai/inference/v1/chat/completions"
        );
    }

    #[tokio::test]
    async fn complete_success_forces_non_streaming() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(body_partial_json(serde_json::json!({"stream": false})))
            .respond_with(ResponseTemplate::new(200).set_body_json(text_body("cmpl-1", "Hi!")))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let result = client.complete(&test_request()).await.unwrap();

        assert_eq!(result.id, "cmpl-1");
        assert_eq!(result.choices[0].message.content.as_deref(), Some("Hi!"));
        assert_eq!(result.usage.unwrap().prompt_tokens, 12);
    }

    #[tokio::test]
    async fn complete_retries_on_429() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(429).set_body_json(serde_json::json!({
                "error": {"type": "rate_limit", "message": "slow down"}
            })))
            .up_to_n_times(1)
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(text_body("cmpl-retry", "ok")))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let result = client.complete(&test_request()).await.unwrap();
        assert_eq!(result.id, "cmpl-retry");
    }

    #[tokio::test]
    async fn complete_fails_on_400_without_retry() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "error": {"type": "invalid_request_error", "message": "Bad model"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let err = client.complete(&test_request()).await.unwrap_err().to_string();
        assert!(err.contains("invalid_request_error"), "got: {err}");
        assert!(err.contains("Bad model"), "got: {err}");
    }

    #[tokio::test]
    async fn complete_exhausts_retries_on_503() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
            .expect(2)
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let err = client.complete(&test_request()).await.unwrap_err().to_string();
        assert!(err.contains("503"), "got: {err}");
        assert!(err.contains("overloaded"), "got: {err}");
    }

    #[tokio::test]
    async fn client_sends_bearer_token() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("authorization", "Bearer fw-test-key"))
            .and(header("content-type", "application/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(text_body("cmpl-h", "ok")))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let result = client.complete(&test_request()).await;
        assert!(result.is_ok(), "headers should match: {result:?}");
    }

    #[tokio::test]
    async fn malformed_success_body_is_provider_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let err = client.complete(&test_request()).await.unwrap_err();
        assert!(matches!(err, StorebotError::Provider { .. }));
    }
}
