//! Anthropic Claude API client implementation
//!
//! Implements the LlmClient trait for Anthropic's Messages API with bounded
//! retry for transient errors.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

use super::{CompletionRequest, LlmClient, LlmError, Message, Role};
use crate::config::LlmConfig;

/// Maximum number of retries for transient errors
const MAX_RETRIES: u32 = 3;

/// Initial backoff delay for retries
const INITIAL_BACKOFF_MS: u64 = 1000;

/// Anthropic Claude API client
pub struct AnthropicClient {
    model: String,
    api_key: String,
    base_url: String,
    http: Client,
    max_tokens: u32,
    timeout: Duration,
}

impl AnthropicClient {
    /// Create a new client from configuration
    ///
    /// Reads the API key from the environment variable specified in config.
    pub fn from_config(config: &LlmConfig) -> Result<Self, LlmError> {
        debug!(model = %config.model, "from_config: called");
        let api_key = config
            .get_api_key()
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;

        let timeout = Duration::from_millis(config.timeout_ms);
        let http = Client::builder().timeout(timeout).build().map_err(LlmError::Network)?;

        Ok(Self {
            model: config.model.clone(),
            api_key,
            base_url: config.base_url.clone(),
            http,
            max_tokens: config.max_tokens,
            timeout,
        })
    }

    /// Build the request body for the Anthropic API
    fn build_request_body(&self, request: &CompletionRequest) -> serde_json::Value {
        debug!(%self.model, %request.max_tokens, "build_request_body: called");
        let messages: Vec<serde_json::Value> = request
            .conversation()
            .iter()
            .map(|Message { role, content }| {
                let role = match role {
                    Role::Assistant => "assistant",
                    // System is split out of the conversation; anything else is user
                    _ => "user",
                };
                serde_json::json!({ "role": role, "content": content })
            })
            .collect();

        let mut body = serde_json::json!({
            "model": self.model,
            "max_tokens": request.max_tokens.min(self.max_tokens),
            "temperature": request.temperature,
            "messages": messages,
        });

        if let Some(system) = request.system_prompt() {
            body["system"] = serde_json::json!(system);
        }

        body
    }

    /// Pull the text reply out of the Anthropic response
    fn parse_response(&self, api_response: AnthropicResponse) -> Result<String, LlmError> {
        let text: String = api_response
            .content
            .into_iter()
            .filter_map(|block| match block {
                AnthropicContentBlock::Text { text } => Some(text),
            })
            .collect::<Vec<_>>()
            .join("");

        if text.is_empty() {
            return Err(LlmError::InvalidResponse("Empty completion content".to_string()));
        }
        Ok(text)
    }
}

#[async_trait]
impl LlmClient for AnthropicClient {
    async fn generate(&self, request: CompletionRequest) -> Result<String, LlmError> {
        debug!(%self.model, %request.max_tokens, "generate: called");
        let url = format!("{}/v1/messages", self.base_url);
        let body = self.build_request_body(&request);

        let mut last_error = None;
        for attempt in 0..=MAX_RETRIES {
            if attempt > 0 {
                let backoff = INITIAL_BACKOFF_MS * 2u64.pow(attempt - 1);
                warn!(attempt, backoff_ms = backoff, "generate: retrying after transient error");
                tokio::time::sleep(Duration::from_millis(backoff)).await;
            }

            let response = match self
                .http
                .post(url.clone())
                .header("x-api-key", self.api_key.clone())
                .header("anthropic-version", "2023-06-01")
                .header("content-type", "application/json")
                .json(&body)
                .send()
                .await
            {
                Ok(r) => r,
                Err(e) => {
                    debug!(attempt, error = %e, "generate: request failed");
                    last_error = Some(if e.is_timeout() {
                        LlmError::Timeout(self.timeout)
                    } else {
                        LlmError::Network(e)
                    });
                    continue;
                }
            };

            let status = response.status().as_u16();

            if !response.status().is_success() {
                let error = if status == 429 {
                    let retry_after = response
                        .headers()
                        .get("retry-after")
                        .and_then(|v| v.to_str().ok())
                        .and_then(|s| s.parse::<u64>().ok())
                        .unwrap_or(60);
                    LlmError::RateLimited {
                        retry_after: Duration::from_secs(retry_after),
                    }
                } else {
                    let text = response.text().await.unwrap_or_default();
                    LlmError::ApiError { status, message: text }
                };

                // Rate limits carry a server-mandated wait; surface them to
                // the caller instead of burning retries here
                if error.is_rate_limit() {
                    debug!("generate: rate limited (429)");
                    return Err(error);
                }

                if error.is_retryable() && attempt < MAX_RETRIES {
                    debug!(attempt, status, "generate: retryable error");
                    last_error = Some(error);
                    continue;
                }

                debug!(%status, "generate: API error");
                return Err(error);
            }

            let api_response: AnthropicResponse = response.json().await?;
            return self.parse_response(api_response);
        }

        Err(last_error.unwrap_or_else(|| LlmError::InvalidResponse("Max retries exceeded".to_string())))
    }
}

// Anthropic API response types

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    content: Vec<AnthropicContentBlock>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum AnthropicContentBlock {
    #[serde(rename = "text")]
    Text { text: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client() -> AnthropicClient {
        AnthropicClient {
            model: "claude-sonnet-4".to_string(),
            api_key: "test-key".to_string(),
            base_url: "https://api.anthropic.com".to_string(),
            http: Client::new(),
            max_tokens: 1024,
            timeout: Duration::from_secs(30),
        }
    }

    #[test]
    fn test_build_request_body_basic() {
        let client = test_client();

        let request = CompletionRequest::structured("You are helpful", "Hello", 256);
        let body = client.build_request_body(&request);

        assert_eq!(body["model"], "claude-sonnet-4");
        assert_eq!(body["max_tokens"], 256);
        assert_eq!(body["system"], "You are helpful");
        assert_eq!(body["messages"][0]["role"], "user");
        assert_eq!(body["messages"][0]["content"], "Hello");
    }

    #[test]
    fn test_build_request_body_no_system() {
        let client = test_client();

        let request = CompletionRequest {
            messages: vec![Message::user("hi"), Message::assistant("hello"), Message::user("bye")],
            temperature: 0.7,
            max_tokens: 100,
        };
        let body = client.build_request_body(&request);

        assert!(body.get("system").is_none());
        assert_eq!(body["messages"].as_array().unwrap().len(), 3);
        assert_eq!(body["messages"][1]["role"], "assistant");
    }

    #[test]
    fn test_max_tokens_capped() {
        let client = test_client();

        let request = CompletionRequest::structured("s", "u", 9999);
        let body = client.build_request_body(&request);

        // Capped to the client's configured max
        assert_eq!(body["max_tokens"], 1024);
    }

    #[test]
    fn test_parse_response_concatenates_text() {
        let client = test_client();
        let response = AnthropicResponse {
            content: vec![
                AnthropicContentBlock::Text { text: "Hello ".into() },
                AnthropicContentBlock::Text { text: "world".into() },
            ],
        };

        assert_eq!(client.parse_response(response).unwrap(), "Hello world");
    }

    #[test]
    fn test_parse_response_empty_is_error() {
        let client = test_client();
        let response = AnthropicResponse { content: vec![] };
        assert!(client.parse_response(response).is_err());
    }
}
