use async_trait::async_trait;
use config::CompletionConfig;
use errors::{CompletionError, DIAGNOSTIC_PREFIX_CHARS, bounded_prefix};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use sparks_core::traits::CompletionService;
use std::time::Duration;

pub const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Client for the Anthropic Messages API.
pub struct AnthropicCompletionService {
    client: Client,
    endpoint: String,
    api_key: String,
    model: String,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: [Message<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    message: String,
}

impl AnthropicCompletionService {
    pub fn new(
        api_key: impl Into<String>,
        base_url: &str,
        model: impl Into<String>,
        max_tokens: u32,
        timeout: Duration,
    ) -> Result<Self, CompletionError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CompletionError::Upstream {
                status: None,
                reason: format!("Failed to build HTTP client: {e}"),
            })?;

        Ok(Self {
            client,
            endpoint: format!("{}/v1/messages", base_url.trim_end_matches('/')),
            api_key: api_key.into(),
            model: model.into(),
            max_tokens,
        })
    }

    /// Builds the client from configuration. Fails when no API key is set.
    pub fn from_config(config: &CompletionConfig) -> Result<Self, CompletionError> {
        let api_key = config
            .api_key
            .as_deref()
            .ok_or_else(|| CompletionError::Upstream {
                status: None,
                reason: "Completion API key is not configured".to_string(),
            })?;

        Self::new(
            api_key,
            &config.base_url,
            config.model.clone(),
            config.max_tokens,
            Duration::from_secs(config.timeout_seconds),
        )
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

fn retry_after(response: &reqwest::Response) -> Option<u64> {
    response
        .headers()
        .get("retry-after")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().parse::<u64>().ok())
}

fn classify_failure(status: StatusCode, retry_after: Option<u64>, body: &str) -> CompletionError {
    let envelope = serde_json::from_str::<ErrorEnvelope>(body).ok();

    let rate_limited = status == StatusCode::TOO_MANY_REQUESTS
        || envelope
            .as_ref()
            .is_some_and(|e| e.error.kind == "rate_limit_error");

    let message = envelope
        .map(|e| e.error.message)
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| bounded_prefix(body, DIAGNOSTIC_PREFIX_CHARS));

    if rate_limited {
        CompletionError::RateLimited {
            retry_after,
            message,
        }
    } else {
        CompletionError::Upstream {
            status: Some(status.as_u16()),
            reason: message,
        }
    }
}

#[async_trait]
impl CompletionService for AnthropicCompletionService {
    async fn complete(&self, system: &str, user: &str) -> Result<String, CompletionError> {
        let request = MessagesRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            system,
            messages: [Message {
                role: "user",
                content: user,
            }],
        };

        let response = self
            .client
            .post(&self.endpoint)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                let reason = if e.is_timeout() {
                    "Completion request timed out".to_string()
                } else {
                    format!("Completion request failed: {e}")
                };
                CompletionError::Upstream {
                    status: None,
                    reason,
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = retry_after(&response);
            let body = response.text().await.unwrap_or_default();
            let error = classify_failure(status, retry_after, &body);
            tracing::warn!(status = status.as_u16(), error = %error, "Completion request rejected");
            return Err(error);
        }

        let body: MessagesResponse =
            response
                .json()
                .await
                .map_err(|e| CompletionError::Upstream {
                    status: Some(status.as_u16()),
                    reason: format!("Unreadable completion response: {e}"),
                })?;

        let text: String = body
            .content
            .into_iter()
            .filter(|block| block.kind == "text")
            .filter_map(|block| block.text)
            .collect();

        tracing::debug!(model = %self.model, chars = text.len(), "Completion received");
        Ok(text)
    }
}
