//! Wire-level tests for the Anthropic client against a mock server.

use errors::CompletionError;
use llm::AnthropicCompletionService;
use serde_json::json;
use sparks_core::traits::CompletionService;
use std::time::Duration;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn service(server: &MockServer) -> AnthropicCompletionService {
    AnthropicCompletionService::new(
        "test-key",
        &server.uri(),
        "claude-test",
        512,
        Duration::from_secs(5),
    )
    .unwrap()
}

#[tokio::test]
async fn test_complete_sends_messages_request_and_joins_text() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .and(header("x-api-key", "test-key"))
        .and(header("anthropic-version", "2023-06-01"))
        .and(body_partial_json(json!({
            "model": "claude-test",
            "max_tokens": 512,
            "system": "be terse",
            "messages": [{"role": "user", "content": "hello"}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "msg_1",
            "type": "message",
            "role": "assistant",
            "content": [
                {"type": "text", "text": "{\"title\":"},
                {"type": "text", "text": "\"x\"}"}
            ],
            "stop_reason": "end_turn"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let text = service(&server).complete("be terse", "hello").await.unwrap();
    assert_eq!(text, "{\"title\":\"x\"}");
}

#[tokio::test]
async fn test_429_is_rate_limited_with_retry_after() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(
            ResponseTemplate::new(429)
                .insert_header("retry-after", "12")
                .set_body_json(json!({
                    "type": "error",
                    "error": {"type": "rate_limit_error", "message": "Number of requests exceeded"}
                })),
        )
        .mount(&server)
        .await;

    let err = service(&server).complete("s", "u").await.unwrap_err();
    assert_eq!(
        err,
        CompletionError::RateLimited {
            retry_after: Some(12),
            message: "Number of requests exceeded".to_string(),
        },
    );
}

#[tokio::test]
async fn test_server_error_is_upstream() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "type": "error",
            "error": {"type": "api_error", "message": "Internal server error"}
        })))
        .mount(&server)
        .await;

    let err = service(&server).complete("s", "u").await.unwrap_err();
    assert!(!err.is_rate_limited());
    assert!(matches!(
        err,
        CompletionError::Upstream { status: Some(500), ref reason } if reason == "Internal server error"
    ));
}

#[tokio::test]
async fn test_timeout_is_upstream() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_secs(3))
                .set_body_json(json!({"content": []})),
        )
        .mount(&server)
        .await;

    let client = AnthropicCompletionService::new(
        "test-key",
        &server.uri(),
        "claude-test",
        512,
        Duration::from_millis(200),
    )
    .unwrap();

    let err = client.complete("s", "u").await.unwrap_err();
    assert!(matches!(err, CompletionError::Upstream { status: None, .. }));
}

#[tokio::test]
async fn test_connection_refused_is_upstream() {
    let client = AnthropicCompletionService::new(
        "test-key",
        "http://127.0.0.1:1",
        "claude-test",
        512,
        Duration::from_secs(2),
    )
    .unwrap();

    let err = client.complete("s", "u").await.unwrap_err();
    assert!(matches!(err, CompletionError::Upstream { status: None, .. }));
}
