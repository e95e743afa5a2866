//! Model client tests against a mock Gemini endpoint.

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use campaign_analyst::client::GeminiClient;
use campaign_analyst::config::Config;
use campaign_analyst::error::{AnalysisError, ClientError};
use campaign_analyst::parser::extract_citations;

const GENERATE_PATH: &str = "/models/test-model:generateContent";

fn text_response(text: &str) -> serde_json::Value {
    json!({
        "candidates": [{
            "content": {"role": "model", "parts": [{"text": text}]},
            "finishReason": "STOP"
        }]
    })
}

fn error_response(code: u16, message: &str, status: &str) -> ResponseTemplate {
    ResponseTemplate::new(code).set_body_json(json!({
        "error": {"code": code, "message": message, "status": status}
    }))
}

fn client_for(server: &MockServer) -> GeminiClient {
    GeminiClient::new(&Config::for_testing(&server.uri())).unwrap()
}

#[tokio::test]
async fn test_generate_returns_text_and_sends_key() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .and(header("x-goog-api-key", "test-key"))
        .and(body_partial_json(json!({"contents": [{"role": "user", "parts": [{"text": "hello"}]}]})))
        .respond_with(ResponseTemplate::new(200).set_body_json(text_response("## Summary\n- fine")))
        .expect(1)
        .mount(&server)
        .await;

    let text = client_for(&server).generate("hello", false).await.unwrap();
    assert_eq!(text, "## Summary\n- fine");
}

#[tokio::test]
async fn test_grounded_request_appends_sources() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .and(body_partial_json(json!({"tools": [{"googleSearch": {}}]})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{
                "content": {"parts": [{"text": "## Market\nCompetitors cut prices."}]},
                "groundingMetadata": {"groundingChunks": [
                    {"web": {"uri": "https://news.example/a", "title": "Price war"}},
                    {"web": {"uri": "https://news.example/b", "title": ""}}
                ]}
            }]
        })))
        .mount(&server)
        .await;

    let text = client_for(&server).generate("prompt", true).await.unwrap();
    assert!(text.starts_with("## Market\nCompetitors cut prices.\n\n[SOURCES:"));

    let extraction = extract_citations(&text);
    assert_eq!(extraction.text, "## Market\nCompetitors cut prices.");
    assert_eq!(extraction.citations.len(), 2);
    assert_eq!(extraction.citations[0].title, "Price war");
    assert_eq!(extraction.citations[1].label(), "https://news.example/b");
}

#[tokio::test]
async fn test_invalid_key_is_translated() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(error_response(
            400,
            "API key not valid. Please pass a valid API key. [reason: API_KEY_NOT_VALID]",
            "INVALID_ARGUMENT",
        ))
        .mount(&server)
        .await;

    let err = client_for(&server).generate("p", false).await.unwrap_err();
    assert!(matches!(err, ClientError::InvalidApiKey { .. }), "got {err:?}");
    assert!(AnalysisError::from(err).to_user_message().starts_with("Invalid API Key"));
}

#[tokio::test]
async fn test_rate_limit_is_translated() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(
            error_response(429, "Resource has been exhausted (e.g. check quota).", "RESOURCE_EXHAUSTED")
                .insert_header("Retry-After", "7"),
        )
        .mount(&server)
        .await;

    let err = client_for(&server).generate("p", false).await.unwrap_err();
    assert_eq!(err.retry_after(), Some(Duration::from_secs(7)));
    assert!(AnalysisError::from(err).to_user_message().starts_with("API quota exceeded"));
}

#[tokio::test]
async fn test_server_error_is_wrapped() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(error_response(500, "Internal error encountered.", "INTERNAL"))
        .mount(&server)
        .await;

    let err = client_for(&server).generate("p", false).await.unwrap_err();
    assert!(err.is_retryable());
    let message = AnalysisError::from(err).to_user_message();
    assert!(message.starts_with("Failed to get analysis from AI:"), "{message}");
    assert!(message.contains("Internal error encountered."));
}

#[tokio::test]
async fn test_no_candidates_is_empty_response() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"promptFeedback": {"blockReason": "SAFETY"}})),
        )
        .mount(&server)
        .await;

    let err = client_for(&server).generate("p", false).await.unwrap_err();
    match err {
        ClientError::EmptyResponse { reason } => assert_eq!(reason.as_deref(), Some("SAFETY")),
        other => panic!("expected EmptyResponse, got {other:?}"),
    }
}

#[tokio::test]
async fn test_empty_text_is_ok() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(text_response("")))
        .mount(&server)
        .await;

    assert_eq!(client_for(&server).generate("p", false).await.unwrap(), "");
}

#[tokio::test]
async fn test_identical_prompts_are_cached() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(text_response("## Cached")))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = Config::for_testing(&server.uri());
    config.cache_ttl = Duration::from_secs(60);
    config.cache_max_size = 10;
    let client = GeminiClient::new(&config).unwrap();

    assert_eq!(client.generate("same", false).await.unwrap(), "## Cached");
    assert_eq!(client.generate("same", false).await.unwrap(), "## Cached");
}

#[test]
fn test_missing_key_fails_closed() {
    let mut config = Config::for_testing("http://127.0.0.1:9");
    config.api_key = None;
    assert!(matches!(GeminiClient::new(&config), Err(ClientError::MissingApiKey)));
}
