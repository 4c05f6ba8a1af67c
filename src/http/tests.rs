//! Tests for the HTTP client

use super::*;
use crate::auth::AuthConfig;
use crate::error::Error;
use crate::types::BackoffType;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::time::Duration;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(base_url: &str) -> HttpClient {
    let config = HttpClientConfig::builder()
        .base_url(base_url)
        .max_retries(2)
        .backoff(
            BackoffType::Constant,
            Duration::from_millis(1),
            Duration::from_millis(1),
        )
        .no_rate_limit()
        .build();
    HttpClient::with_config(config)
}

// ============================================================================
// URL building and basic requests
// ============================================================================

#[tokio::test]
async fn test_get_json_joins_base_url() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/companies"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
        .mount(&server)
        .await;

    let client = test_client(&format!("{}/v2", server.uri()));
    let body: Value = client.get_json("companies").await.unwrap();
    assert_eq!(body, json!({"data": []}));
}

#[tokio::test]
async fn test_absolute_url_bypasses_base() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/companies"))
        .and(query_param("cursor", "x"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": [1]})))
        .mount(&server)
        .await;

    // Next-page URLs come back absolute and keep their own query string.
    let client = test_client("https://unused.invalid");
    let url = format!("{}/v2/companies?cursor=x", server.uri());
    let body: Value = client.get_json(&url).await.unwrap();
    assert_eq!(body, json!({"data": [1]}));
}

#[tokio::test]
async fn test_repeated_query_params() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/persons"))
        .and(query_param("ids", "1"))
        .and(query_param("ids", "2"))
        .and(query_param("fieldTypes", "enriched"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let config = RequestConfig::new()
        .query_each("ids", [1, 2])
        .query_each("fieldTypes", ["enriched"]);
    let response = client.get_with_config("persons", config).await.unwrap();
    assert_eq!(response.status().as_u16(), 200);
}

// ============================================================================
// Authentication
// ============================================================================

#[tokio::test]
async fn test_bearer_auth_header() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/companies"))
        .and(header("authorization", "Bearer secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
        .mount(&server)
        .await;

    let config = HttpClientConfig::builder()
        .base_url(server.uri())
        .no_rate_limit()
        .build();
    let client = HttpClient::with_auth(config, AuthConfig::bearer("secret"));
    assert!(client.get("companies").await.is_ok());
}

#[tokio::test]
async fn test_basic_auth_with_empty_username() {
    let server = MockServer::start().await;
    // base64(":secret")
    Mock::given(method("GET"))
        .and(path("/notes"))
        .and(header("authorization", "Basic OnNlY3JldA=="))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"notes": []})))
        .mount(&server)
        .await;

    let config = HttpClientConfig::builder()
        .base_url(server.uri())
        .no_rate_limit()
        .build();
    let client = HttpClient::with_auth(config, AuthConfig::basic_api_key("secret"));
    assert!(client.get("notes").await.is_ok());
}

// ============================================================================
// Retries
// ============================================================================

#[tokio::test]
async fn test_retries_on_server_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/companies"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/companies"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    assert!(client.get("companies").await.is_ok());
}

#[tokio::test]
async fn test_retries_on_429_with_retry_after() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/companies"))
        .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "0"))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/companies"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    assert!(client.get("companies").await.is_ok());
}

#[tokio::test]
async fn test_persistent_failure_surfaces_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/companies"))
        .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client.get("companies").await.unwrap_err();
    assert!(matches!(err, Error::HttpStatus { status: 503, .. }));
}

// ============================================================================
// Error envelope decoding
// ============================================================================

#[tokio::test]
async fn test_error_envelope_messages_are_joined() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/lists"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "errors": [
                {"message": "insufficient scope", "code": "forbidden"},
                {"message": "missing list permission"}
            ]
        })))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client.get("lists").await.unwrap_err();
    match err {
        Error::Api { status, message } => {
            assert_eq!(status, 403);
            assert_eq!(message, "insufficient scope\nmissing list permission");
        }
        other => panic!("Expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_non_envelope_body_falls_back_to_raw() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/lists"))
        .respond_with(ResponseTemplate::new(404).set_body_string("<html>not found</html>"))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client.get("lists").await.unwrap_err();
    match err {
        Error::HttpStatus { status, body } => {
            assert_eq!(status, 404);
            assert!(body.contains("not found"));
        }
        other => panic!("Expected HttpStatus error, got {other:?}"),
    }
}

// ============================================================================
// Backoff
// ============================================================================

#[test]
fn test_backoff_calculation() {
    let config = HttpClientConfig::builder()
        .backoff(
            BackoffType::Exponential,
            Duration::from_millis(100),
            Duration::from_secs(1),
        )
        .no_rate_limit()
        .build();
    let client = HttpClient::with_config(config);

    assert_eq!(client.calculate_backoff(0), Duration::from_millis(100));
    assert_eq!(client.calculate_backoff(1), Duration::from_millis(200));
    assert_eq!(client.calculate_backoff(2), Duration::from_millis(400));
    // Capped at the configured maximum.
    assert_eq!(client.calculate_backoff(10), Duration::from_secs(1));
}
