//! Integration tests for the HTTP transport.
//!
//! These tests run the transport against a local mock server and verify
//! retry behaviour, ambiguous outcomes for non-idempotent requests and the
//! headers attached to every request.

use std::time::Duration;

use albert::clients::{HttpClient, HttpError, HttpMethod, HttpRequest};
use albert::{AccessToken, AlbertConfig, BaseUrl, RetryPolicy};
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a transport with fast retries pointed at the mock server
fn create_client(server: &MockServer) -> HttpClient {
    let config = AlbertConfig::builder()
        .base_url(BaseUrl::new(server.uri()).unwrap())
        .token(AccessToken::new("test-token").unwrap())
        .retry_policy(
            RetryPolicy::new(3, Duration::from_millis(1), Duration::from_millis(5))
                .with_jitter_factor(0.0),
        )
        .timeout(Duration::from_millis(500))
        .build()
        .unwrap();
    HttpClient::new(&config).unwrap()
}

fn get(path: &str) -> HttpRequest {
    HttpRequest::builder(HttpMethod::Get, path).build().unwrap()
}

async fn request_count(server: &MockServer) -> usize {
    server.received_requests().await.map_or(0, |r| r.len())
}

// === Retry Tests ===

/// Test 1: GET failing twice with 503 then succeeding returns the success
#[tokio::test]
async fn test_get_recovers_after_two_503s() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v3/tags/TAG1"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v3/tags/TAG1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"albertId": "TAG1", "name": "x"})),
        )
        .mount(&server)
        .await;

    let client = create_client(&server);
    let response = client.request(get("/api/v3/tags/TAG1")).await.unwrap();

    assert_eq!(response.code, 200);
    assert_eq!(response.body["albertId"], "TAG1");
    assert_eq!(request_count(&server).await, 3);
}

/// Test 2: Exhausted retries surface the last status and attempt count
#[tokio::test]
async fn test_get_gives_up_after_max_attempts() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503).set_body_json(json!({"title": "Unavailable"})))
        .mount(&server)
        .await;

    let client = create_client(&server);
    let error = client.request(get("/api/v3/tags")).await.unwrap_err();

    match error {
        HttpError::MaxRetries(e) => {
            assert_eq!(e.code, 503);
            assert_eq!(e.tries, 3);
            assert_eq!(e.message, "Unavailable");
        }
        other => panic!("expected MaxRetries, got {other:?}"),
    }
    assert_eq!(request_count(&server).await, 3);
}

/// Test 3: Retry-After on 429 is honoured and the retry succeeds
#[tokio::test]
async fn test_429_with_retry_after_is_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "0"))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"Items": []})))
        .mount(&server)
        .await;

    let client = create_client(&server);
    let response = client.request(get("/api/v3/units")).await.unwrap();

    assert_eq!(response.code, 200);
    assert_eq!(request_count(&server).await, 2);
}

/// Test 4: Client errors are not retried
#[tokio::test]
async fn test_400_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({"message": "bad limit"})))
        .mount(&server)
        .await;

    let client = create_client(&server);
    let error = client.request(get("/api/v3/tags")).await.unwrap_err();

    assert!(matches!(error, HttpError::Response(ref e) if e.code == 400 && e.message == "bad limit"));
    assert_eq!(request_count(&server).await, 1);
}

/// Test 5: A 503 on POST is surfaced without retrying
#[tokio::test]
async fn test_post_is_not_retried_on_503() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let client = create_client(&server);
    let request = HttpRequest::builder(HttpMethod::Post, "/api/v3/tags")
        .body(json!({"name": "new"}))
        .build()
        .unwrap();
    let error = client.request(request).await.unwrap_err();

    assert_eq!(error.status(), Some(503));
    assert_eq!(request_count(&server).await, 1);
}

// === Ambiguous Outcome Tests ===

/// Test 6: A POST timing out after it was sent is reported as ambiguous
#[tokio::test]
async fn test_post_timeout_is_ambiguous() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"albertId": "TAG9"}))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let client = create_client(&server);
    let request = HttpRequest::builder(HttpMethod::Post, "/api/v3/tags")
        .body(json!({"name": "slow"}))
        .build()
        .unwrap();
    let error = client.request(request).await.unwrap_err();

    match error {
        HttpError::AmbiguousOutcome { method, url, .. } => {
            assert_eq!(method, "POST");
            assert!(url.ends_with("/api/v3/tags"));
        }
        other => panic!("expected AmbiguousOutcome, got {other:?}"),
    }
    assert_eq!(request_count(&server).await, 1);
}

/// Test 7: A GET timing out is retried like any other transient failure
#[tokio::test]
async fn test_get_timeout_is_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let client = create_client(&server);
    let response = client.request(get("/api/v3/tags")).await.unwrap();

    assert_eq!(response.body, json!([]));
    assert_eq!(request_count(&server).await, 2);
}

// === Header Tests ===

/// Test 8: Every request carries the bearer token and standard headers
#[tokio::test]
async fn test_standard_headers_are_sent() {
    let server = MockServer::start().await;
    let client = create_client(&server);
    assert!(client.user_agent().contains("albert-SDK V."));

    Mock::given(method("PATCH"))
        .and(header("authorization", "Bearer test-token"))
        .and(header("accept", "application/json"))
        .and(header("content-type", "application/json"))
        .and(header("user-agent", client.user_agent()))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let request = HttpRequest::builder(HttpMethod::Patch, "/api/v3/tags/TAG1")
        .body(json!({"data": []}))
        .build()
        .unwrap();
    let response = client.request(request).await.unwrap();

    assert_eq!(response.code, 204);
    assert_eq!(response.body, serde_json::Value::Null);
}

/// Test 9: Query parameters are encoded onto the URL
#[tokio::test]
async fn test_query_parameters_are_sent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let client = create_client(&server);
    let request = HttpRequest::builder(HttpMethod::Get, "/api/v3/tags")
        .query_param("name", "a&b")
        .query_param("limit", "5")
        .build()
        .unwrap();
    client.request(request).await.unwrap();

    let received = server.received_requests().await.unwrap();
    let pairs: Vec<(String, String)> = received[0]
        .url
        .query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    assert_eq!(
        pairs,
        vec![
            ("name".to_string(), "a&b".to_string()),
            ("limit".to_string(), "5".to_string())
        ]
    );
}
