//! Body parsing integration tests.
//!
//! Tests verify:
//! - JSON and URL-encoded bodies reach handlers
//! - Bodies over 10MB are rejected before any handler runs
//! - Unsupported content types are rejected

use axum::body::Body;
use axum::http::{Request, StatusCode};
use tower::ServiceExt;

use super::test_utils::{app_with_hits, body_json, test_config, HandlerHits};

const TEN_MB: usize = 10 * 1024 * 1024;

fn echo_request(content_type: &str, body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/public/echo")
        .header("content-type", content_type)
        .body(body.into())
        .unwrap()
}

/// A JSON document of exactly `size` bytes.
fn json_of_size(size: usize) -> String {
    let overhead = r#"{"data":""}"#.len();
    format!(r#"{{"data":"{}"}}"#, "a".repeat(size - overhead))
}

#[tokio::test]
async fn test_json_body_reaches_handler() {
    let hits = HandlerHits::default();
    let response = app_with_hits(&test_config(), hits.clone())
        .oneshot(echo_request(
            "application/json",
            r#"{"name":"Alfa","tags":["a","b"]}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        serde_json::json!({"name": "Alfa", "tags": ["a", "b"]})
    );
    assert_eq!(hits.count(), 1);
}

#[tokio::test]
async fn test_urlencoded_body_reaches_handler() {
    let hits = HandlerHits::default();
    let response = app_with_hits(&test_config(), hits.clone())
        .oneshot(echo_request(
            "application/x-www-form-urlencoded",
            "name=Alfa+TechX&city=Lagos",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        serde_json::json!({"name": "Alfa TechX", "city": "Lagos"})
    );
    assert_eq!(hits.count(), 1);
}

#[tokio::test]
async fn test_body_at_limit_accepted() {
    let hits = HandlerHits::default();
    let body = json_of_size(TEN_MB);
    let request = Request::builder()
        .method("POST")
        .uri("/api/public/echo")
        .header("content-type", "application/json")
        .header("content-length", body.len())
        .body(Body::from(body))
        .unwrap();

    let response = app_with_hits(&test_config(), hits.clone())
        .oneshot(request)
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(hits.count(), 1);
}

#[tokio::test]
async fn test_oversized_declared_body_rejected_before_handler() {
    let hits = HandlerHits::default();
    let body = json_of_size(TEN_MB + 1);
    let request = Request::builder()
        .method("POST")
        .uri("/api/public/echo")
        .header("content-type", "application/json")
        .header("content-length", body.len())
        .body(Body::from(body))
        .unwrap();

    let response = app_with_hits(&test_config(), hits.clone())
        .oneshot(request)
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(
        body_json(response).await,
        serde_json::json!({"success": false, "message": "Request entity too large"})
    );
    assert_eq!(hits.count(), 0);
}

#[tokio::test]
async fn test_oversized_streamed_body_rejected_before_handler() {
    let hits = HandlerHits::default();
    let response = app_with_hits(&test_config(), hits.clone())
        .oneshot(echo_request("application/json", json_of_size(TEN_MB + 1)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(hits.count(), 0);
}

#[tokio::test]
async fn test_oversized_unmatched_route_rejected() {
    let request = Request::builder()
        .method("POST")
        .uri("/api/unknown")
        .header("content-type", "application/json")
        .header("content-length", TEN_MB + 1)
        .body(Body::empty())
        .unwrap();

    let response = app_with_hits(&test_config(), HandlerHits::default())
        .oneshot(request)
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn test_unsupported_content_type() {
    let hits = HandlerHits::default();
    let response = app_with_hits(&test_config(), hits.clone())
        .oneshot(echo_request("text/plain", "hello"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert_eq!(body_json(response).await["success"], false);
    assert_eq!(hits.count(), 0);
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let response = app_with_hits(&test_config(), HandlerHits::default())
        .oneshot(echo_request("application/json", r#"{"name": "#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["success"], false);
}

#[tokio::test]
async fn test_custom_body_limit() {
    let mut config = test_config();
    config.body_limit = 16;

    let response = app_with_hits(&config, HandlerHits::default())
        .oneshot(echo_request("application/json", json_of_size(64)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}
