//! CORS integration tests.
//!
//! Tests verify:
//! - The configured frontend origin is allowed with credentials
//! - Other origins get no allow-origin header
//! - Preflight requests are answered by the pipeline

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use tower::ServiceExt;

use super::test_utils::{app, test_config, TEST_ORIGIN};

fn from_origin(method: Method, uri: &str, origin: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("origin", origin)
        .body(Body::empty())
        .unwrap()
}

fn preflight(origin: &str) -> Request<Body> {
    Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/public/echo")
        .header("origin", origin)
        .header("access-control-request-method", "POST")
        .header("access-control-request-headers", "content-type,authorization")
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn test_configured_origin_allowed_with_credentials() {
    let response = app(&test_config())
        .oneshot(from_origin(Method::GET, "/api/health", TEST_ORIGIN))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let headers = response.headers();
    assert_eq!(
        headers.get("access-control-allow-origin").unwrap(),
        TEST_ORIGIN
    );
    assert_eq!(
        headers.get("access-control-allow-credentials").unwrap(),
        "true"
    );
}

#[tokio::test]
async fn test_other_origin_rejected() {
    let response = app(&test_config())
        .oneshot(from_origin(
            Method::GET,
            "/api/health",
            "https://evil.example.com",
        ))
        .await
        .unwrap();

    assert!(response.headers().get("access-control-allow-origin").is_none());
}

#[tokio::test]
async fn test_default_origin_is_localhost_3000() {
    let mut config = test_config();
    config.frontend_url = alfa_techx_api::config::DEFAULT_FRONTEND_URL.to_string();

    let response = app(&config)
        .oneshot(from_origin(
            Method::GET,
            "/api/health",
            "http://localhost:3000",
        ))
        .await
        .unwrap();
    assert_eq!(
        response.headers().get("access-control-allow-origin").unwrap(),
        "http://localhost:3000"
    );
}

#[tokio::test]
async fn test_preflight_from_configured_origin() {
    let response = app(&test_config())
        .oneshot(preflight(TEST_ORIGIN))
        .await
        .unwrap();

    assert!(response.status().is_success());
    let headers = response.headers();
    assert_eq!(
        headers.get("access-control-allow-origin").unwrap(),
        TEST_ORIGIN
    );
    assert_eq!(
        headers.get("access-control-allow-credentials").unwrap(),
        "true"
    );

    let methods = headers
        .get("access-control-allow-methods")
        .unwrap()
        .to_str()
        .unwrap();
    assert!(methods.contains("POST"));
    assert!(methods.contains("DELETE"));

    let allowed_headers = headers
        .get("access-control-allow-headers")
        .unwrap()
        .to_str()
        .unwrap();
    assert!(allowed_headers.contains("authorization"));
}

#[tokio::test]
async fn test_preflight_from_other_origin() {
    let response = app(&test_config())
        .oneshot(preflight("https://evil.example.com"))
        .await
        .unwrap();

    assert!(response.headers().get("access-control-allow-origin").is_none());
}
