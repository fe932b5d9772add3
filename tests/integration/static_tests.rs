//! Static uploads integration tests.
//!
//! Tests verify:
//! - Files in the uploads directory are served under `/uploads`
//! - Missing files fall through to the 404 envelope
//! - Non-GET methods never reach the filesystem

use std::fs;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use tower::ServiceExt;

use super::test_utils::{app, body_bytes, body_json, get, test_config};

fn uploads_app() -> (tempfile::TempDir, axum::Router) {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir(dir.path().join("avatars")).unwrap();
    fs::write(dir.path().join("avatars").join("team.txt"), b"alfa techx team").unwrap();
    fs::write(dir.path().join("brochure.json"), br#"{"pages":4}"#).unwrap();

    let mut config = test_config();
    config.uploads_dir = dir.path().to_path_buf();

    let router = app(&config);
    (dir, router)
}

#[tokio::test]
async fn test_serves_uploaded_file() {
    let (_dir, router) = uploads_app();

    let response = router
        .oneshot(get("/uploads/avatars/team.txt"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response
        .headers()
        .get("content-type")
        .unwrap()
        .to_str()
        .unwrap()
        .starts_with("text/plain"));
    assert_eq!(body_bytes(response).await, b"alfa techx team");
}

#[tokio::test]
async fn test_uploaded_file_has_security_headers() {
    let (_dir, router) = uploads_app();

    let response = router.oneshot(get("/uploads/brochure.json")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("x-content-type-options").unwrap(),
        "nosniff"
    );
}

#[tokio::test]
async fn test_missing_upload_is_not_found() {
    let (_dir, router) = uploads_app();

    let response = router.oneshot(get("/uploads/missing.png")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        body_json(response).await,
        serde_json::json!({"success": false, "message": "Route not found"})
    );
}

#[tokio::test]
async fn test_post_to_uploads_is_not_found() {
    let (_dir, router) = uploads_app();

    let request = Request::builder()
        .method("POST")
        .uri("/uploads/brochure.json")
        .body(Body::empty())
        .unwrap();
    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["message"], "Route not found");
}

#[tokio::test]
async fn test_path_traversal_is_refused() {
    let (_dir, router) = uploads_app();

    let response = router
        .oneshot(get("/uploads/../Cargo.toml"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_missing_uploads_directory_is_not_fatal() {
    let mut config = test_config();
    config.uploads_dir = "/definitely/not/a/real/uploads/dir".into();

    let response = app(&config)
        .oneshot(get("/uploads/anything.png"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
