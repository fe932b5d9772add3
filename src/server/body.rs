//! Request body limits and parsing.
//!
//! The body stage rejects any request whose declared `Content-Length`
//! exceeds the limit before it reaches a route. Bodies without a length
//! (chunked uploads) are capped by axum's `DefaultBodyLimit` when an
//! extractor reads them.
//!
//! Route handlers read bodies through [`Payload`], which accepts both JSON
//! and URL-encoded forms.

use axum::{
    extract::{FromRequest, Request, State},
    http::{header::CONTENT_LENGTH, header::CONTENT_TYPE, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Form, Json,
};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::ApiError;

const JSON_MIME: &str = "application/json";
const FORM_MIME: &str = "application/x-www-form-urlencoded";

/// Reject requests that declare a body larger than `limit` bytes.
pub async fn body_limit_middleware(
    State(limit): State<usize>,
    request: Request,
    next: Next,
) -> Response {
    if let Some(length) = declared_length(request.headers()) {
        if length > limit as u64 {
            debug!(length, limit, "Rejected oversized body");
            return ApiError::PayloadTooLarge.into_response();
        }
    }

    next.run(request).await
}

fn declared_length(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok())
}

// =============================================================================
// Payload Extractor
// =============================================================================

/// A request body parsed from JSON or `application/x-www-form-urlencoded`.
///
/// ```ignore
/// async fn login(Payload(credentials): Payload<Credentials>) -> Response { .. }
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct Payload<T>(pub T);

impl<T, S> FromRequest<S> for Payload<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let mime = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(';').next())
            .map(|v| v.trim().to_ascii_lowercase())
            .unwrap_or_default();

        if mime == JSON_MIME || mime.ends_with("+json") {
            let Json(value) = Json::<T>::from_request(req, state)
                .await
                .map_err(|rejection| rejected(rejection.status(), rejection.body_text()))?;
            Ok(Payload(value))
        } else if mime == FORM_MIME {
            let Form(value) = Form::<T>::from_request(req, state)
                .await
                .map_err(|rejection| rejected(rejection.status(), rejection.body_text()))?;
            Ok(Payload(value))
        } else if mime.is_empty() {
            Err(ApiError::UnsupportedMediaType("missing Content-Type".to_string()))
        } else {
            Err(ApiError::UnsupportedMediaType(mime))
        }
    }
}

fn rejected(status: StatusCode, message: String) -> ApiError {
    if status == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge
    } else {
        ApiError::BadRequest(message)
    }
}
