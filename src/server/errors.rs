//! Error responses: the client rejection envelope, the 404 fallback and the
//! terminal error handler.
//!
//! Handlers cannot see the runtime mode, so an [`ApiError::Internal`] only
//! marks its response with an [`UnhandledError`] extension. The terminal
//! [`error_handler_middleware`] sits above every route, logs the detail and
//! writes the final 500 body for the current mode. Panics are caught below
//! it and converted the same way by [`panic_response`].

use std::any::Any;

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use tracing::{error, warn};

use super::handlers::{ErrorResponse, MessageResponse};
use crate::config::RuntimeMode;
use crate::error::ApiError;

/// Message of every 500 response.
pub const INTERNAL_ERROR_MESSAGE: &str = "Something went wrong!";

/// `error` field of a 500 response outside development.
pub const GENERIC_ERROR_DETAIL: &str = "Internal server error";

/// Message of the 404 fallback.
pub const NOT_FOUND_MESSAGE: &str = "Route not found";

/// Response extension carrying the detail of an unhandled error.
#[derive(Debug, Clone)]
pub struct UnhandledError(pub String);

// =============================================================================
// Error Mapping
// =============================================================================

impl ApiError {
    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        match self {
            ApiError::Internal(detail) => {
                // Generic body until the terminal handler rewrites it.
                let body = ErrorResponse {
                    success: false,
                    message: INTERNAL_ERROR_MESSAGE.to_string(),
                    error: GENERIC_ERROR_DETAIL.to_string(),
                };
                let mut response = (status, Json(body)).into_response();
                response.extensions_mut().insert(UnhandledError(detail));
                response
            }
            ApiError::PayloadTooLarge => {
                (status, Json(MessageResponse::failure(self.to_string()))).into_response()
            }
            client_error => {
                warn!(
                    status = status.as_u16(),
                    "Client error: {}",
                    client_error
                );
                (status, Json(MessageResponse::failure(client_error.to_string()))).into_response()
            }
        }
    }
}

// =============================================================================
// Fallback
// =============================================================================

/// Respond 404 to anything no route or static file matched.
pub async fn not_found_handler() -> (StatusCode, Json<MessageResponse>) {
    (
        StatusCode::NOT_FOUND,
        Json(MessageResponse::failure(NOT_FOUND_MESSAGE)),
    )
}

// =============================================================================
// Terminal Error Handler
// =============================================================================

/// Finalise responses produced by unhandled errors.
///
/// The request carries on untouched; only responses marked with
/// [`UnhandledError`] are replaced, with a body whose `error` field depends
/// on the runtime mode.
pub async fn error_handler_middleware(
    State(mode): State<RuntimeMode>,
    request: Request,
    next: Next,
) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();

    let response = next.run(request).await;

    let Some(UnhandledError(detail)) = response.extensions().get::<UnhandledError>().cloned()
    else {
        return response;
    };

    error!(%method, %uri, "Unhandled error: {}", detail);

    let error = if mode.is_development() {
        detail
    } else {
        GENERIC_ERROR_DETAIL.to_string()
    };

    let body = ErrorResponse {
        success: false,
        message: INTERNAL_ERROR_MESSAGE.to_string(),
        error,
    };
    (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
}

/// Convert a caught panic into an internal error response.
pub fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    ApiError::Internal(panic_message(panic.as_ref())).into_response()
}

/// Text of a panic payload, when it carries one.
pub(crate) fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else {
        "panicked".to_string()
    }
}
