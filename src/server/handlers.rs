//! Inline handlers and the JSON envelopes shared by every response the
//! pipeline produces on its own.
//!
//! # Endpoints
//!
//! - `GET /api/health` - Health check endpoint

use axum::Json;
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Message reported by the health check.
pub const HEALTH_MESSAGE: &str = "Alfa TechX API is running!";

// =============================================================================
// Response Types
// =============================================================================

/// Health check response.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub success: bool,
    pub message: String,

    /// Current time, ISO-8601 UTC with millisecond precision
    pub timestamp: String,
}

/// `{success, message}` envelope used for 404s and client rejections.
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

impl MessageResponse {
    /// A failure envelope with the given message.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

/// Body of the terminal error handler's 500 response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,

    /// Detailed message in development, a generic one otherwise
    pub error: String,
}

// =============================================================================
// Handlers
// =============================================================================

/// Handle health check requests.
///
/// # Endpoint
///
/// `GET /api/health`
///
/// Always 200, independent of runtime mode.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        success: true,
        message: HEALTH_MESSAGE.to_string(),
        timestamp: iso_timestamp(),
    })
}

/// Current UTC time formatted like `2024-05-01T12:30:00.123Z`.
pub fn iso_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
