use thiserror::Error;

/// Errors found while validating the startup configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The frontend URL cannot be used as a CORS origin
    #[error("Invalid frontend URL '{0}': expected an http:// or https:// origin")]
    InvalidFrontendUrl(String),

    /// Rate limit must allow at least one request
    #[error("rate_limit_max must be greater than 0")]
    InvalidRateLimitMax,

    /// Rate limit window must be non-empty
    #[error("rate_limit_window_secs must be greater than 0")]
    InvalidRateLimitWindow,

    /// Body limit must accept at least one byte
    #[error("body_limit must be greater than 0")]
    InvalidBodyLimit,
}

/// Errors raised while mounting a route group at startup.
///
/// Any of these aborts startup: the server never runs half-configured.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationError {
    /// The group failed to build its router
    #[error("{group} routes failed to build: {reason}")]
    Build { group: String, reason: String },

    /// Another group or route already owns this path
    #[error("{group} routes cannot be mounted at {path}: path already registered")]
    Conflict { group: String, path: String },

    /// The mount path is not a plain absolute path
    #[error("{group} routes cannot be mounted at '{path}': {reason}")]
    InvalidPath {
        group: String,
        path: String,
        reason: &'static str,
    },
}

/// Errors that abort [`create_app`](crate::server::create_app).
#[derive(Debug, Clone, Error)]
pub enum StartupError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Route registration failed: {0}")]
    Registration(#[from] RegistrationError),
}

/// Request-scoped errors returned by handlers and extractors.
///
/// Client errors render as `{success: false, message}`. `Internal` renders
/// as a 500 whose body is finalised by the terminal error handler.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// Malformed request body or parameters
    #[error("{0}")]
    BadRequest(String),

    /// Body exceeds the configured limit
    #[error("Request entity too large")]
    PayloadTooLarge,

    /// Body has a content type the pipeline does not parse
    #[error("Unsupported content type: {0}")]
    UnsupportedMediaType(String),

    /// Anything unexpected; never shown verbatim outside development
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    /// Wrap any displayable error as an internal error.
    pub fn internal(err: impl std::fmt::Display) -> Self {
        ApiError::Internal(err.to_string())
    }
}
