//! Configuration management for the Alfa TechX API.
//!
//! Every option can be given as a command-line flag or an environment
//! variable. A `.env` file in the working directory is loaded by the binary
//! before parsing, so the same variables can live there.
//!
//! # Environment Variables
//!
//! - `BIND_HOST` - Server bind address (default: 0.0.0.0)
//! - `PORT` - Server port (default: 5000)
//! - `FRONTEND_URL` - Allowed CORS origin (default: http://localhost:3000)
//! - `NODE_ENV` - Runtime mode; `development` enables access logs and verbose errors
//! - `UPLOADS_DIR` - Directory served under `/uploads` (default: uploads)
//! - `BODY_LIMIT` - Max request body in bytes (default: 10MB)
//! - `RATE_LIMIT_MAX` - Requests per client per window (default: 100)
//! - `RATE_LIMIT_WINDOW_SECS` - Rate limit window in seconds (default: 900)

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use http::HeaderValue;

use crate::error::ConfigError;

// =============================================================================
// Default Values
// =============================================================================

/// Default server host. All interfaces, so the API is reachable from
/// container networking.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default server port.
pub const DEFAULT_PORT: u16 = 5000;

/// Default allowed CORS origin.
pub const DEFAULT_FRONTEND_URL: &str = "http://localhost:3000";

/// Default directory for static uploads.
pub const DEFAULT_UPLOADS_DIR: &str = "uploads";

/// Default JSON / URL-encoded body limit (10MB).
pub const DEFAULT_BODY_LIMIT: usize = 10 * 1024 * 1024;

/// Default number of requests a client may make per window.
pub const DEFAULT_RATE_LIMIT_MAX: u32 = 100;

/// Default rate limit window in seconds (15 minutes).
pub const DEFAULT_RATE_LIMIT_WINDOW_SECS: u64 = 15 * 60;

/// `NODE_ENV` value that turns on development behaviour.
pub const DEVELOPMENT: &str = "development";

// =============================================================================
// Runtime Mode
// =============================================================================

/// Runtime mode derived from `NODE_ENV`.
///
/// Only `development` changes behaviour; every other value (or none) is
/// treated as production.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeMode {
    Development,
    Production,
}

impl RuntimeMode {
    /// Interpret a `NODE_ENV` value.
    pub fn from_node_env(value: Option<&str>) -> Self {
        match value {
            Some(DEVELOPMENT) => RuntimeMode::Development,
            _ => RuntimeMode::Production,
        }
    }

    pub fn is_development(self) -> bool {
        self == RuntimeMode::Development
    }
}

// =============================================================================
// CLI Arguments
// =============================================================================

/// Alfa TechX API server.
///
/// Serves the auth, admin and public route groups behind security headers,
/// rate limiting, CORS and body limits.
#[derive(Parser, Debug, Clone)]
#[command(name = "alfa-techx-api")]
#[command(author, version, about, long_about = None)]
pub struct Config {
    // =========================================================================
    // Server Configuration
    // =========================================================================
    /// Host address to bind the server to.
    #[arg(long, default_value = DEFAULT_HOST, env = "BIND_HOST")]
    pub host: String,

    /// Port to listen on.
    #[arg(short, long, default_value_t = DEFAULT_PORT, env = "PORT")]
    pub port: u16,

    /// Runtime mode. `development` enables access logging and detailed
    /// error bodies.
    #[arg(long, env = "NODE_ENV")]
    pub node_env: Option<String>,

    // =========================================================================
    // Request Policy
    // =========================================================================
    /// Origin allowed to make credentialed cross-origin requests.
    #[arg(long, default_value = DEFAULT_FRONTEND_URL, env = "FRONTEND_URL")]
    pub frontend_url: String,

    /// Maximum JSON / URL-encoded request body size in bytes.
    #[arg(long, default_value_t = DEFAULT_BODY_LIMIT, env = "BODY_LIMIT")]
    pub body_limit: usize,

    /// Maximum requests per client IP within one window.
    #[arg(long, default_value_t = DEFAULT_RATE_LIMIT_MAX, env = "RATE_LIMIT_MAX")]
    pub rate_limit_max: u32,

    /// Rate limit window length in seconds.
    #[arg(long, default_value_t = DEFAULT_RATE_LIMIT_WINDOW_SECS, env = "RATE_LIMIT_WINDOW_SECS")]
    pub rate_limit_window_secs: u64,

    // =========================================================================
    // Static Files
    // =========================================================================
    /// Directory served under `/uploads`.
    #[arg(long, default_value = DEFAULT_UPLOADS_DIR, env = "UPLOADS_DIR")]
    pub uploads_dir: PathBuf,

    // =========================================================================
    // Logging Configuration
    // =========================================================================
    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            node_env: None,
            frontend_url: DEFAULT_FRONTEND_URL.to_string(),
            body_limit: DEFAULT_BODY_LIMIT,
            rate_limit_max: DEFAULT_RATE_LIMIT_MAX,
            rate_limit_window_secs: DEFAULT_RATE_LIMIT_WINDOW_SECS,
            uploads_dir: PathBuf::from(DEFAULT_UPLOADS_DIR),
            verbose: false,
        }
    }
}

impl Config {
    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.allowed_origin()?;

        if self.rate_limit_max == 0 {
            return Err(ConfigError::InvalidRateLimitMax);
        }
        if self.rate_limit_window_secs == 0 {
            return Err(ConfigError::InvalidRateLimitWindow);
        }
        if self.body_limit == 0 {
            return Err(ConfigError::InvalidBodyLimit);
        }

        Ok(())
    }

    /// The frontend URL as a CORS origin header value.
    ///
    /// A trailing slash is dropped since browsers never send one in `Origin`.
    pub fn allowed_origin(&self) -> Result<HeaderValue, ConfigError> {
        let origin = self.frontend_url.trim().trim_end_matches('/');
        let invalid = || ConfigError::InvalidFrontendUrl(self.frontend_url.clone());

        let host = origin
            .strip_prefix("http://")
            .or_else(|| origin.strip_prefix("https://"))
            .ok_or_else(invalid)?;
        if host.is_empty() || host.contains('/') {
            return Err(invalid());
        }

        HeaderValue::from_str(origin).map_err(|_| invalid())
    }

    /// Runtime mode derived from `NODE_ENV`.
    pub fn mode(&self) -> RuntimeMode {
        RuntimeMode::from_node_env(self.node_env.as_deref())
    }

    /// `NODE_ENV` as given, for the startup banner.
    pub fn environment_label(&self) -> &str {
        self.node_env.as_deref().unwrap_or("unset")
    }

    /// Rate limit window as a duration.
    pub fn rate_limit_window(&self) -> Duration {
        Duration::from_secs(self.rate_limit_window_secs)
    }

    /// Get the server bind address as "host:port".
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

// =============================================================================
// Tests
// =============================================================================
