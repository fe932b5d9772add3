//! # Alfa TechX API
//!
//! HTTP bootstrap for the Alfa TechX backend. It composes the cross-cutting
//! request policies and mounts the route groups supplied by the deployment.
//!
//! ## Features
//!
//! - **Security headers**: a protective header set on every response
//! - **Rate limiting**: 100 requests per client IP per 15 minutes by default
//! - **CORS**: a single credentialed frontend origin
//! - **Body limits**: JSON and URL-encoded bodies up to 10MB
//! - **Static uploads**: files under `/uploads` served from disk
//! - **Fail-fast startup**: a route group that cannot be registered stops the process
//!
//! ## Architecture
//!
//! - [`server`] - Axum router, pipeline stages and route registration
//! - [`config`] - CLI and environment configuration
//! - [`error`] - Startup and request error types
//!
//! ## Example
//!
//! ```rust,no_run
//! use alfa_techx_api::{create_app, Config, RouteGroups};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = Config::default();
//!     let app = create_app(&config, &RouteGroups::default()).expect("valid setup");
//!
//!     let listener = tokio::net::TcpListener::bind(config.bind_address()).await.unwrap();
//!     axum::serve(
//!         listener,
//!         app.router
//!             .into_make_service_with_connect_info::<std::net::SocketAddr>(),
//!     )
//!     .await
//!     .unwrap();
//! }
//! ```

pub mod config;
pub mod error;
pub mod server;

// Re-export commonly used types
pub use config::{Config, RuntimeMode};
pub use error::{ApiError, ConfigError, RegistrationError, StartupError};
pub use server::{
    create_app, health_handler, register_routes, App, ErrorResponse, HealthResponse,
    MessageResponse, Payload, RateLimiter, RouteGroup, RouteGroups, Stage, STAGES,
};
