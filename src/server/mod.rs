//! HTTP server layer for the Alfa TechX API.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                         HTTP Layer                              │
//! │   /api/auth/*   /api/admin/*   /api/public/*   /api/health      │
//! │                                                                 │
//! │  ┌────────────┐ ┌────────────┐ ┌──────────┐ ┌───────────────┐   │
//! │  │  security  │ │ rate_limit │ │   body   │ │    errors     │   │
//! │  │ (headers)  │ │ (per IP)   │ │ (limits) │ │ (404 / 500)   │   │
//! │  └────────────┘ └────────────┘ └──────────┘ └───────────────┘   │
//! │  ┌─────────────────────────┐ ┌─────────────────────────────┐    │
//! │  │        pipeline         │ │           routes            │    │
//! │  │   (ordered stages)      │ │  (groups, registration)     │    │
//! │  └─────────────────────────┘ └─────────────────────────────┘    │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod body;
pub mod errors;
pub mod handlers;
pub mod pipeline;
pub mod rate_limit;
pub mod routes;
pub mod security;

pub use body::{body_limit_middleware, Payload};
pub use errors::{error_handler_middleware, not_found_handler, panic_response, UnhandledError};
pub use handlers::{health_handler, ErrorResponse, HealthResponse, MessageResponse};
pub use pipeline::{create_app, App, Pipeline, Stage, STAGES, UPLOADS_PATH};
pub use rate_limit::{rate_limit_middleware, RateLimitDecision, RateLimiter, RATE_LIMIT_MESSAGE};
pub use routes::{
    register_routes, RouteGroup, RouteGroups, RouteRegistry, ADMIN_PATH, AUTH_PATH, HEALTH_PATH,
    PUBLIC_PATH,
};
pub use security::{security_headers_middleware, SECURITY_HEADERS};
