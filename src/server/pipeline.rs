//! Request pipeline assembly.
//!
//! The pipeline is an explicit, ordered list of [`Stage`]s. [`create_app`]
//! registers the routes, mounts static uploads and the 404 fallback, then
//! wraps the result in every stage so that [`STAGES`]`[0]` is the outermost
//! layer.
//!
//! ```text
//!   request ──► security headers ──► rate limit ──► CORS ──► body limit
//!           ──► access log (development) ──► error handler ──► catch panic
//!           ──► /uploads/* | /api/auth/* | /api/admin/* | /api/public/*
//!               | /api/health | 404
//! ```

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::DefaultBodyLimit,
    handler::HandlerWithoutStateExt,
    http::{HeaderValue, Method, Request, Response},
    middleware, Router,
};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{AllowHeaders, AllowOrigin, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{info, info_span, Span};

use super::body::body_limit_middleware;
use super::errors::{error_handler_middleware, not_found_handler, panic_response};
use super::rate_limit::{rate_limit_middleware, RateLimiter};
use super::routes::{register_routes, RouteGroups};
use super::security::security_headers_middleware;
use crate::config::{Config, RuntimeMode};
use crate::error::StartupError;

/// Mount path of static uploads.
pub const UPLOADS_PATH: &str = "/uploads";

/// Methods allowed on cross-origin requests.
const CORS_METHODS: [Method; 6] = [
    Method::GET,
    Method::HEAD,
    Method::PUT,
    Method::PATCH,
    Method::POST,
    Method::DELETE,
];

// =============================================================================
// Stages
// =============================================================================

/// One cross-cutting policy applied to every request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    SecurityHeaders,
    RateLimit,
    Cors,
    BodyLimit,
    AccessLog,
    ErrorHandler,
    CatchPanic,
}

/// Pipeline stages, outermost first.
pub const STAGES: [Stage; 7] = [
    Stage::SecurityHeaders,
    Stage::RateLimit,
    Stage::Cors,
    Stage::BodyLimit,
    Stage::AccessLog,
    Stage::ErrorHandler,
    Stage::CatchPanic,
];

impl Stage {
    pub fn name(self) -> &'static str {
        match self {
            Stage::SecurityHeaders => "security headers",
            Stage::RateLimit => "rate limit",
            Stage::Cors => "cors",
            Stage::BodyLimit => "body limit",
            Stage::AccessLog => "access log",
            Stage::ErrorHandler => "error handler",
            Stage::CatchPanic => "catch panic",
        }
    }

    /// Wrap `router` in this stage.
    fn wrap(self, router: Router, pipeline: &Pipeline) -> Router {
        match self {
            Stage::SecurityHeaders => {
                router.layer(middleware::from_fn(security_headers_middleware))
            }
            Stage::RateLimit => router.layer(middleware::from_fn_with_state(
                Arc::clone(&pipeline.rate_limiter),
                rate_limit_middleware,
            )),
            Stage::Cors => router.layer(build_cors_layer(pipeline.allowed_origin.clone())),
            Stage::BodyLimit => router
                .layer(DefaultBodyLimit::max(pipeline.body_limit))
                .layer(middleware::from_fn_with_state(
                    pipeline.body_limit,
                    body_limit_middleware,
                )),
            Stage::AccessLog if pipeline.mode.is_development() => router.layer(
                TraceLayer::new_for_http()
                    .make_span_with(|request: &Request<Body>| {
                        info_span!("request", method = %request.method(), uri = %request.uri())
                    })
                    .on_request(())
                    .on_response(|response: &Response<Body>, latency: Duration, _span: &Span| {
                        let length = response
                            .headers()
                            .get(http::header::CONTENT_LENGTH)
                            .and_then(|v| v.to_str().ok())
                            .unwrap_or("-");
                        info!(
                            "{} {:.3} ms - {}",
                            response.status().as_u16(),
                            latency.as_secs_f64() * 1000.0,
                            length
                        );
                    }),
            ),
            Stage::AccessLog => router,
            Stage::ErrorHandler => router.layer(middleware::from_fn_with_state(
                pipeline.mode,
                error_handler_middleware,
            )),
            Stage::CatchPanic => router.layer(CatchPanicLayer::custom(panic_response)),
        }
    }
}

// =============================================================================
// Pipeline
// =============================================================================

/// Settings the stages need, resolved once from [`Config`].
pub struct Pipeline {
    pub mode: RuntimeMode,
    pub allowed_origin: HeaderValue,
    pub body_limit: usize,
    pub rate_limiter: Arc<RateLimiter>,
}

impl Pipeline {
    /// Resolve pipeline settings from a configuration.
    pub fn from_config(config: &Config) -> Result<Self, StartupError> {
        config.validate()?;

        Ok(Self {
            mode: config.mode(),
            allowed_origin: config.allowed_origin()?,
            body_limit: config.body_limit,
            rate_limiter: Arc::new(RateLimiter::new(
                config.rate_limit_max,
                config.rate_limit_window(),
            )),
        })
    }

    /// Wrap `router` in every stage, [`STAGES`]`[0]` outermost.
    pub fn apply(&self, router: Router) -> Router {
        STAGES
            .iter()
            .rev()
            .fold(router, |router, stage| stage.wrap(router, self))
    }
}

/// The assembled application.
pub struct App {
    /// Router with every stage applied
    pub router: Router,

    /// Limiter shared with the router, for the background sweep
    pub rate_limiter: Arc<RateLimiter>,
}

/// Build the full application from a configuration and route groups.
///
/// Fails if the configuration is invalid or any route group fails to
/// register.
pub fn create_app(config: &Config, groups: &RouteGroups) -> Result<App, StartupError> {
    let pipeline = Pipeline::from_config(config)?;

    let uploads = ServeDir::new(&config.uploads_dir)
        .call_fallback_on_method_not_allowed(true)
        .not_found_service(not_found_handler.into_service());

    // A known path with the wrong method is answered like an unknown path.
    let router = register_routes(groups)?
        .method_not_allowed_fallback(not_found_handler)
        .nest_service(UPLOADS_PATH, uploads)
        .fallback(not_found_handler);

    Ok(App {
        router: pipeline.apply(router),
        rate_limiter: pipeline.rate_limiter,
    })
}

/// Build the CORS layer: one origin, credentials allowed.
///
/// The origin is matched against the request so other origins never see an
/// allow-origin header.
fn build_cors_layer(origin: HeaderValue) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::list([origin]))
        .allow_credentials(true)
        .allow_methods(CORS_METHODS)
        .allow_headers(AllowHeaders::mirror_request())
}
