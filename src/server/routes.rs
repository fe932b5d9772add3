//! Route groups and fail-fast registration.
//!
//! # Route Structure
//!
//! ```text
//! /api/auth/*      - Auth route group (supplied by the deployment)
//! /api/admin/*     - Admin route group (supplied by the deployment)
//! /api/public/*    - Public route group (supplied by the deployment)
//! /api/health      - Health check
//! ```
//!
//! Each group is registered on its own. The first group that fails to
//! build or mount stops registration with a [`RegistrationError`]; callers
//! are expected to abort startup rather than serve a partial API.
//!
//! # Example
//!
//! ```ignore
//! use axum::{routing::post, Router};
//! use alfa_techx_api::server::routes::{register_routes, RouteGroups};
//!
//! let auth = || Ok(Router::new().route("/login", post(login)));
//! let groups = RouteGroups::default().with_auth(auth);
//! let router = register_routes(&groups)?;
//! ```

use std::panic::{self, AssertUnwindSafe};

use axum::{
    routing::{get, MethodRouter},
    BoxError, Router,
};
use tracing::{error, info};

use super::errors::panic_message;
use super::handlers::health_handler;
use crate::error::RegistrationError;

/// Mount path of the auth route group.
pub const AUTH_PATH: &str = "/api/auth";

/// Mount path of the admin route group.
pub const ADMIN_PATH: &str = "/api/admin";

/// Mount path of the public route group.
pub const PUBLIC_PATH: &str = "/api/public";

/// Path of the health check.
pub const HEALTH_PATH: &str = "/api/health";

// =============================================================================
// Route Groups
// =============================================================================

/// A set of handlers mounted under one path prefix.
///
/// Routes inside the group are relative to the mount path. Building may
/// fail, e.g. when the group cannot load what its handlers need.
pub trait RouteGroup: Send + Sync {
    fn build(&self) -> Result<Router, BoxError>;
}

impl<F> RouteGroup for F
where
    F: Fn() -> Result<Router, BoxError> + Send + Sync,
{
    fn build(&self) -> Result<Router, BoxError> {
        self()
    }
}

/// Group with no routes; everything under its prefix falls through to 404.
fn empty_group() -> Result<Router, BoxError> {
    Ok(Router::new())
}

/// The three route groups the API mounts.
///
/// The default has no routes in any group.
pub struct RouteGroups {
    pub auth: Box<dyn RouteGroup>,
    pub admin: Box<dyn RouteGroup>,
    pub public: Box<dyn RouteGroup>,
}

impl Default for RouteGroups {
    fn default() -> Self {
        Self {
            auth: Box::new(empty_group),
            admin: Box::new(empty_group),
            public: Box::new(empty_group),
        }
    }
}

impl RouteGroups {
    pub fn new(
        auth: impl RouteGroup + 'static,
        admin: impl RouteGroup + 'static,
        public: impl RouteGroup + 'static,
    ) -> Self {
        Self {
            auth: Box::new(auth),
            admin: Box::new(admin),
            public: Box::new(public),
        }
    }

    pub fn with_auth(mut self, group: impl RouteGroup + 'static) -> Self {
        self.auth = Box::new(group);
        self
    }

    pub fn with_admin(mut self, group: impl RouteGroup + 'static) -> Self {
        self.admin = Box::new(group);
        self
    }

    pub fn with_public(mut self, group: impl RouteGroup + 'static) -> Self {
        self.public = Box::new(group);
        self
    }
}

// =============================================================================
// Registry
// =============================================================================

/// Accumulates mounted groups and routes, refusing duplicates and paths
/// the router cannot nest at.
pub struct RouteRegistry {
    router: Router,
    registered: Vec<String>,
}

impl Default for RouteRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl RouteRegistry {
    pub fn new() -> Self {
        Self {
            router: Router::new(),
            registered: Vec::new(),
        }
    }

    /// Mount `group` under `path`.
    pub fn mount(
        mut self,
        name: &str,
        path: &str,
        group: &dyn RouteGroup,
    ) -> Result<Self, RegistrationError> {
        self.claim(name, path)?;

        let build_error = |reason| RegistrationError::Build {
            group: name.to_string(),
            reason,
        };

        // Router construction panics on malformed or duplicate routes.
        let router = self.router;
        let nested = panic::catch_unwind(AssertUnwindSafe(move || -> Result<Router, BoxError> {
            Ok(router.nest(path, group.build()?))
        }));

        self.router = match nested {
            Ok(Ok(router)) => router,
            Ok(Err(e)) => return Err(build_error(e.to_string())),
            Err(panic) => return Err(build_error(panic_message(panic.as_ref()))),
        };
        Ok(self)
    }

    /// Register a single route at `path`.
    pub fn route(
        mut self,
        name: &str,
        path: &str,
        method_router: MethodRouter,
    ) -> Result<Self, RegistrationError> {
        self.claim(name, path)?;
        self.router = self.router.route(path, method_router);
        Ok(self)
    }

    /// Paths registered so far, in order.
    pub fn registered(&self) -> &[String] {
        &self.registered
    }

    pub fn into_router(self) -> Router {
        self.router
    }

    fn claim(&mut self, name: &str, path: &str) -> Result<(), RegistrationError> {
        let invalid = |reason| RegistrationError::InvalidPath {
            group: name.to_string(),
            path: path.to_string(),
            reason,
        };

        if !path.starts_with('/') {
            return Err(invalid("must start with '/'"));
        }
        if path.len() > 1 && path.ends_with('/') {
            return Err(invalid("must not end with '/'"));
        }
        if path == "/" {
            return Err(invalid("cannot mount at the root"));
        }
        if path.contains(['{', '}', '*']) {
            return Err(invalid("must not contain parameters or wildcards"));
        }

        if self.registered.iter().any(|p| p == path) {
            return Err(RegistrationError::Conflict {
                group: name.to_string(),
                path: path.to_string(),
            });
        }

        self.registered.push(path.to_string());
        Ok(())
    }
}

// =============================================================================
// Registration
// =============================================================================

/// Register the auth, admin and public groups and the health check, in that
/// order, logging each step.
///
/// Stops at the first failure.
pub fn register_routes(groups: &RouteGroups) -> Result<Router, RegistrationError> {
    let registry = RouteRegistry::new();

    let registry = register("auth routes", registry, |r| {
        r.mount("auth", AUTH_PATH, groups.auth.as_ref())
    })?;
    let registry = register("admin routes", registry, |r| {
        r.mount("admin", ADMIN_PATH, groups.admin.as_ref())
    })?;
    let registry = register("public routes", registry, |r| {
        r.mount("public", PUBLIC_PATH, groups.public.as_ref())
    })?;
    let registry = register("health check route", registry, |r| {
        r.route("health check", HEALTH_PATH, get(health_handler))
    })?;

    Ok(registry.into_router())
}

fn register<F>(
    label: &str,
    registry: RouteRegistry,
    step: F,
) -> Result<RouteRegistry, RegistrationError>
where
    F: FnOnce(RouteRegistry) -> Result<RouteRegistry, RegistrationError>,
{
    info!("Registering {}...", label);

    match step(registry) {
        Ok(registry) => {
            info!("{} registered successfully", capitalized(label));
            Ok(registry)
        }
        Err(e) => {
            error!("Error registering {}: {}", label, e);
            Err(e)
        }
    }
}

fn capitalized(label: &str) -> String {
    let mut chars = label.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

// =============================================================================
// Tests
// =============================================================================
