//! Per-client fixed-window rate limiting.
//!
//! Each client IP gets a window that opens on its first request and lasts
//! for the configured duration. Within a window the client may make `max`
//! requests; the next one is answered with 429 until the window elapses.
//!
//! ```text
//! t=0      first request      window opens, hits=1
//! ...      requests 2..=max   allowed
//! ...      request max+1      429 Too Many Requests
//! t>=win   next request       new window, hits=1
//! ```
//!
//! Every response carries `X-RateLimit-Limit`, `X-RateLimit-Remaining` and
//! `X-RateLimit-Reset` (seconds until the window resets). Rejections also
//! carry `Retry-After`.

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::sync::{Arc, Weak};
use std::time::{Duration, Instant};

use axum::{
    extract::{
        connect_info::{ConnectInfo, MockConnectInfo},
        Request, State,
    },
    http::{header::RETRY_AFTER, HeaderMap, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Body of every 429 response.
pub const RATE_LIMIT_MESSAGE: &str = "Too many requests from this IP, please try again later.";

const LIMIT_HEADER: &str = "x-ratelimit-limit";
const REMAINING_HEADER: &str = "x-ratelimit-remaining";
const RESET_HEADER: &str = "x-ratelimit-reset";

// =============================================================================
// Limiter
// =============================================================================

/// Outcome of counting one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitDecision {
    /// Request counted and allowed
    Allowed {
        /// Requests left in the current window
        remaining: u32,
        /// Time until the window resets
        reset_after: Duration,
    },

    /// Client exhausted its window
    Limited {
        /// Time until the window resets
        retry_after: Duration,
    },
}

#[derive(Debug, Clone, Copy)]
struct ClientWindow {
    hits: u32,
    started_at: Instant,
}

/// Fixed-window request counter keyed by client IP.
///
/// Requests whose peer address is unknown share a single window.
pub struct RateLimiter {
    max: u32,
    window: Duration,
    clients: Mutex<HashMap<Option<IpAddr>, ClientWindow>>,
}

impl RateLimiter {
    /// Create a limiter allowing `max` requests per `window` for each client.
    pub fn new(max: u32, window: Duration) -> Self {
        Self {
            max,
            window,
            clients: Mutex::new(HashMap::new()),
        }
    }

    /// Maximum requests per window.
    pub fn max(&self) -> u32 {
        self.max
    }

    /// Window length.
    pub fn window(&self) -> Duration {
        self.window
    }

    /// Count a request from `client` now.
    pub async fn check(&self, client: Option<IpAddr>) -> RateLimitDecision {
        self.check_at(client, Instant::now()).await
    }

    /// Count a request from `client` at the given instant.
    pub async fn check_at(&self, client: Option<IpAddr>, now: Instant) -> RateLimitDecision {
        let mut clients = self.clients.lock().await;

        let entry = clients.entry(client).or_insert(ClientWindow {
            hits: 0,
            started_at: now,
        });

        if now.saturating_duration_since(entry.started_at) >= self.window {
            *entry = ClientWindow {
                hits: 0,
                started_at: now,
            };
        }

        let reset_after = self
            .window
            .saturating_sub(now.saturating_duration_since(entry.started_at));

        if entry.hits >= self.max {
            return RateLimitDecision::Limited {
                retry_after: reset_after,
            };
        }

        entry.hits += 1;
        RateLimitDecision::Allowed {
            remaining: self.max - entry.hits,
            reset_after,
        }
    }

    /// Drop windows that have elapsed at `now`. Returns how many were removed.
    pub async fn purge_expired_at(&self, now: Instant) -> usize {
        let mut clients = self.clients.lock().await;
        let before = clients.len();
        clients.retain(|_, w| now.saturating_duration_since(w.started_at) < self.window);
        before - clients.len()
    }

    /// Number of clients with an open window.
    pub async fn tracked_clients(&self) -> usize {
        self.clients.lock().await.len()
    }

    /// Periodically purge elapsed windows.
    ///
    /// The task ends once the limiter itself is dropped.
    pub fn spawn_sweeper(self: &Arc<Self>) -> JoinHandle<()> {
        let limiter: Weak<Self> = Arc::downgrade(self);
        let period = self.window;

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            // First tick completes immediately.
            interval.tick().await;

            loop {
                interval.tick().await;
                let Some(limiter) = limiter.upgrade() else {
                    break;
                };
                let purged = limiter.purge_expired_at(Instant::now()).await;
                if purged > 0 {
                    debug!(purged, "Purged expired rate limit windows");
                }
            }
        })
    }
}

// =============================================================================
// Middleware
// =============================================================================

/// Count the request against its client's window and reject with 429 once
/// the window is exhausted.
pub async fn rate_limit_middleware(
    State(limiter): State<Arc<RateLimiter>>,
    request: Request,
    next: Next,
) -> Response {
    let client = client_ip(&request);

    match limiter.check(client).await {
        RateLimitDecision::Allowed {
            remaining,
            reset_after,
        } => {
            let mut response = next.run(request).await;
            apply_headers(response.headers_mut(), limiter.max(), remaining, reset_after);
            response
        }
        RateLimitDecision::Limited { retry_after } => {
            warn!(
                client = ?client,
                status = StatusCode::TOO_MANY_REQUESTS.as_u16(),
                "Rate limit exceeded"
            );

            let mut response = (StatusCode::TOO_MANY_REQUESTS, RATE_LIMIT_MESSAGE).into_response();
            let headers = response.headers_mut();
            apply_headers(headers, limiter.max(), 0, retry_after);
            headers.insert(RETRY_AFTER, HeaderValue::from(ceil_secs(retry_after)));
            response
        }
    }
}

/// Peer IP of the connection, if the server recorded it.
fn client_ip(request: &Request) -> Option<IpAddr> {
    let extensions = request.extensions();
    extensions
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip())
        .or_else(|| {
            extensions
                .get::<MockConnectInfo<SocketAddr>>()
                .map(|MockConnectInfo(addr)| addr.ip())
        })
}

fn apply_headers(headers: &mut HeaderMap, limit: u32, remaining: u32, reset_after: Duration) {
    headers.insert(LIMIT_HEADER, HeaderValue::from(limit));
    headers.insert(REMAINING_HEADER, HeaderValue::from(remaining));
    headers.insert(RESET_HEADER, HeaderValue::from(ceil_secs(reset_after)));
}

fn ceil_secs(duration: Duration) -> u64 {
    duration.as_secs() + u64::from(duration.subsec_nanos() > 0)
}
