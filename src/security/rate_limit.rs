//! Fixed-window rate limiting per client and endpoint.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::{ConnectInfo, MatchedPath, State},
    http::{header, HeaderValue, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use dashmap::DashMap;
use serde_json::json;
use tokio::sync::broadcast;

use crate::config::RateLimitConfig;
use crate::observability::metrics;
use crate::store::Recorder;

/// Request count since `started`.
#[derive(Debug, Clone, Copy)]
struct FixedWindow {
    count: u32,
    started: Instant,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Decision {
    Allowed { remaining: u32 },
    Limited { retry_after: Duration },
}

/// State for the rate limiter.
pub struct RateLimiterState {
    windows: DashMap<String, FixedWindow>,
    limit: u32,
    window: Duration,
    recorder: Recorder,
}

impl RateLimiterState {
    pub fn new(config: &RateLimitConfig, recorder: Recorder) -> Self {
        Self {
            windows: DashMap::new(),
            limit: config.limit,
            window: Duration::from_secs(config.window_secs),
            recorder,
        }
    }

    pub fn check(&self, key: &str) -> Decision {
        self.check_at(key, Instant::now())
    }

    /// A window resets once more than `window` has passed since it opened.
    /// Rejected requests do not count against the client.
    pub fn check_at(&self, key: &str, now: Instant) -> Decision {
        let mut entry = self
            .windows
            .entry(key.to_string())
            .or_insert(FixedWindow { count: 0, started: now });
        let state = entry.value_mut();

        let elapsed = now.saturating_duration_since(state.started);
        if elapsed > self.window {
            state.count = 0;
            state.started = now;
        }

        if state.count >= self.limit {
            let elapsed = now.saturating_duration_since(state.started);
            return Decision::Limited {
                retry_after: self.window.saturating_sub(elapsed),
            };
        }

        state.count += 1;
        Decision::Allowed {
            remaining: self.limit - state.count,
        }
    }

    /// Drop windows that have expired. Returns how many were removed.
    pub fn purge_expired(&self, now: Instant) -> usize {
        let before = self.windows.len();
        self.windows
            .retain(|_, w| now.saturating_duration_since(w.started) <= self.window);
        before.saturating_sub(self.windows.len())
    }

    pub fn tracked_clients(&self) -> usize {
        self.windows.len()
    }

    /// Periodically purge expired windows until shutdown.
    pub async fn run_purge(self: Arc<Self>, interval: Duration, mut shutdown: broadcast::Receiver<()>) {
        let mut ticker = tokio::time::interval(interval);
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let removed = self.purge_expired(Instant::now());
                    if removed > 0 {
                        tracing::debug!(removed, remaining = self.tracked_clients(), "Purged expired rate limit windows");
                    }
                }
                _ = shutdown.recv() => {
                    tracing::info!("Rate limit purge received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    }
}

/// Peer address of the caller, or `unknown` without connect info.
pub fn client_ip(request: &Request<Body>) -> String {
    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Route template the request matched, or `unknown`.
pub fn endpoint_of(request: &Request<Body>) -> String {
    request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Rate limit key: one window per client and endpoint.
pub fn client_key(request: &Request<Body>) -> String {
    format!("{}:{}", client_ip(request), endpoint_of(request))
}

/// Middleware enforcing the per-client, per-endpoint limit.
pub async fn rate_limit_middleware(
    State(state): State<Arc<RateLimiterState>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let key = client_key(&request);

    match state.check(&key) {
        Decision::Allowed { .. } => next.run(request).await,
        Decision::Limited { retry_after } => {
            let client = client_ip(&request);
            let endpoint = endpoint_of(&request);
            tracing::warn!(client = %client, endpoint = %endpoint, "Rate limit exceeded");
            metrics::record_rate_limited("fixed_window");
            state.recorder.record_security_event(
                "rate_limit_exceeded",
                json!({
                    "client": client,
                    "endpoint": endpoint,
                    "path": request.uri().path(),
                    "limit": state.limit,
                }),
            );

            let retry_secs = retry_after.as_secs_f64();
            let mut response = (
                StatusCode::TOO_MANY_REQUESTS,
                Json(json!({
                    "error": "Rate limit exceeded",
                    "retry_after": retry_secs,
                })),
            )
                .into_response();
            if let Ok(value) = HeaderValue::from_str(&retry_after.as_secs().max(1).to_string()) {
                response.headers_mut().insert(header::RETRY_AFTER, value);
            }
            response
        }
    }
}
