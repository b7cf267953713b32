//! Request instrumentation.

use std::time::Instant;

use axum::{
    body::Body,
    extract::{MatchedPath, State},
    http::Request,
    middleware::Next,
    response::Response,
};

use crate::http::error::ErrorDetail;
use crate::http::request::request_id;
use crate::http::server::AppState;
use crate::observability::metrics;

/// Endpoint label for requests that matched no route.
pub const UNKNOWN_ENDPOINT: &str = "unknown";

/// Time every request and record its outcome.
///
/// Server errors also produce an error event, using the handler's
/// [`ErrorDetail`] when one is attached.
pub async fn record_requests(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let start = Instant::now();
    let endpoint = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| UNKNOWN_ENDPOINT.to_string());
    let method = request.method().to_string();

    tracing::debug!(
        request_id = %request_id(request.headers()),
        method = %method,
        path = %request.uri().path(),
        user_agent = request
            .headers()
            .get(axum::http::header::USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("unknown"),
        "Request started"
    );

    let response = next.run(request).await;

    let duration = start.elapsed().as_secs_f64();
    let status = response.status();

    state
        .recorder
        .record_request(&endpoint, &method, status.as_u16(), duration);
    metrics::record_request(&method, status.as_u16(), &endpoint, start);

    if let Some(detail) = response.extensions().get::<ErrorDetail>() {
        if status.is_server_error() {
            state
                .recorder
                .record_error(&detail.error_type, &detail.message, Some(&endpoint));
        }
    } else if status.is_server_error() {
        state.recorder.record_error(
            "HttpError",
            &status.to_string(),
            Some(&endpoint),
        );
    }

    let slow_cutoff = state.config.load().alerts.slow_request_secs;
    if duration > slow_cutoff {
        tracing::warn!(endpoint = %endpoint, duration, "Slow request detected");
    }

    response
}
