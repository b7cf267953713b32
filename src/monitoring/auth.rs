use axum::{
    body::Body,
    extract::State,
    http::{header::AUTHORIZATION, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::http::error::ApiError;
use crate::http::server::AppState;

/// Who is calling the monitoring API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal(pub String);

impl Principal {
    pub const API_KEY: &'static str = "api-key";
    pub const ANONYMOUS: &'static str = "anonymous";
}

/// Require `Authorization: Bearer <api_key>` when a key is configured.
///
/// The key is read from the live config on every request, so a reload that
/// rotates it applies immediately.
pub async fn require_api_key(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let expected = state.config.load().auth.api_key.clone();

    let Some(expected) = expected else {
        request
            .extensions_mut()
            .insert(Principal(Principal::ANONYMOUS.to_string()));
        return next.run(request).await;
    };

    let provided = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "));

    match provided {
        Some(token) if token == expected => {
            request
                .extensions_mut()
                .insert(Principal(Principal::API_KEY.to_string()));
            next.run(request).await
        }
        _ => {
            let reason = if provided.is_some() {
                "invalid_credentials"
            } else {
                "missing_credentials"
            };
            tracing::warn!(path = %request.uri().path(), reason, "Rejected monitoring request");
            state.recorder.record_security_event(
                "unauthorized_access",
                json!({
                    "path": request.uri().path(),
                    "reason": reason,
                }),
            );
            ApiError::Unauthorized.into_response()
        }
    }
}
