//! Flags requests that look automated or carry proxy headers.

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, Request},
    middleware::Next,
    response::Response,
};
use serde_json::{json, Value};

use crate::store::Recorder;

const SUSPICIOUS_AGENTS: [&str; 3] = ["bot", "crawler", "spider"];
const SUSPICIOUS_HEADERS: [&str; 3] = ["x-forwarded-for", "x-real-ip", "x-forwarded-proto"];

/// Security events a request would raise, as `(type, details)` pairs.
pub fn findings(headers: &HeaderMap) -> Vec<(&'static str, Value)> {
    let mut found = Vec::new();

    if let Some(agent) = headers.get(header::USER_AGENT).and_then(|v| v.to_str().ok()) {
        let lower = agent.to_ascii_lowercase();
        if SUSPICIOUS_AGENTS.iter().any(|p| lower.contains(p)) {
            found.push(("suspicious_user_agent", json!({ "user_agent": agent })));
        }
    }

    for name in SUSPICIOUS_HEADERS {
        if let Some(value) = headers.get(name) {
            found.push((
                "suspicious_header",
                json!({
                    "header": name,
                    "value": value.to_str().unwrap_or("<non-ascii>"),
                }),
            ));
        }
    }

    found
}

pub async fn inspect_request(
    State(recorder): State<Recorder>,
    request: Request<Body>,
    next: Next,
) -> Response {
    for (event_type, details) in findings(request.headers()) {
        recorder.record_security_event(event_type, details);
    }
    next.run(request).await
}
