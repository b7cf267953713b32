//! Monitoring API.
//!
//! ```text
//! GET /monitoring/dashboard            24h summary            (auth)
//! GET /monitoring/api/metrics?window=  raw windowed events    (auth)
//! GET /monitoring/api/alerts           threshold alerts       (auth)
//! GET /monitoring/api/health/checks    health snapshot        (auth)
//! GET /monitoring/health               liveness summary       (public)
//! ```

pub mod auth;
pub mod handlers;

use axum::{middleware, routing::get, Router};

use self::auth::require_api_key;
use self::handlers::*;
use crate::http::server::AppState;

pub use auth::Principal;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/monitoring/dashboard", get(get_dashboard))
        .route("/monitoring/api/metrics", get(get_metrics))
        .route("/monitoring/api/alerts", get(get_alerts))
        .route("/monitoring/api/health/checks", get(get_health_checks))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_api_key))
        .route("/monitoring/health", get(get_health))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MonitorConfig;
    use crate::store::{MetricKind, MetricPayload};
    use axum::{
        body::{to_bytes, Body},
        http::{header::AUTHORIZATION, Request, StatusCode},
    };
    use serde_json::Value;
    use tower::ServiceExt;

    fn keyed_state() -> AppState {
        let mut config = MonitorConfig::default();
        config.auth.api_key = Some("s3cret".into());
        AppState::new(config)
    }

    async fn get_json(state: &AppState, uri: &str, key: Option<&str>) -> (StatusCode, Value) {
        let mut request = Request::builder().uri(uri);
        if let Some(key) = key {
            request = request.header(AUTHORIZATION, format!("Bearer {}", key));
        }
        let response = router(state.clone())
            .oneshot(request.body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_missing_key_is_rejected_and_recorded() {
        let state = keyed_state();
        let (status, body) = get_json(&state, "/monitoring/api/alerts", None).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "authentication required");

        let events = state.store.snapshot(MetricKind::Security);
        assert_eq!(events.len(), 1);
        match &events[0].payload {
            MetricPayload::Security(e) => {
                assert_eq!(e.event_type, "unauthorized_access");
                assert_eq!(e.details["reason"], "missing_credentials");
            }
            other => panic!("unexpected payload {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_wrong_key_is_rejected() {
        let state = keyed_state();
        let (status, _) = get_json(&state, "/monitoring/dashboard", Some("guess")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_health_is_public() {
        let state = keyed_state();
        let (status, body) = get_json(&state, "/monitoring/health", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["metrics_count"]["requests"], 0);
    }

    #[tokio::test]
    async fn test_dashboard_records_viewer() {
        let state = keyed_state();
        state.recorder.record_request("/tasks", "GET", 200, 0.1);

        let (status, body) = get_json(&state, "/monitoring/dashboard", Some("s3cret")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total_requests"], 1);
        assert_eq!(body["top_endpoints"][0]["endpoint"], "/tasks");

        let activity = state.store.snapshot(MetricKind::Activity);
        match &activity[0].payload {
            MetricPayload::Activity(a) => {
                assert_eq!(a.user_id, Principal::API_KEY);
                assert_eq!(a.action, "view_monitoring_dashboard");
            }
            other => panic!("unexpected payload {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_without_key_everything_is_open() {
        let state = AppState::new(MonitorConfig::default());
        let (status, _) = get_json(&state, "/monitoring/dashboard", None).await;
        assert_eq!(status, StatusCode::OK);

        let activity = state.store.snapshot(MetricKind::Activity);
        match &activity[0].payload {
            MetricPayload::Activity(a) => assert_eq!(a.user_id, Principal::ANONYMOUS),
            other => panic!("unexpected payload {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_metrics_window_is_validated() {
        let state = AppState::new(MonitorConfig::default());

        let (status, body) = get_json(&state, "/monitoring/api/metrics?window=0", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().starts_with("invalid window"));

        let (status, _) = get_json(&state, "/monitoring/api/metrics?window=soon", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = get_json(&state, "/monitoring/api/metrics?window=15m", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["window_secs"], 900);
    }

    #[tokio::test]
    async fn test_alerts_fire_from_recorded_errors() {
        let state = AppState::new(MonitorConfig::default());
        for _ in 0..8 {
            state.recorder.record_request("/tasks", "GET", 200, 0.1);
        }
        for _ in 0..2 {
            state.recorder.record_request("/tasks", "POST", 500, 0.1);
            state.recorder.record_error("InternalError", "boom", Some("/tasks"));
        }

        let (status, body) = get_json(&state, "/monitoring/api/alerts", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total_alerts"], 1);
        assert_eq!(body["alerts"][0]["type"], "error_rate_high");
        assert_eq!(body["alerts"][0]["severity"], "high");
    }

    #[tokio::test]
    async fn test_check_refresh_reruns_checks() {
        let state = AppState::new(MonitorConfig::default());
        state.health.register_fn("database", || Ok::<_, String>(true));
        state
            .health
            .register_fn("cache", || Err::<bool, _>("connection refused".to_string()));

        let (status, body) =
            get_json(&state, "/monitoring/api/health/checks?refresh=true", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["overall_status"], "unhealthy");
        assert_eq!(body["checks"]["database"]["status"], "healthy");
        assert_eq!(body["checks"]["cache"]["status"], "error");
        assert_eq!(body["checks"]["cache"]["error"], "connection refused");
        assert_eq!(state.store.len(MetricKind::Performance), 1);
    }
}
