use std::time::Instant;

use axum::{
    extract::{Query, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::analysis::{evaluate_alerts, parse_window, AlertReport, Aggregator, DashboardSnapshot, MetricsReport};
use crate::health::{HealthSnapshot, OverallStatus};
use crate::http::error::ApiError;
use crate::http::server::AppState;
use crate::monitoring::auth::Principal;
use crate::store::MetricCounts;

pub const DASHBOARD_VIEW_ACTION: &str = "view_monitoring_dashboard";

#[derive(Debug, Deserialize)]
pub struct MetricsQuery {
    pub window: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ChecksQuery {
    #[serde(default)]
    pub refresh: bool,
}

#[derive(Debug, Serialize)]
pub struct HealthSummary {
    pub status: OverallStatus,
    pub timestamp: DateTime<Utc>,
    pub metrics_count: MetricCounts,
}

pub async fn get_dashboard(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> Json<DashboardSnapshot> {
    state
        .recorder
        .record_user_activity(&principal.0, DASHBOARD_VIEW_ACTION, None);

    let window = state.config.load().windows.dashboard();
    Json(Aggregator::new(&state.store).dashboard(window))
}

pub async fn get_metrics(
    State(state): State<AppState>,
    Query(query): Query<MetricsQuery>,
) -> Result<Json<MetricsReport>, ApiError> {
    let window = match query.window.as_deref() {
        Some(raw) => parse_window(raw)?,
        None => state.config.load().windows.metrics(),
    };
    Ok(Json(Aggregator::new(&state.store).metrics_report(window)))
}

pub async fn get_alerts(State(state): State<AppState>) -> Json<AlertReport> {
    let config = state.config.load_full();
    Json(evaluate_alerts(
        &state.store,
        &config.alerts,
        config.windows.alert(),
    ))
}

/// Liveness summary. Served without authentication.
pub async fn get_health(State(state): State<AppState>) -> Json<HealthSummary> {
    let snapshot = state.health.current().await;
    Json(HealthSummary {
        status: snapshot.overall,
        timestamp: Utc::now(),
        metrics_count: state.store.counts(),
    })
}

pub async fn get_health_checks(
    State(state): State<AppState>,
    Query(query): Query<ChecksQuery>,
) -> Json<HealthSnapshot> {
    if !query.refresh {
        return Json(state.health.current().await);
    }

    let started = Instant::now();
    let snapshot = state.health.run_all().await;
    state
        .recorder
        .record_performance_metric("health_check_duration", started.elapsed().as_secs_f64());
    Json(snapshot)
}
