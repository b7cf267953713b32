//! Threshold alerts over the recent past.
//!
//! Evaluation is a pure function of the store contents, the thresholds and
//! the evaluation instant. Nothing is remembered between calls.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::analysis::aggregate::Aggregator;
use crate::config::AlertConfig;
use crate::store::{MetricKind, MetricStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    ErrorRateHigh,
    SecurityEvents,
    SlowResponses,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Alert {
    #[serde(rename = "type")]
    pub kind: AlertKind,
    pub severity: Severity,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlertReport {
    pub alerts: Vec<Alert>,
    pub total_alerts: usize,
}

impl AlertReport {
    pub fn fired(&self, kind: AlertKind) -> Option<&Alert> {
        self.alerts.iter().find(|a| a.kind == kind)
    }
}

/// Evaluate the alert rules at the current instant.
pub fn evaluate_alerts(store: &MetricStore, thresholds: &AlertConfig, window: Duration) -> AlertReport {
    evaluate_alerts_at(store, thresholds, window, Utc::now())
}

/// Evaluate the alert rules as of `now`. Rules run in a fixed order and fire
/// independently of each other.
pub fn evaluate_alerts_at(
    store: &MetricStore,
    thresholds: &AlertConfig,
    window: Duration,
    now: DateTime<Utc>,
) -> AlertReport {
    let agg = Aggregator::at(store, now);
    let requests = agg.trailing(MetricKind::Request, window);
    let errors = agg.trailing(MetricKind::Error, window);
    let security = agg.trailing(MetricKind::Security, window);

    let mut alerts = Vec::new();

    if !requests.is_empty() {
        let rate = errors.len() as f64 / requests.len() as f64;
        if rate > thresholds.error_rate_threshold {
            alerts.push(Alert {
                kind: AlertKind::ErrorRateHigh,
                severity: Severity::High,
                message: format!("High error rate detected: {:.1}%", rate * 100.0),
                timestamp: now,
            });
        }
    }

    if !security.is_empty() {
        alerts.push(Alert {
            kind: AlertKind::SecurityEvents,
            severity: Severity::Medium,
            message: format!(
                "{} security events in the last {} minutes",
                security.len(),
                window.as_secs() / 60
            ),
            timestamp: now,
        });
    }

    let slow = requests
        .iter()
        .filter_map(|e| e.as_request())
        .filter(|r| r.duration > thresholds.slow_request_secs)
        .count();
    if slow > 0 {
        alerts.push(Alert {
            kind: AlertKind::SlowResponses,
            severity: Severity::Medium,
            message: format!("{} slow requests detected", slow),
            timestamp: now,
        });
    }

    if !alerts.is_empty() {
        tracing::debug!(count = alerts.len(), "Alerts active");
    }

    AlertReport {
        total_alerts: alerts.len(),
        alerts,
    }
}
