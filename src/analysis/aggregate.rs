//! Windowed statistics over the metric store.

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::analysis::window::window_start;
use crate::store::{MetricEvent, MetricKind, MetricStore};

/// Endpoints ranked on the dashboard by default.
pub const TOP_ENDPOINTS_LIMIT: usize = 10;
/// Errors and security events listed on the dashboard.
pub const RECENT_EVENTS_LIMIT: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EndpointCount {
    pub endpoint: String,
    pub count: usize,
}

/// Summary shown on the monitoring dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSnapshot {
    pub timestamp: DateTime<Utc>,
    pub window_secs: u64,
    pub total_requests: usize,
    pub total_errors: usize,
    pub security_events: usize,
    /// Percent.
    pub error_rate: f64,
    /// Seconds.
    pub avg_response_time: f64,
    pub top_endpoints: Vec<EndpointCount>,
    pub recent_errors: Vec<MetricEvent>,
    pub recent_security_events: Vec<MetricEvent>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RateSummary {
    pub requests_per_minute: f64,
    pub errors_per_minute: f64,
    pub security_events_per_minute: f64,
}

/// Every buffer's events inside a window, with per-minute rates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsReport {
    pub timestamp: DateTime<Utc>,
    pub window_secs: u64,
    pub metrics: HashMap<MetricKind, Vec<MetricEvent>>,
    pub summary: RateSummary,
}

/// Read-only statistics over a store, evaluated at a fixed instant.
#[derive(Debug, Clone, Copy)]
pub struct Aggregator<'a> {
    store: &'a MetricStore,
    now: DateTime<Utc>,
}

impl<'a> Aggregator<'a> {
    pub fn new(store: &'a MetricStore) -> Self {
        Self::at(store, Utc::now())
    }

    pub fn at(store: &'a MetricStore, now: DateTime<Utc>) -> Self {
        Self { store, now }
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.now
    }

    /// Events of `kind` strictly newer than `since`, in insertion order.
    pub fn windowed(&self, kind: MetricKind, since: DateTime<Utc>) -> Vec<MetricEvent> {
        self.store.windowed(kind, since)
    }

    /// Events of `kind` inside the trailing `window`.
    pub fn trailing(&self, kind: MetricKind, window: Duration) -> Vec<MetricEvent> {
        self.windowed(kind, window_start(self.now, window))
    }

    /// `errors / requests` over the window, as a fraction; 0 without requests.
    pub fn error_rate(&self, window: Duration) -> f64 {
        let requests = self.trailing(MetricKind::Request, window).len();
        let errors = self.trailing(MetricKind::Error, window).len();
        error_rate_of(errors, requests)
    }

    /// Mean request duration in seconds, 0 when there were no requests.
    pub fn avg_duration(&self, window: Duration) -> f64 {
        average_duration(&self.trailing(MetricKind::Request, window))
    }

    pub fn top_endpoints(&self, window: Duration, limit: usize) -> Vec<EndpointCount> {
        rank_endpoints(&self.trailing(MetricKind::Request, window), limit)
    }

    pub fn dashboard(&self, window: Duration) -> DashboardSnapshot {
        let requests = self.trailing(MetricKind::Request, window);
        let errors = self.trailing(MetricKind::Error, window);
        let security = self.trailing(MetricKind::Security, window);

        DashboardSnapshot {
            timestamp: self.now,
            window_secs: window.as_secs(),
            total_requests: requests.len(),
            total_errors: errors.len(),
            security_events: security.len(),
            error_rate: error_rate_of(errors.len(), requests.len()) * 100.0,
            avg_response_time: average_duration(&requests),
            top_endpoints: rank_endpoints(&requests, TOP_ENDPOINTS_LIMIT),
            recent_errors: last_n(errors, RECENT_EVENTS_LIMIT),
            recent_security_events: last_n(security, RECENT_EVENTS_LIMIT),
        }
    }

    pub fn metrics_report(&self, window: Duration) -> MetricsReport {
        let metrics: HashMap<MetricKind, Vec<MetricEvent>> = MetricKind::ALL
            .iter()
            .map(|kind| (*kind, self.trailing(*kind, window)))
            .collect();

        let minutes = (window.as_secs_f64() / 60.0).max(f64::MIN_POSITIVE);
        let per_minute = |kind: MetricKind| metrics.get(&kind).map_or(0, Vec::len) as f64 / minutes;
        let summary = RateSummary {
            requests_per_minute: per_minute(MetricKind::Request),
            errors_per_minute: per_minute(MetricKind::Error),
            security_events_per_minute: per_minute(MetricKind::Security),
        };

        MetricsReport {
            timestamp: self.now,
            window_secs: window.as_secs(),
            metrics,
            summary,
        }
    }
}

fn error_rate_of(errors: usize, requests: usize) -> f64 {
    if requests == 0 {
        return 0.0;
    }
    errors as f64 / requests as f64
}

fn average_duration(requests: &[MetricEvent]) -> f64 {
    let durations: Vec<f64> = requests
        .iter()
        .filter_map(MetricEvent::as_request)
        .map(|r| r.duration)
        .collect();
    if durations.is_empty() {
        return 0.0;
    }
    durations.iter().sum::<f64>() / durations.len() as f64
}

/// Descending by count; equal counts keep first-seen order (stable sort).
fn rank_endpoints(requests: &[MetricEvent], limit: usize) -> Vec<EndpointCount> {
    let mut ranked: Vec<EndpointCount> = Vec::new();
    let mut positions: HashMap<&str, usize> = HashMap::new();

    for request in requests.iter().filter_map(MetricEvent::as_request) {
        match positions.get(request.endpoint.as_str()) {
            Some(&i) => ranked[i].count += 1,
            None => {
                positions.insert(&request.endpoint, ranked.len());
                ranked.push(EndpointCount {
                    endpoint: request.endpoint.clone(),
                    count: 1,
                });
            }
        }
    }

    ranked.sort_by(|a, b| b.count.cmp(&a.count));
    ranked.truncate(limit);
    ranked
}

fn last_n(mut events: Vec<MetricEvent>, n: usize) -> Vec<MetricEvent> {
    let skip = events.len().saturating_sub(n);
    events.drain(..skip);
    events
}
