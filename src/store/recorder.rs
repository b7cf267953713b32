//! Typed recording helpers.
//!
//! Each `record_*` call shapes a payload, appends it to the store and emits a
//! structured log line. Recording is fire-and-forget and never fails.

use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use serde_json::Value;

use crate::config::PerformanceConfig;
use crate::store::buffer::MetricStore;
use crate::store::event::{
    ActivityMetric, ErrorMetric, PerformanceMetric, RequestMetric, SecurityMetric,
};

/// Cheap, cloneable handle used by middleware and handlers to record events.
#[derive(Debug, Clone)]
pub struct Recorder {
    store: Arc<MetricStore>,
    thresholds: PerformanceConfig,
}

impl Recorder {
    pub fn new(store: Arc<MetricStore>) -> Self {
        Self::with_thresholds(store, PerformanceConfig::default())
    }

    /// Use custom slow-operation thresholds instead of the defaults.
    pub fn with_thresholds(store: Arc<MetricStore>, thresholds: PerformanceConfig) -> Self {
        Self { store, thresholds }
    }

    pub fn store(&self) -> &Arc<MetricStore> {
        &self.store
    }

    /// Record a completed request. `duration` is in seconds.
    pub fn record_request(&self, endpoint: &str, method: &str, status_code: u16, duration: f64) {
        tracing::debug!(endpoint, method, status_code, duration, "Request recorded");
        self.store.append(RequestMetric {
            endpoint: endpoint.to_string(),
            method: method.to_string(),
            status_code,
            duration,
        });
    }

    pub fn record_error(&self, error_type: &str, message: &str, endpoint: Option<&str>) {
        tracing::error!(error_type, message, endpoint = endpoint.unwrap_or("unknown"), "Application error");
        self.store.append(ErrorMetric {
            error_type: error_type.to_string(),
            message: message.to_string(),
            endpoint: endpoint.map(str::to_string),
        });
    }

    pub fn record_security_event(&self, event_type: &str, details: Value) {
        tracing::warn!(event_type, details = %details, "Security event");
        crate::observability::metrics::record_security_event(event_type);
        self.store.append(SecurityMetric {
            event_type: event_type.to_string(),
            details,
        });
    }

    pub fn record_performance_metric(&self, name: &str, value: f64) {
        tracing::debug!(name, value, "Performance metric recorded");
        self.store.append(PerformanceMetric {
            name: name.to_string(),
            value,
        });
    }

    /// Run `fut`, record how long it took under `name` and pass its result through.
    ///
    /// Failures are logged at ERROR and still timed. Operations slower than
    /// `performance.slow_operation_secs` are logged at WARN.
    pub async fn time_operation<T, E, F>(&self, name: &str, fut: F) -> Result<T, E>
    where
        F: Future<Output = Result<T, E>>,
        E: Display,
    {
        let start = Instant::now();
        let result = fut.await;
        let duration = start.elapsed().as_secs_f64();

        self.record_performance_metric(name, duration);
        match &result {
            Ok(_) => tracing::info!(operation = name, duration, "Operation completed"),
            Err(e) => tracing::error!(operation = name, duration, error = %e, "Operation failed"),
        }
        if is_slow(duration, self.thresholds.slow_operation_secs) {
            tracing::warn!(
                operation = name,
                duration,
                threshold = self.thresholds.slow_operation_secs,
                "Slow operation detected"
            );
        }
        result
    }

    /// Log a database operation and, when timed, record it as `db.{collection}.{operation}`.
    pub fn record_db_operation(
        &self,
        operation: &str,
        collection: &str,
        duration: Option<f64>,
        success: bool,
    ) {
        let Some(duration) = duration else {
            tracing::info!(operation, collection, success, "Database operation");
            return;
        };

        self.record_performance_metric(&format!("db.{}.{}", collection, operation), duration);
        if is_slow(duration, self.thresholds.slow_db_operation_secs) {
            tracing::warn!(operation, collection, success, duration, "Slow database operation");
        } else {
            tracing::info!(operation, collection, success, duration, "Database operation");
        }
    }

    pub fn record_user_activity(&self, user_id: &str, action: &str, details: Option<Value>) {
        tracing::info!(user_id, action, "User activity");
        self.store.append(ActivityMetric {
            user_id: user_id.to_string(),
            action: action.to_string(),
            details,
        });
    }
}

fn is_slow(duration: f64, threshold: f64) -> bool {
    duration > threshold
}
