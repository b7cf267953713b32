//! Prometheus exposition.
//!
//! # Metrics
//! - `monitor_requests_total` (counter): requests by method, status, endpoint
//! - `monitor_request_duration_seconds` (histogram): latency distribution
//! - `monitor_rate_limited_total` (counter): rejected requests
//! - `monitor_security_events_total` (counter): security events by type
//! - `monitor_health_check_status` (gauge): 1=healthy, 0=otherwise, per check
//!
//! Without an installed recorder every call is a no-op, so the in-memory
//! store works the same with or without the exporter.

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the global Prometheus recorder and its scrape listener.
///
/// Must be called from within a tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Prometheus exporter listening");
    Ok(())
}

pub fn record_request(method: &str, status: u16, endpoint: &str, start: Instant) {
    let labels = [
        ("method", method.to_string()),
        ("status", status.to_string()),
        ("endpoint", endpoint.to_string()),
    ];
    counter!("monitor_requests_total", &labels).increment(1);
    histogram!("monitor_request_duration_seconds", &labels).record(start.elapsed().as_secs_f64());
}

pub fn record_rate_limited(reason: &'static str) {
    counter!("monitor_rate_limited_total", "reason" => reason).increment(1);
}

pub fn record_security_event(event_type: &str) {
    counter!("monitor_security_events_total", "type" => event_type.to_string()).increment(1);
}

pub fn record_health_check(name: &str, healthy: bool) {
    gauge!("monitor_health_check_status", "check" => name.to_string())
        .set(if healthy { 1.0 } else { 0.0 });
}
