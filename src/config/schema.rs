//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the monitor.
//! All types derive Serde traits for deserialization from config files.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root configuration for the monitoring service.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct MonitorConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Metric buffer retention.
    pub retention: RetentionConfig,

    /// Trailing windows used by the query surface.
    pub windows: WindowConfig,

    /// Alert thresholds.
    pub alerts: AlertConfig,

    /// Slow operation thresholds for timed application work.
    pub performance: PerformanceConfig,

    /// Rate limiting configuration.
    pub rate_limit: RateLimitConfig,

    /// Health check settings.
    pub health: HealthConfig,

    /// Request inspection and response hardening.
    pub security: SecurityConfig,

    /// Access control for the monitoring endpoints.
    pub auth: AuthConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Metric buffer retention.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct RetentionConfig {
    /// Maximum number of events kept per metric kind.
    pub capacity: usize,
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self { capacity: 1000 }
    }
}

/// Trailing windows, in seconds.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct WindowConfig {
    /// Window summarized by the dashboard.
    pub dashboard_secs: u64,

    /// Default window of the metrics endpoint.
    pub metrics_secs: u64,

    /// Window the alert evaluator looks at.
    pub alert_secs: u64,
}

impl WindowConfig {
    pub fn dashboard(&self) -> Duration {
        Duration::from_secs(self.dashboard_secs)
    }

    pub fn metrics(&self) -> Duration {
        Duration::from_secs(self.metrics_secs)
    }

    pub fn alert(&self) -> Duration {
        Duration::from_secs(self.alert_secs)
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            dashboard_secs: 24 * 60 * 60,
            metrics_secs: 60 * 60,
            alert_secs: 5 * 60,
        }
    }
}

/// Alert thresholds.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct AlertConfig {
    /// Error rate (errors / requests) above which `error_rate_high` fires.
    pub error_rate_threshold: f64,

    /// Request duration in seconds above which a request counts as slow.
    pub slow_request_secs: f64,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            error_rate_threshold: 0.10,
            slow_request_secs: 2.0,
        }
    }
}

/// Thresholds above which timed operations are logged as slow.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct PerformanceConfig {
    /// Any operation timed through the recorder, in seconds.
    pub slow_operation_secs: f64,

    /// Database operations, in seconds.
    pub slow_db_operation_secs: f64,
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self {
            slow_operation_secs: 5.0,
            slow_db_operation_secs: 1.0,
        }
    }
}

/// Rate limiting configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Enable rate limiting.
    pub enabled: bool,

    /// Requests allowed per client per window.
    pub limit: u32,

    /// Fixed window length in seconds.
    pub window_secs: u64,

    /// How often expired windows are dropped.
    pub purge_interval_secs: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            limit: 100,
            window_secs: 3600,
            purge_interval_secs: 300,
        }
    }
}

/// Health check configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct HealthConfig {
    /// Upper bound on any single check, in seconds.
    pub check_timeout_secs: u64,

    /// External dependencies probed on every run.
    pub probes: Vec<ProbeConfig>,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            check_timeout_secs: 3,
            probes: Vec::new(),
        }
    }
}

/// A dependency probe registered as a named health check.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ProbeConfig {
    /// Check name reported in health snapshots.
    pub name: String,

    /// Probe transport.
    pub kind: ProbeKind,

    /// `host:port` for TCP probes, a full URL for HTTP probes.
    pub target: String,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ProbeKind {
    Tcp,
    Http,
}

/// Security hardening configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct SecurityConfig {
    /// Enable security response headers.
    pub enable_headers: bool,

    /// Record security events for suspicious user agents and headers.
    pub inspect_requests: bool,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            enable_headers: true,
            inspect_requests: true,
        }
    }
}

/// Monitoring endpoint access control.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct AuthConfig {
    /// Bearer token required by the monitoring API. Open when unset.
    pub api_key: Option<String>,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Also write plain-text logs to this file when set.
    pub log_file: Option<String>,

    /// Enable Prometheus metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            log_file: None,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}
