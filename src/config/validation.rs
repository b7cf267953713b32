//! Configuration validation.
//!
//! serde handles syntax; this module checks value ranges and cross-field
//! consistency. Every problem is reported, not just the first.

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::{MonitorConfig, ProbeKind};

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{field}: {reason}")]
pub struct ValidationError {
    pub field: String,
    pub reason: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Validate a parsed configuration.
pub fn validate_config(config: &MonitorConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("'{}' is not a socket address", config.listener.bind_address),
        ));
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::new("timeouts.request_secs", "must be greater than 0"));
    }

    if config.retention.capacity == 0 {
        errors.push(ValidationError::new("retention.capacity", "must be greater than 0"));
    }

    for (field, secs) in [
        ("windows.dashboard_secs", config.windows.dashboard_secs),
        ("windows.metrics_secs", config.windows.metrics_secs),
        ("windows.alert_secs", config.windows.alert_secs),
    ] {
        if secs == 0 {
            errors.push(ValidationError::new(field, "must be greater than 0"));
        }
    }

    let threshold = config.alerts.error_rate_threshold;
    if !(0.0..=1.0).contains(&threshold) {
        errors.push(ValidationError::new(
            "alerts.error_rate_threshold",
            format!("{} is outside 0.0..=1.0", threshold),
        ));
    }
    let slow = config.alerts.slow_request_secs;
    if slow.is_nan() || slow <= 0.0 {
        errors.push(ValidationError::new("alerts.slow_request_secs", "must be greater than 0"));
    }

    for (field, secs) in [
        ("performance.slow_operation_secs", config.performance.slow_operation_secs),
        ("performance.slow_db_operation_secs", config.performance.slow_db_operation_secs),
    ] {
        if secs.is_nan() || secs <= 0.0 {
            errors.push(ValidationError::new(field, "must be greater than 0"));
        }
    }

    if config.rate_limit.enabled {
        if config.rate_limit.limit == 0 {
            errors.push(ValidationError::new("rate_limit.limit", "must be greater than 0"));
        }
        if config.rate_limit.window_secs == 0 {
            errors.push(ValidationError::new("rate_limit.window_secs", "must be greater than 0"));
        }
        if config.rate_limit.purge_interval_secs == 0 {
            errors.push(ValidationError::new("rate_limit.purge_interval_secs", "must be greater than 0"));
        }
    }

    if config.health.check_timeout_secs == 0 {
        errors.push(ValidationError::new("health.check_timeout_secs", "must be greater than 0"));
    }

    let mut seen = std::collections::HashSet::new();
    for (i, probe) in config.health.probes.iter().enumerate() {
        let field = format!("health.probes[{}]", i);
        if probe.name.trim().is_empty() {
            errors.push(ValidationError::new(&field, "name is empty"));
        } else if !seen.insert(probe.name.as_str()) {
            errors.push(ValidationError::new(&field, format!("duplicate probe name '{}'", probe.name)));
        }
        match probe.kind {
            ProbeKind::Tcp if !probe.target.contains(':') => {
                errors.push(ValidationError::new(&field, "tcp target must be host:port"));
            }
            ProbeKind::Http if probe.target.parse::<axum::http::Uri>().is_err() => {
                errors.push(ValidationError::new(&field, format!("'{}' is not a valid URL", probe.target)));
            }
            _ => {}
        }
    }

    if let Some(key) = &config.auth.api_key {
        if key.trim().is_empty() {
            errors.push(ValidationError::new("auth.api_key", "must not be blank when set"));
        }
    }

    if let Some(path) = &config.observability.log_file {
        if path.trim().is_empty() {
            errors.push(ValidationError::new("observability.log_file", "must not be blank when set"));
        }
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("'{}' is not a socket address", config.observability.metrics_address),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
