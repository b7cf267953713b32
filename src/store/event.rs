//! Metric event types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The buffer an event belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MetricKind {
    #[serde(rename = "requests")]
    Request,
    #[serde(rename = "errors")]
    Error,
    #[serde(rename = "security_events")]
    Security,
    #[serde(rename = "performance")]
    Performance,
    #[serde(rename = "user_activity")]
    Activity,
}

impl MetricKind {
    pub const ALL: [MetricKind; 5] = [
        MetricKind::Request,
        MetricKind::Error,
        MetricKind::Security,
        MetricKind::Performance,
        MetricKind::Activity,
    ];

    /// Name used on the wire and in logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricKind::Request => "requests",
            MetricKind::Error => "errors",
            MetricKind::Security => "security_events",
            MetricKind::Performance => "performance",
            MetricKind::Activity => "user_activity",
        }
    }

    pub(crate) fn index(&self) -> usize {
        match self {
            MetricKind::Request => 0,
            MetricKind::Error => 1,
            MetricKind::Security => 2,
            MetricKind::Performance => 3,
            MetricKind::Activity => 4,
        }
    }
}

impl std::fmt::Display for MetricKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A completed request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestMetric {
    pub endpoint: String,
    pub method: String,
    pub status_code: u16,
    /// Seconds.
    pub duration: f64,
}

/// A failure observed while serving a request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorMetric {
    #[serde(rename = "type")]
    pub error_type: String,
    pub message: String,
    pub endpoint: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecurityMetric {
    #[serde(rename = "type")]
    pub event_type: String,
    pub details: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetric {
    pub name: String,
    pub value: f64,
}

/// Audit trail entry for something a user did.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityMetric {
    pub user_id: String,
    pub action: String,
    pub details: Option<Value>,
}

/// Event body. The variant decides which buffer the event lands in.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MetricPayload {
    Request(RequestMetric),
    Error(ErrorMetric),
    Security(SecurityMetric),
    Performance(PerformanceMetric),
    Activity(ActivityMetric),
}

impl MetricPayload {
    pub fn kind(&self) -> MetricKind {
        match self {
            MetricPayload::Request(_) => MetricKind::Request,
            MetricPayload::Error(_) => MetricKind::Error,
            MetricPayload::Security(_) => MetricKind::Security,
            MetricPayload::Performance(_) => MetricKind::Performance,
            MetricPayload::Activity(_) => MetricKind::Activity,
        }
    }
}

impl From<RequestMetric> for MetricPayload {
    fn from(m: RequestMetric) -> Self {
        MetricPayload::Request(m)
    }
}

impl From<ErrorMetric> for MetricPayload {
    fn from(m: ErrorMetric) -> Self {
        MetricPayload::Error(m)
    }
}

impl From<SecurityMetric> for MetricPayload {
    fn from(m: SecurityMetric) -> Self {
        MetricPayload::Security(m)
    }
}

impl From<PerformanceMetric> for MetricPayload {
    fn from(m: PerformanceMetric) -> Self {
        MetricPayload::Performance(m)
    }
}

impl From<ActivityMetric> for MetricPayload {
    fn from(m: ActivityMetric) -> Self {
        MetricPayload::Activity(m)
    }
}

/// An immutable, timestamped entry in a metric buffer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricEvent {
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "type")]
    pub kind: MetricKind,
    #[serde(rename = "data")]
    pub payload: MetricPayload,
}

impl MetricEvent {
    pub fn new(payload: MetricPayload, timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            kind: payload.kind(),
            payload,
        }
    }

    pub fn as_request(&self) -> Option<&RequestMetric> {
        match &self.payload {
            MetricPayload::Request(r) => Some(r),
            _ => None,
        }
    }
}
