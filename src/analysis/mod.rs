//! Query-side analysis of recorded metrics.
//!
//! # Data Flow
//! ```text
//! MetricStore
//!     → window.rs (trailing window bounds, window parameter parsing)
//!     → aggregate.rs (counts, rates, averages, top endpoints, reports)
//!     → alerts.rs (threshold rules over the alert window)
//! ```
//!
//! Everything here is computed on demand; no background work.

pub mod aggregate;
pub mod alerts;
pub mod window;

pub use aggregate::{Aggregator, DashboardSnapshot, EndpointCount, MetricsReport, RateSummary};
pub use alerts::{evaluate_alerts, evaluate_alerts_at, Alert, AlertKind, AlertReport, Severity};
pub use window::{parse_window, window_start, WindowError};
