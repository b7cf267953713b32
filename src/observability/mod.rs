//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (Prometheus counters, gauges, histograms)
//!
//! Consumers:
//!     → stdout (pretty or JSON)
//!     → Prometheus scrape endpoint (optional)
//! ```
//!
//! The in-memory store in `crate::store` is separate: it backs the JSON
//! dashboard, while this module feeds external collectors.

pub mod logging;
pub mod metrics;
