//! Metric storage subsystem.
//!
//! # Data Flow
//! ```text
//! Request middleware / handlers
//!     → recorder.rs (shape payload, log)
//!     → buffer.rs (timestamp, append, evict oldest past capacity)
//!
//! Query surface
//!     → buffer.rs windowed() / snapshot()
//!     → analysis subsystem
//! ```
//!
//! # Design Decisions
//! - One mutex per kind, so request recording never contends with security events
//! - The store is constructed explicitly and shared through `Arc`
//! - Nothing survives a restart

pub mod buffer;
pub mod event;
pub mod recorder;

pub use buffer::{MetricCounts, MetricStore, DEFAULT_CAPACITY};
pub use event::{
    ActivityMetric, ErrorMetric, MetricEvent, MetricKind, MetricPayload, PerformanceMetric,
    RequestMetric, SecurityMetric,
};
pub use recorder::Recorder;
