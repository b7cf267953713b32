//! Embeddable request monitoring for axum services.

pub mod analysis;
pub mod config;
pub mod health;
pub mod http;
pub mod lifecycle;
pub mod monitoring;
pub mod observability;
pub mod security;
pub mod store;

pub use config::MonitorConfig;
pub use http::{AppState, MonitorServer};
pub use lifecycle::Shutdown;
pub use store::{MetricStore, Recorder};
