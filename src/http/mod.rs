//! HTTP serving subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, layer stack, graceful shutdown)
//!     → request.rs (x-request-id assigned and propagated)
//!     → middleware.rs (time the request, record request and error events)
//!     → security layers (rate limit, inspection)
//!     → host routes or the monitoring API
//!     → error.rs (ApiError / panic → JSON response carrying ErrorDetail)
//! ```

pub mod error;
pub mod middleware;
pub mod request;
pub mod server;

pub use error::{ApiError, ErrorDetail};
pub use request::{UuidRequestId, X_REQUEST_ID};
pub use server::{AppState, MonitorServer};
