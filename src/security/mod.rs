//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → rate_limit.rs (per-client fixed window, 429 when exhausted)
//!     → inspect.rs (record suspicious user agents / proxy headers)
//!     → handler
//!     → headers.rs (hardening headers on the response)
//! ```
//!
//! Every rejection or suspicious finding is recorded as a security event in
//! the metric store, which feeds the `security_events` alert.

pub mod headers;
pub mod inspect;
pub mod rate_limit;

pub use rate_limit::{rate_limit_middleware, Decision, RateLimiterState};
