//! Health checking subsystem.
//!
//! # Data Flow
//! ```text
//! Registration (startup):
//!     config [[health.probes]] → probes.rs (TcpProbe / HttpProbe)
//!     host code → HealthMonitor::register / register_fn
//!
//! Evaluation (on demand):
//!     run_all() → one task per check, each under check_timeout
//!     → fold into HealthSnapshot (any non-healthy check → unhealthy)
//!     → cache until the next run_all()
//! ```
//!
//! # Design Decisions
//! - Checks are isolated: errors, panics and hangs stay in their own result
//! - No background polling; callers decide when to refresh

pub mod check;
pub mod monitor;
pub mod probes;

pub use check::{FnCheck, HealthCheck, HealthCheckError};
pub use monitor::{CheckStatus, HealthCheckResult, HealthMonitor, HealthSnapshot, OverallStatus};
pub use probes::{probe_from_config, HttpProbe, TcpProbe};
