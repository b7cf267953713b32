//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse, deserialize, apply env overrides)
//!     → validation.rs (semantic checks)
//!     → MonitorConfig (validated, immutable)
//!     → shared via Arc<ArcSwap<MonitorConfig>> in the server state
//!
//! On file change:
//!     watcher.rs detects change
//!     → loader.rs loads new config
//!     → validation.rs validates
//!     → atomic swap of the live config
//!     → windows, alert thresholds and the API key apply immediately
//! ```
//!
//! # Design Decisions
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use schema::{
    AlertConfig, AuthConfig, HealthConfig, ListenerConfig, LogFormat, MonitorConfig,
    ObservabilityConfig, PerformanceConfig, ProbeConfig, ProbeKind, RateLimitConfig, RetentionConfig,
    SecurityConfig, TimeoutConfig, WindowConfig,
};
pub use loader::{default_config, load_config, ConfigError};
pub use validation::{validate_config, ValidationError};
pub use watcher::{restart_required, ConfigWatcher};
