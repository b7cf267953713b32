//! The health check capability.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::task::JoinError;

/// Why a check could not produce a verdict.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HealthCheckError {
    #[error("{0}")]
    Failed(String),

    #[error("timed out after {0:?}")]
    TimedOut(Duration),

    #[error("check panicked: {0}")]
    Panicked(String),
}

/// Anything that reports a dependency as up (`Ok(true)`), down
/// (`Ok(false)`), or fails trying to find out.
#[async_trait]
pub trait HealthCheck: Send + Sync {
    async fn check(&self) -> Result<bool, HealthCheckError>;
}

/// Adapts a synchronous closure into a [`HealthCheck`].
///
/// The closure runs on the blocking pool, so a check stuck in blocking I/O
/// is abandoned at the monitor's timeout instead of stalling the runtime.
pub struct FnCheck<F> {
    f: Arc<F>,
}

impl<F> FnCheck<F> {
    pub fn new(f: F) -> Self {
        Self { f: Arc::new(f) }
    }
}

#[async_trait]
impl<F, E> HealthCheck for FnCheck<F>
where
    F: Fn() -> Result<bool, E> + Send + Sync + 'static,
    E: std::fmt::Display + 'static,
{
    async fn check(&self) -> Result<bool, HealthCheckError> {
        let f = Arc::clone(&self.f);
        tokio::task::spawn_blocking(move || f().map_err(|e| HealthCheckError::Failed(e.to_string())))
            .await
            .map_err(join_failure)?
    }
}

/// Turn a failed check task into the error reported for it.
pub(crate) fn join_failure(e: JoinError) -> HealthCheckError {
    if e.is_panic() {
        let payload = e.into_panic();
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic".to_string());
        HealthCheckError::Panicked(message)
    } else {
        HealthCheckError::Failed("check was cancelled".to_string())
    }
}
