//! Named health check registry with a cached snapshot.

use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::time;

use crate::health::check::{join_failure, FnCheck, HealthCheck, HealthCheckError};
use crate::observability::metrics;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    Healthy,
    Unhealthy,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OverallStatus {
    Healthy,
    Unhealthy,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthCheckResult {
    pub name: String,
    pub status: CheckStatus,
    #[serde(rename = "error", skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthSnapshot {
    #[serde(rename = "overall_status")]
    pub overall: OverallStatus,
    pub checks: BTreeMap<String, HealthCheckResult>,
    pub timestamp: DateTime<Utc>,
}

type Registry = Vec<(String, Arc<dyn HealthCheck>)>;

/// Runs registered checks and caches the last result.
///
/// Each check runs in its own task under `check_timeout`, so a check that
/// hangs, errors or panics only affects its own result.
pub struct HealthMonitor {
    checks: RwLock<Registry>,
    last: tokio::sync::Mutex<Option<HealthSnapshot>>,
    check_timeout: Duration,
}

impl HealthMonitor {
    pub fn new(check_timeout: Duration) -> Self {
        Self {
            checks: RwLock::new(Vec::new()),
            last: tokio::sync::Mutex::new(None),
            check_timeout,
        }
    }

    /// Register a check. A second registration under the same name replaces
    /// the first in place.
    pub fn register(&self, name: impl Into<String>, check: impl HealthCheck + 'static) {
        self.register_arc(name, Arc::new(check));
    }

    pub fn register_arc(&self, name: impl Into<String>, check: Arc<dyn HealthCheck>) {
        let name = name.into();
        let mut checks = self.checks.write().unwrap_or_else(PoisonError::into_inner);
        match checks.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = check,
            None => checks.push((name, check)),
        }
    }

    /// Register a synchronous closure.
    pub fn register_fn<F, E>(&self, name: impl Into<String>, f: F)
    where
        F: Fn() -> Result<bool, E> + Send + Sync + 'static,
        E: std::fmt::Display + 'static,
    {
        self.register(name, FnCheck::new(f));
    }

    pub fn check_names(&self) -> Vec<String> {
        self.checks
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(n, _)| n.clone())
            .collect()
    }

    /// Run every check and replace the cached snapshot.
    pub async fn run_all(&self) -> HealthSnapshot {
        let snapshot = self.evaluate().await;
        *self.last.lock().await = Some(snapshot.clone());
        snapshot
    }

    /// The cached snapshot, running the checks on first use.
    ///
    /// Concurrent first callers wait on the same run.
    pub async fn current(&self) -> HealthSnapshot {
        let mut last = self.last.lock().await;
        if let Some(snapshot) = last.as_ref() {
            return snapshot.clone();
        }
        let snapshot = self.evaluate().await;
        *last = Some(snapshot.clone());
        snapshot
    }

    async fn evaluate(&self) -> HealthSnapshot {
        let checks: Registry = self
            .checks
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();

        let handles: Vec<_> = checks
            .into_iter()
            .map(|(name, check)| {
                let timeout = self.check_timeout;
                let handle = tokio::spawn(async move { time::timeout(timeout, check.check()).await });
                (name, handle)
            })
            .collect();

        let mut results = BTreeMap::new();
        let mut overall = OverallStatus::Healthy;

        for (name, handle) in handles {
            let outcome = match handle.await {
                Ok(Ok(verdict)) => verdict,
                Ok(Err(_)) => Err(HealthCheckError::TimedOut(self.check_timeout)),
                Err(e) => Err(join_failure(e)),
            };

            let (status, detail) = match outcome {
                Ok(true) => (CheckStatus::Healthy, None),
                Ok(false) => {
                    tracing::error!(check = %name, "Health check failed");
                    (CheckStatus::Unhealthy, None)
                }
                Err(e) => {
                    tracing::error!(check = %name, error = %e, "Health check error");
                    (CheckStatus::Error, Some(e.to_string()))
                }
            };

            if status != CheckStatus::Healthy {
                overall = OverallStatus::Unhealthy;
            }
            metrics::record_health_check(&name, status == CheckStatus::Healthy);

            results.insert(
                name.clone(),
                HealthCheckResult {
                    name,
                    status,
                    detail,
                    timestamp: Utc::now(),
                },
            );
        }

        HealthSnapshot {
            overall,
            checks: results,
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Hangs;

    #[async_trait]
    impl HealthCheck for Hangs {
        async fn check(&self) -> Result<bool, HealthCheckError> {
            time::sleep(Duration::from_secs(30)).await;
            Ok(true)
        }
    }

    #[tokio::test]
    async fn test_failing_check_marks_overall_unhealthy() {
        let monitor = HealthMonitor::new(Duration::from_secs(1));
        monitor.register_fn("database", || Ok::<_, String>(true));
        monitor.register_fn("redis", || Err::<bool, _>("connection refused"));

        let snapshot = monitor.run_all().await;
        assert_eq!(snapshot.overall, OverallStatus::Unhealthy);
        assert_eq!(snapshot.checks["database"].status, CheckStatus::Healthy);
        assert_eq!(snapshot.checks["redis"].status, CheckStatus::Error);
        assert_eq!(snapshot.checks["redis"].detail.as_deref(), Some("connection refused"));
    }

    #[tokio::test]
    async fn test_false_is_unhealthy_not_error() {
        let monitor = HealthMonitor::new(Duration::from_secs(1));
        monitor.register_fn("disk", || Ok::<_, String>(false));

        let snapshot = monitor.run_all().await;
        assert_eq!(snapshot.overall, OverallStatus::Unhealthy);
        assert_eq!(snapshot.checks["disk"].status, CheckStatus::Unhealthy);
        assert!(snapshot.checks["disk"].detail.is_none());
    }

    #[tokio::test]
    async fn test_all_healthy() {
        let monitor = HealthMonitor::new(Duration::from_secs(1));
        monitor.register_fn("a", || Ok::<_, String>(true));
        monitor.register_fn("b", || Ok::<_, String>(true));

        assert_eq!(monitor.run_all().await.overall, OverallStatus::Healthy);
    }

    #[tokio::test]
    async fn test_no_checks_is_healthy() {
        let monitor = HealthMonitor::new(Duration::from_secs(1));
        let snapshot = monitor.current().await;
        assert_eq!(snapshot.overall, OverallStatus::Healthy);
        assert!(snapshot.checks.is_empty());
    }

    #[tokio::test]
    async fn test_panicking_check_is_isolated() {
        let monitor = HealthMonitor::new(Duration::from_secs(1));
        monitor.register_fn("explodes", || -> Result<bool, String> { panic!("kaboom") });
        monitor.register_fn("fine", || Ok::<_, String>(true));

        let snapshot = monitor.run_all().await;
        assert_eq!(snapshot.checks["explodes"].status, CheckStatus::Error);
        assert_eq!(snapshot.checks["explodes"].detail.as_deref(), Some("check panicked: kaboom"));
        assert_eq!(snapshot.checks["fine"].status, CheckStatus::Healthy);
    }

    #[tokio::test]
    async fn test_hanging_check_times_out() {
        let monitor = HealthMonitor::new(Duration::from_millis(50));
        monitor.register("slow", Hangs);

        let snapshot = monitor.run_all().await;
        assert_eq!(snapshot.checks["slow"].status, CheckStatus::Error);
        assert!(snapshot.checks["slow"].detail.as_deref().unwrap().starts_with("timed out"));
    }

    #[tokio::test]
    async fn test_blocking_closure_is_bounded_by_timeout() {
        let monitor = HealthMonitor::new(Duration::from_millis(100));
        monitor.register_fn("database", || {
            std::thread::sleep(Duration::from_secs(1));
            Ok::<_, String>(true)
        });
        monitor.register_fn("cache", || Ok::<_, String>(true));

        let started = std::time::Instant::now();
        let snapshot = monitor.run_all().await;

        assert!(started.elapsed() < Duration::from_millis(800));
        assert_eq!(snapshot.checks["database"].status, CheckStatus::Error);
        assert_eq!(
            snapshot.checks["database"].detail.as_deref(),
            Some("timed out after 100ms")
        );
        assert_eq!(snapshot.checks["cache"].status, CheckStatus::Healthy);
    }

    #[tokio::test]
    async fn test_concurrent_first_reads_run_checks_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let monitor = HealthMonitor::new(Duration::from_secs(1));
        monitor.register_fn("counted", move || {
            counter.fetch_add(1, Ordering::SeqCst);
            std::thread::sleep(Duration::from_millis(50));
            Ok::<_, String>(true)
        });

        let (a, b) = tokio::join!(monitor.current(), monitor.current());
        assert_eq!(a, b);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_current_is_cached_until_rerun() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let monitor = HealthMonitor::new(Duration::from_secs(1));
        monitor.register_fn("counted", move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok::<_, String>(true)
        });

        monitor.current().await;
        monitor.current().await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        monitor.run_all().await;
        monitor.current().await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_duplicate_name_overwrites() {
        let monitor = HealthMonitor::new(Duration::from_secs(1));
        monitor.register_fn("database", || Ok::<_, String>(false));
        monitor.register_fn("cache", || Ok::<_, String>(true));
        monitor.register_fn("database", || Ok::<_, String>(true));

        assert_eq!(monitor.check_names(), vec!["database", "cache"]);
        assert_eq!(monitor.run_all().await.overall, OverallStatus::Healthy);
    }

    #[tokio::test]
    async fn test_snapshot_serialization() {
        let monitor = HealthMonitor::new(Duration::from_secs(1));
        monitor.register_fn("redis", || Err::<bool, _>("refused"));

        let json = serde_json::to_value(monitor.run_all().await).unwrap();
        assert_eq!(json["overall_status"], "unhealthy");
        assert_eq!(json["checks"]["redis"]["status"], "error");
        assert_eq!(json["checks"]["redis"]["error"], "refused");
    }
}
