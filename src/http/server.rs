//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Build the shared [`AppState`] (store, recorder, health monitor, live config)
//! - Mount the monitoring API next to the host application's routes
//! - Wire up middleware (tracing, request ID, security, recording, limits)
//! - Serve with graceful shutdown and apply configuration reloads

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use axum::{middleware, Router};
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tower_http::{
    catch_panic::CatchPanicLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::{restart_required, MonitorConfig};
use crate::health::{probe_from_config, HealthMonitor};
use crate::http::error::panic_response;
use crate::http::middleware::record_requests;
use crate::http::request::UuidRequestId;
use crate::monitoring;
use crate::security::{headers, inspect::inspect_request, rate_limit_middleware, RateLimiterState};
use crate::store::{MetricStore, Recorder};

/// Application state injected into handlers and middleware.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<MetricStore>,
    pub recorder: Recorder,
    pub health: Arc<HealthMonitor>,
    pub config: Arc<ArcSwap<MonitorConfig>>,
}

impl AppState {
    pub fn new(config: MonitorConfig) -> Self {
        let store = Arc::new(MetricStore::new(config.retention.capacity));
        let recorder = Recorder::with_thresholds(store.clone(), config.performance);
        let health = Arc::new(HealthMonitor::new(Duration::from_secs(
            config.health.check_timeout_secs,
        )));

        Self {
            store,
            recorder,
            health,
            config: Arc::new(ArcSwap::from_pointee(config)),
        }
    }
}

/// HTTP server hosting an application together with its monitoring API.
pub struct MonitorServer {
    router: Router,
    state: AppState,
    limiter: Option<Arc<RateLimiterState>>,
}

impl MonitorServer {
    /// A server exposing only the monitoring API.
    pub fn new(config: MonitorConfig) -> Self {
        Self::with_routes(config, Router::new())
    }

    /// A server for `host`, instrumented and extended with the monitoring API.
    pub fn with_routes(config: MonitorConfig, host: Router) -> Self {
        let state = AppState::new(config.clone());
        register_probes(&state.health, &config);

        let limiter = config
            .rate_limit
            .enabled
            .then(|| Arc::new(RateLimiterState::new(&config.rate_limit, state.recorder.clone())));

        let router = Self::build_router(&config, state.clone(), host, limiter.clone());
        Self {
            router,
            state,
            limiter,
        }
    }

    /// Build the Axum router with all middleware layers.
    ///
    /// Outermost first: trace, request id, security headers, recording,
    /// rate limit, inspection, panic catching, timeout.
    #[allow(deprecated)]
    fn build_router(
        config: &MonitorConfig,
        state: AppState,
        host: Router,
        limiter: Option<Arc<RateLimiterState>>,
    ) -> Router {
        let mut router = host
            .merge(monitoring::router(state.clone()))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(CatchPanicLayer::custom(panic_response));

        if config.security.inspect_requests {
            router = router.layer(middleware::from_fn_with_state(
                state.recorder.clone(),
                inspect_request,
            ));
        }

        if let Some(limiter) = limiter {
            router = router.layer(middleware::from_fn_with_state(limiter, rate_limit_middleware));
        }

        router = router.layer(middleware::from_fn_with_state(state, record_requests));

        if config.security.enable_headers {
            router = headers::apply(router);
        }

        router
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(SetRequestIdLayer::x_request_id(UuidRequestId))
            .layer(TraceLayer::new_for_http())
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Run the server, accepting connections on the given listener until
    /// `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut config_updates: mpsc::UnboundedReceiver<MonitorConfig>,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        if let Some(limiter) = self.limiter.clone() {
            let interval = Duration::from_secs(
                self.state.config.load().rate_limit.purge_interval_secs,
            );
            tokio::spawn(limiter.run_purge(interval, shutdown.resubscribe()));
        }

        let state = self.state.clone();
        let mut reload_shutdown = shutdown.resubscribe();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    update = config_updates.recv() => match update {
                        Some(new_config) => apply_config(&state, new_config),
                        None => break,
                    },
                    _ = reload_shutdown.recv() => break,
                }
            }
        });

        let app = self
            .router
            .into_make_service_with_connect_info::<SocketAddr>();

        let mut server_shutdown = shutdown;
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = server_shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Swap in a reloaded configuration.
///
/// Windows, alert thresholds and the API key apply to the next request.
/// Sections wired into the router at startup only take effect on restart.
pub fn apply_config(state: &AppState, new_config: MonitorConfig) {
    let current = state.config.load_full();
    let pending = restart_required(&current, &new_config);
    if !pending.is_empty() {
        tracing::warn!(sections = ?pending, "Configuration changes require a restart to take effect");
    }
    state.config.store(Arc::new(new_config));
    tracing::info!("Configuration reloaded");
}

fn register_probes(monitor: &HealthMonitor, config: &MonitorConfig) {
    let timeout = Duration::from_secs(config.health.check_timeout_secs);
    for probe in &config.health.probes {
        match probe_from_config(probe, timeout) {
            Ok(check) => monitor.register_arc(probe.name.clone(), Arc::from(check)),
            Err(e) => tracing::error!(probe = %probe.name, error = %e, "Skipping invalid health probe"),
        }
    }
}
