//! TaskFlow monitor
//!
//! Serves the monitoring API for a running process.
//!
//! # Architecture Overview
//!
//! ```text
//!   request ─▶ trace ─▶ request id ─▶ security headers ─▶ record_requests
//!                                                             │
//!                              rate limit ◀───────────────────┘
//!                                  │
//!                              inspection ─▶ catch panic ─▶ timeout ─▶ handler
//!
//!   record_requests ─▶ Recorder ─▶ MetricStore (five bounded buffers)
//!                                       │
//!                      Aggregator / evaluate_alerts ─▶ /monitoring/*
//!
//!   HealthMonitor ─▶ probes (tcp, http) ─▶ /monitoring/health
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use taskflow_monitor::config::{default_config, load_config, ConfigWatcher};
use taskflow_monitor::lifecycle::{wait_for_signal, Shutdown};
use taskflow_monitor::observability::{logging, metrics};
use taskflow_monitor::MonitorServer;

#[derive(Parser)]
#[command(name = "taskflow-monitor", version)]
#[command(about = "Request monitoring, alerting and health checks", long_about = None)]
struct Cli {
    /// TOML configuration file. Watched for changes when given.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => default_config()?,
    };

    let _log_guard = logging::init_logging(&config.observability)?;

    tracing::info!("taskflow-monitor v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        capacity = config.retention.capacity,
        request_timeout_secs = config.timeouts.request_secs,
        rate_limit = config.rate_limit.enabled,
        auth = config.auth.api_key.is_some(),
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => {
                if let Err(e) = metrics::init_metrics(addr) {
                    tracing::error!(error = %e, "Failed to start Prometheus exporter");
                }
            }
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    // The watcher must outlive the server.
    let (_watcher, config_updates) = match &cli.config {
        Some(path) => {
            let (watcher, updates) = ConfigWatcher::new(path);
            (Some(watcher.run()?), updates)
        }
        None => {
            let (_, updates) = mpsc::unbounded_channel();
            (None, updates)
        }
    };

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        wait_for_signal().await;
        shutdown.trigger();
    });

    let server = MonitorServer::new(config);
    server.run(listener, config_updates, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
