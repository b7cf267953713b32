//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::time::Duration;

use axum::{routing::get, Router};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use taskflow_monitor::config::MonitorConfig;
use taskflow_monitor::http::{ApiError, AppState, MonitorServer};
use taskflow_monitor::lifecycle::Shutdown;

/// A running server bound to an ephemeral port.
pub struct TestServer {
    pub addr: SocketAddr,
    pub state: AppState,
    shutdown: Shutdown,
    handle: JoinHandle<Result<(), std::io::Error>>,
}

#[allow(dead_code)]
impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Trigger shutdown and wait for the server to drain.
    pub async fn stop(self) -> Result<(), std::io::Error> {
        self.shutdown.trigger();
        tokio::time::timeout(Duration::from_secs(5), self.handle)
            .await
            .expect("server did not shut down")
            .expect("server task panicked")
    }
}

/// Routes standing in for the host application.
pub fn host_routes() -> Router {
    Router::new()
        .route("/ok", get(|| async { "ok" }))
        .route("/tasks/{id}", get(|| async { "task" }))
        .route(
            "/fail",
            get(|| async { Err::<(), _>(ApiError::Internal("task store unavailable".into())) }),
        )
        .route(
            "/panic",
            get(|| async {
                if true {
                    panic!("task handler exploded");
                }
                "unreachable"
            }),
        )
        .route(
            "/slow",
            get(|| async {
                tokio::time::sleep(Duration::from_millis(150)).await;
                "slow"
            }),
        )
        .route(
            "/hang",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(10)).await;
                "late"
            }),
        )
}

/// Start a server for [`host_routes`] with the given configuration.
pub async fn spawn_server(mut config: MonitorConfig) -> TestServer {
    config.listener.bind_address = "127.0.0.1:0".into();

    let listener = TcpListener::bind(&config.listener.bind_address).await.unwrap();
    let addr = listener.local_addr().unwrap();

    let server = MonitorServer::with_routes(config, host_routes());
    let state = server.state().clone();

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    let (_, config_updates) = mpsc::unbounded_channel();

    let handle = tokio::spawn(async move { server.run(listener, config_updates, server_shutdown).await });

    TestServer {
        addr,
        state,
        shutdown,
        handle,
    }
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
