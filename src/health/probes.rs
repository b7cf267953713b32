//! Built-in dependency probes.
//!
//! The monitor already bounds every check with its own timeout; probes also
//! carry one so they stay safe when used on their own.

use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, Uri};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use tokio::net::TcpStream;
use tokio::time;

use crate::config::{ProbeConfig, ProbeKind};
use crate::health::check::{HealthCheck, HealthCheckError};

/// Healthy when a TCP connection to `addr` can be opened.
pub struct TcpProbe {
    addr: String,
    timeout: Duration,
}

impl TcpProbe {
    pub fn new(addr: impl Into<String>, timeout: Duration) -> Self {
        Self {
            addr: addr.into(),
            timeout,
        }
    }
}

#[async_trait]
impl HealthCheck for TcpProbe {
    async fn check(&self) -> Result<bool, HealthCheckError> {
        match time::timeout(self.timeout, TcpStream::connect(&self.addr)).await {
            Ok(Ok(_)) => Ok(true),
            Ok(Err(e)) => {
                tracing::warn!(addr = %self.addr, error = %e, "Health probe failed: connection error");
                Ok(false)
            }
            Err(_) => Err(HealthCheckError::TimedOut(self.timeout)),
        }
    }
}

/// Healthy when a GET to `uri` answers with a 2xx status.
pub struct HttpProbe {
    uri: Uri,
    timeout: Duration,
    client: Client<HttpConnector, Body>,
}

impl HttpProbe {
    pub fn new(uri: Uri, timeout: Duration) -> Self {
        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());
        Self { uri, timeout, client }
    }
}

#[async_trait]
impl HealthCheck for HttpProbe {
    async fn check(&self) -> Result<bool, HealthCheckError> {
        let request = Request::builder()
            .method("GET")
            .uri(self.uri.clone())
            .header("user-agent", "taskflow-monitor-health-check")
            .body(Body::empty())
            .map_err(|e| HealthCheckError::Failed(format!("invalid probe request: {}", e)))?;

        match time::timeout(self.timeout, self.client.request(request)).await {
            Ok(Ok(response)) => {
                let success = response.status().is_success();
                if !success {
                    tracing::warn!(uri = %self.uri, status = %response.status(), "Health probe failed: non-success status");
                }
                Ok(success)
            }
            Ok(Err(e)) => {
                tracing::warn!(uri = %self.uri, error = %e, "Health probe failed: connection error");
                Ok(false)
            }
            Err(_) => Err(HealthCheckError::TimedOut(self.timeout)),
        }
    }
}

/// Build the probe described by a config entry.
pub fn probe_from_config(
    config: &ProbeConfig,
    timeout: Duration,
) -> Result<Box<dyn HealthCheck>, HealthCheckError> {
    match config.kind {
        ProbeKind::Tcp => Ok(Box::new(TcpProbe::new(config.target.clone(), timeout))),
        ProbeKind::Http => {
            let uri: Uri = config
                .target
                .parse()
                .map_err(|e| HealthCheckError::Failed(format!("invalid probe URL '{}': {}", config.target, e)))?;
            Ok(Box::new(HttpProbe::new(uri, timeout)))
        }
    }
}
