//! # Metronome Status API
//!
//! Read-only HTTP reporting for the scheduling engine: a single JSON dump of
//! the registry snapshot. Serving only calls
//! [`JobRegistry::snapshot`](metronome_engine::JobRegistry::snapshot) and
//! never mutates engine state.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::info;

use metronome_engine::{JobRegistry, JobReport};

/// Status server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for StatusConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl StatusConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

/// GET / - snapshot of every registered job.
async fn list_jobs(State(registry): State<Arc<JobRegistry>>) -> Json<Vec<JobReport>> {
    Json(registry.snapshot())
}

/// Router serving the status snapshot at `/`.
pub fn router(registry: Arc<JobRegistry>) -> Router {
    Router::new().route("/", get(list_jobs)).with_state(registry)
}

/// The status server.
pub struct StatusServer {
    config: StatusConfig,
    registry: Arc<JobRegistry>,
}

impl StatusServer {
    pub fn new(config: StatusConfig, registry: Arc<JobRegistry>) -> Self {
        Self { config, registry }
    }

    /// The server address.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.config.host, self.config.port)
    }

    /// Serve until the cancellation channel flips.
    pub async fn run(
        &self,
        mut cancel: watch::Receiver<bool>,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let app = router(Arc::clone(&self.registry));

        let addr: SocketAddr = self.addr().parse()?;
        let listener = TcpListener::bind(addr).await?;

        info!("status server listening on {}", addr);
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = cancel.changed().await;
            })
            .await?;

        Ok(())
    }
}
