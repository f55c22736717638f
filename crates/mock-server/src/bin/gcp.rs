//! GCP Mock Server
//!
//! Serves the in-memory Secret Manager, Resource Manager, Cloud Run and Cloud Build
//! mock on one port so the tools can be run locally:
//!
//! ```bash
//! PORT=1234 gcp-mock-server &
//! export PACT_MODE=1
//! export GCP_SECRET_MANAGER_ENDPOINT=http://localhost:1234
//! export GCP_RESOURCE_MANAGER_ENDPOINT=http://localhost:1234
//! export GCP_CLOUD_RUN_ENDPOINT=http://localhost:1234
//! export GCP_CLOUD_BUILD_ENDPOINT=http://localhost:1234
//! opsctl --project-id local --action list-secrets
//! ```
//!
//! Environment Variables:
//! - PORT: Port to listen on (default: 1234)
//! - RUST_LOG: Log filter (default: gcp_mock_server=info,tower_http=info)

use anyhow::{Context, Result};
use gcp_mock_server::{router, SharedState};
use std::env;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::info;

const DEFAULT_PORT: u16 = 1234;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gcp_mock_server=info,tower_http=info".into()),
        )
        .with_target(false)
        .init();

    let port = match env::var("PORT") {
        Ok(port) => port
            .parse::<u16>()
            .with_context(|| format!("PORT must be a valid u16, got '{port}'"))?,
        Err(_) => DEFAULT_PORT,
    };

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    info!("Starting GCP Mock Server on {}", addr);
    info!("Point every GCP_*_ENDPOINT at http://localhost:{} with PACT_MODE=1", port);

    axum::serve(listener, router(SharedState::default()))
        .await
        .context("Mock server failed")?;
    Ok(())
}
