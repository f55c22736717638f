//! # GCP Authentication
//!
//! Bearer tokens for the REST clients. The source is chosen once at startup:
//!
//! 1. Pact mode: a fixed dummy token, no network access
//! 2. `GCP_ACCESS_TOKEN`: a token minted elsewhere (`gcloud auth print-access-token`)
//! 3. The GCE metadata server (Cloud Run, GCE, GKE Workload Identity)

use crate::config::ToolConfig;
use crate::constants::{METADATA_TOKEN_PATH, TOKEN_EXPIRY_SKEW_SECS};
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, info};

const METADATA_FLAVOR: &str = "Metadata-Flavor";
const METADATA_FLAVOR_VALUE: &str = "Google";

/// Source of OAuth2 access tokens
#[async_trait]
pub trait TokenSource: Send + Sync + std::fmt::Debug {
    /// Return a token valid for at least the next request
    async fn access_token(&self) -> Result<String>;
}

/// Dummy token for Pact testing
#[derive(Debug)]
pub struct MockTokenSource;

#[async_trait]
impl TokenSource for MockTokenSource {
    async fn access_token(&self) -> Result<String> {
        Ok("test-token".to_string())
    }
}

/// Token supplied through the environment
pub struct StaticTokenSource {
    token: String,
}

impl std::fmt::Debug for StaticTokenSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticTokenSource").finish_non_exhaustive()
    }
}

impl StaticTokenSource {
    pub fn new(token: String) -> Self {
        Self {
            token: token.trim().to_string(),
        }
    }
}

#[async_trait]
impl TokenSource for StaticTokenSource {
    async fn access_token(&self) -> Result<String> {
        Ok(self.token.clone())
    }
}

#[derive(Debug, Deserialize)]
struct MetadataTokenResponse {
    access_token: String,
    expires_in: u64,
}

struct CachedToken {
    token: String,
    refresh_at: Instant,
}

/// Default service account token from the GCE metadata server, cached until near expiry
pub struct MetadataServerTokenSource {
    http_client: reqwest::Client,
    token_url: String,
    cached: Mutex<Option<CachedToken>>,
}

impl std::fmt::Debug for MetadataServerTokenSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetadataServerTokenSource")
            .field("token_url", &self.token_url)
            .finish_non_exhaustive()
    }
}

impl MetadataServerTokenSource {
    /// # Errors
    /// Returns an error if the HTTP client cannot be built
    pub fn new(metadata_host: &str, timeout: Duration) -> Result<Self> {
        let host = metadata_host.trim_end_matches('/');
        let token_url = if host.starts_with("http://") || host.starts_with("https://") {
            format!("{host}{METADATA_TOKEN_PATH}")
        } else {
            format!("http://{host}{METADATA_TOKEN_PATH}")
        };

        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            http_client,
            token_url,
            cached: Mutex::new(None),
        })
    }

    async fn fetch(&self) -> Result<MetadataTokenResponse> {
        let response = self
            .http_client
            .get(&self.token_url)
            .header(METADATA_FLAVOR, METADATA_FLAVOR_VALUE)
            .send()
            .await
            .with_context(|| format!("Failed to reach metadata server at {}", self.token_url))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Metadata server returned HTTP {status}: {body}");
        }

        response
            .json::<MetadataTokenResponse>()
            .await
            .context("Failed to decode metadata server token response")
    }
}

#[async_trait]
impl TokenSource for MetadataServerTokenSource {
    async fn access_token(&self) -> Result<String> {
        let mut cached = self.cached.lock().await;
        if let Some(token) = cached.as_ref() {
            if Instant::now() < token.refresh_at {
                return Ok(token.token.clone());
            }
        }

        debug!("Fetching access token from metadata server");
        let response = self.fetch().await?;
        let lifetime = response.expires_in.saturating_sub(TOKEN_EXPIRY_SKEW_SECS);
        let token = response.access_token;
        *cached = Some(CachedToken {
            token: token.clone(),
            refresh_at: Instant::now() + Duration::from_secs(lifetime),
        });
        Ok(token)
    }
}

/// Pick the token source for this process
///
/// # Errors
/// Returns an error if the metadata server client cannot be built
pub fn create_token_source(config: &ToolConfig) -> Result<Arc<dyn TokenSource>> {
    if config.pact_mode {
        debug!("Pact mode: using mock GCP credential");
        return Ok(Arc::new(MockTokenSource));
    }

    if let Some(token) = &config.access_token {
        info!("Using access token from GCP_ACCESS_TOKEN");
        return Ok(Arc::new(StaticTokenSource::new(token.clone())));
    }

    info!(
        "No access token configured, using metadata server at {}",
        config.metadata_host
    );
    Ok(Arc::new(MetadataServerTokenSource::new(
        &config.metadata_host,
        Duration::from_secs(config.http_timeout_secs),
    )?))
}
