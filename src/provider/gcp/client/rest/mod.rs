//! # GCP REST Client
//!
//! Native REST implementation using reqwest with rustls.
//!
//! [`GcpRestClient`] is the shared transport: it attaches the bearer token, logs each
//! call with its operation name, and turns non-success responses into [`ApiError`]
//! carrying the HTTP status and the message from the GCP error envelope
//! (`{"error": {"code": 404, "message": "...", "status": "NOT_FOUND"}}`).

mod build;
mod requests;
mod resource_manager;
mod responses;
mod run;
mod secret_manager;

pub use build::CloudBuildREST;
pub use resource_manager::ResourceManagerREST;
pub use run::CloudRunREST;
pub use secret_manager::SecretManagerREST;

use crate::config::ToolConfig;
use crate::provider::gcp::auth::TokenSource;
use paths::{GcpOperation, GcpService, HttpMethod, PathBuilder};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, warn};

/// Failure of a single REST call
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("failed to obtain access token: {0}")]
    Auth(String),

    #[error("failed to build request path: {0}")]
    Path(#[from] paths::PathBuilderError),

    #[error("{operation} request failed: {source}")]
    Transport {
        operation: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{operation} failed: HTTP {status} - {message}")]
    Status {
        operation: &'static str,
        status: u16,
        message: String,
    },

    #[error("failed to decode {operation} response: {source}")]
    Decode {
        operation: &'static str,
        #[source]
        source: reqwest::Error,
    },
}

impl ApiError {
    /// Whether the service reported the resource as missing
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::Status { status: 404, .. })
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: String,
}

/// Extract a readable message from a GCP error body, falling back to the raw text
fn error_message(body: &str) -> String {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) if !envelope.error.status.is_empty() => {
            format!("{} ({})", envelope.error.message, envelope.error.status)
        }
        Ok(envelope) => envelope.error.message,
        Err(_) => body.trim().to_string(),
    }
}

/// Shared HTTP transport for one GCP service
#[derive(Clone)]
pub struct GcpRestClient {
    http_client: reqwest::Client,
    base_url: String,
    project_id: String,
    service: GcpService,
    token_source: Arc<dyn TokenSource>,
}

impl std::fmt::Debug for GcpRestClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GcpRestClient")
            .field("base_url", &self.base_url)
            .field("project_id", &self.project_id)
            .field("service", &self.service)
            .finish_non_exhaustive()
    }
}

impl GcpRestClient {
    /// # Errors
    /// Returns an error if the HTTP client cannot be built
    pub fn new(
        service: GcpService,
        project_id: &str,
        config: &ToolConfig,
        token_source: Arc<dyn TokenSource>,
    ) -> anyhow::Result<Self> {
        use anyhow::Context;

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.http_timeout_secs))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            http_client,
            base_url: config.endpoints.base_url(service).to_string(),
            project_id: project_id.to_string(),
            service,
            token_source,
        })
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    /// Path builder pre-filled with the operation and project
    pub fn path(&self, operation: GcpOperation) -> PathBuilder {
        PathBuilder::new()
            .operation(operation)
            .project(&self.project_id)
    }

    /// Issue a GET and decode the JSON response
    ///
    /// # Errors
    /// Returns [`ApiError`] on transport, HTTP status or decode failure
    pub async fn get<T: DeserializeOwned>(
        &self,
        operation: GcpOperation,
        path: &PathBuilder,
        query: &[(&str, &str)],
    ) -> Result<T, ApiError> {
        self.execute::<(), T>(operation, path, query, None).await
    }

    /// Issue a POST with a JSON body and decode the JSON response
    ///
    /// # Errors
    /// Returns [`ApiError`] on transport, HTTP status or decode failure
    pub async fn post<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        operation: GcpOperation,
        path: &PathBuilder,
        query: &[(&str, &str)],
        body: &B,
    ) -> Result<T, ApiError> {
        self.execute(operation, path, query, Some(body)).await
    }

    async fn execute<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        operation: GcpOperation,
        path: &PathBuilder,
        query: &[(&str, &str)],
        body: Option<&B>,
    ) -> Result<T, ApiError> {
        let url = format!("{}{}", self.base_url, path.build()?);
        let token = self
            .token_source
            .access_token()
            .await
            .map_err(|e| ApiError::Auth(format!("{e:#}")))?;

        let mut request = match operation.method() {
            HttpMethod::Get => self.http_client.get(&url),
            HttpMethod::Post => self.http_client.post(&url),
        };
        request = request.bearer_auth(token);
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let start = Instant::now();
        let response = request.send().await.map_err(|source| ApiError::Transport {
            operation: operation.as_str(),
            source,
        })?;

        let status = response.status();
        debug!(
            service = self.service.as_str(),
            operation = operation.as_str(),
            status = status.as_u16(),
            duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
            "{} {}",
            operation.method().as_str(),
            url
        );

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            if status != StatusCode::NOT_FOUND {
                warn!(
                    "{} returned HTTP {}: {}",
                    operation.as_str(),
                    status.as_u16(),
                    body.trim()
                );
            }
            return Err(ApiError::Status {
                operation: operation.as_str(),
                status: status.as_u16(),
                message: error_message(&body),
            });
        }

        response.json::<T>().await.map_err(|source| ApiError::Decode {
            operation: operation.as_str(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message_from_envelope() {
        let body = r#"{"error": {"code": 404, "message": "Secret [db] not found", "status": "NOT_FOUND"}}"#;
        assert_eq!(error_message(body), "Secret [db] not found (NOT_FOUND)");
    }

    #[test]
    fn test_error_message_falls_back_to_raw_text() {
        assert_eq!(error_message("upstream connect error\n"), "upstream connect error");
    }

    #[test]
    fn test_not_found_classification() {
        let err = ApiError::Status {
            operation: "get_secret",
            status: 404,
            message: "missing".to_string(),
        };
        assert!(err.is_not_found());
        assert_eq!(err.status(), Some(404));

        let err = ApiError::Status {
            operation: "get_secret",
            status: 403,
            message: "denied".to_string(),
        };
        assert!(!err.is_not_found());
        assert_eq!(err.to_string(), "get_secret failed: HTTP 403 - denied");
    }
}
