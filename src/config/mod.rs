//! # Tool Configuration
//!
//! Runtime settings loaded from environment variables (a `.env` file in the working
//! directory is loaded first by [`crate::runtime::initialize`]).
//!
//! All settings have sensible defaults. Endpoint overrides are only honored in Pact
//! mode, which routes every request to a local mock server.

pub mod documents;

use crate::constants::{
    ACCESS_TOKEN_ENV_VAR, DEFAULT_HTTP_TIMEOUT_SECS, DEFAULT_LIST_PAGE_SIZE,
    DEFAULT_METADATA_HOST, HTTP_TIMEOUT_ENV_VAR, LIST_PAGE_SIZE_ENV_VAR, METADATA_HOST_ENV_VAR,
    PACT_MODE_ENV_VAR, PROJECT_ID_ENV_VAR,
};
use anyhow::{bail, Result};
use paths::GcpService;
use tracing::info;

pub use documents::{
    load_document, CloudBuildConfig, CloudRunConfig, ConfigFileError, Document, IamConfig,
};

/// Base URLs for each GCP REST service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointConfig {
    pub secret_manager: String,
    pub resource_manager: String,
    pub cloud_run: String,
    pub cloud_build: String,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            secret_manager: GcpService::SecretManager.default_base_url().to_string(),
            resource_manager: GcpService::ResourceManager.default_base_url().to_string(),
            cloud_run: GcpService::CloudRun.default_base_url().to_string(),
            cloud_build: GcpService::CloudBuild.default_base_url().to_string(),
        }
    }
}

impl EndpointConfig {
    /// Route every service to the same base URL (mock server)
    pub fn all(base_url: &str) -> Self {
        let base_url = base_url.trim_end_matches('/').to_string();
        Self {
            secret_manager: base_url.clone(),
            resource_manager: base_url.clone(),
            cloud_run: base_url.clone(),
            cloud_build: base_url,
        }
    }

    pub fn base_url(&self, service: GcpService) -> &str {
        match service {
            GcpService::SecretManager => &self.secret_manager,
            GcpService::ResourceManager => &self.resource_manager,
            GcpService::CloudRun => &self.cloud_run,
            GcpService::CloudBuild => &self.cloud_build,
        }
    }

    fn from_env(pact_mode: bool) -> Self {
        let mut endpoints = Self::default();
        if !pact_mode {
            return endpoints;
        }

        for service in [
            GcpService::SecretManager,
            GcpService::ResourceManager,
            GcpService::CloudRun,
            GcpService::CloudBuild,
        ] {
            let Ok(endpoint) = std::env::var(service.endpoint_env_var()) else {
                info!(
                    "Pact mode enabled but {} not set, using default endpoint",
                    service.endpoint_env_var()
                );
                continue;
            };
            info!(
                "Pact mode enabled: routing {} requests to {}",
                service.as_str(),
                endpoint
            );
            let endpoint = endpoint.trim_end_matches('/').to_string();
            match service {
                GcpService::SecretManager => endpoints.secret_manager = endpoint,
                GcpService::ResourceManager => endpoints.resource_manager = endpoint,
                GcpService::CloudRun => endpoints.cloud_run = endpoint,
                GcpService::CloudBuild => endpoints.cloud_build = endpoint,
            }
        }
        endpoints
    }
}

/// Settings shared by both binaries
#[derive(Clone)]
pub struct ToolConfig {
    /// Use mock endpoints and a dummy bearer token
    pub pact_mode: bool,
    /// Pre-minted OAuth access token (`GCP_ACCESS_TOKEN`)
    pub access_token: Option<String>,
    /// GCE metadata server host (`GCE_METADATA_HOST`)
    pub metadata_host: String,
    /// HTTP request timeout in seconds (`HTTP_TIMEOUT_SECS`)
    pub http_timeout_secs: u64,
    /// Page size for secret listing (`LIST_PAGE_SIZE`)
    pub list_page_size: u32,
    pub endpoints: EndpointConfig,
}

impl std::fmt::Debug for ToolConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolConfig")
            .field("pact_mode", &self.pact_mode)
            .field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
            .field("metadata_host", &self.metadata_host)
            .field("http_timeout_secs", &self.http_timeout_secs)
            .field("list_page_size", &self.list_page_size)
            .field("endpoints", &self.endpoints)
            .finish()
    }
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            pact_mode: false,
            access_token: None,
            metadata_host: DEFAULT_METADATA_HOST.to_string(),
            http_timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
            list_page_size: DEFAULT_LIST_PAGE_SIZE,
            endpoints: EndpointConfig::default(),
        }
    }
}

impl ToolConfig {
    /// Load configuration from environment variables with defaults
    pub fn from_env() -> Self {
        let pact_mode = std::env::var(PACT_MODE_ENV_VAR).is_ok();
        Self {
            pact_mode,
            access_token: std::env::var(ACCESS_TOKEN_ENV_VAR)
                .ok()
                .filter(|token| !token.trim().is_empty()),
            metadata_host: std::env::var(METADATA_HOST_ENV_VAR)
                .unwrap_or_else(|_| DEFAULT_METADATA_HOST.to_string()),
            http_timeout_secs: env_var_or_default(HTTP_TIMEOUT_ENV_VAR, DEFAULT_HTTP_TIMEOUT_SECS),
            list_page_size: env_var_or_default(LIST_PAGE_SIZE_ENV_VAR, DEFAULT_LIST_PAGE_SIZE),
            endpoints: EndpointConfig::from_env(pact_mode),
        }
    }

    /// Pact-mode configuration pointing every service at one mock server
    pub fn for_mock_server(base_url: &str) -> Self {
        Self {
            pact_mode: true,
            endpoints: EndpointConfig::all(base_url),
            ..Self::default()
        }
    }
}

/// Resolve the target project from the command line or `GCP_PROJECT_ID`
///
/// # Errors
/// Returns an error when neither source provides a non-empty project id
pub fn resolve_project_id(from_cli: Option<String>) -> Result<String> {
    let project_id = from_cli
        .or_else(|| std::env::var(PROJECT_ID_ENV_VAR).ok())
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty());

    match project_id {
        Some(id) => Ok(id),
        None => bail!("{PROJECT_ID_ENV_VAR} environment variable not set"),
    }
}

/// Read environment variable or return default value
fn env_var_or_default<T: std::str::FromStr>(key: &str, default: T) -> T
where
    <T as std::str::FromStr>::Err: std::fmt::Debug,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_project_id_prefers_cli() {
        let project = resolve_project_id(Some("  cli-project ".to_string())).unwrap();
        assert_eq!(project, "cli-project");
    }

    #[test]
    fn test_resolve_project_id_rejects_blank() {
        // A blank flag falls through to the environment; the message names the variable
        if std::env::var(PROJECT_ID_ENV_VAR).is_err() {
            let err = resolve_project_id(Some("   ".to_string())).unwrap_err();
            assert_eq!(err.to_string(), "GCP_PROJECT_ID environment variable not set");
        }
    }

    #[test]
    fn test_mock_server_config_routes_all_services() {
        let config = ToolConfig::for_mock_server("http://127.0.0.1:1234/");
        assert!(config.pact_mode);
        for service in [
            GcpService::SecretManager,
            GcpService::ResourceManager,
            GcpService::CloudRun,
            GcpService::CloudBuild,
        ] {
            assert_eq!(config.endpoints.base_url(service), "http://127.0.0.1:1234");
        }
    }

    #[test]
    fn test_default_endpoints_are_public_apis() {
        let endpoints = EndpointConfig::default();
        assert_eq!(
            endpoints.base_url(GcpService::ResourceManager),
            "https://cloudresourcemanager.googleapis.com"
        );
    }

    #[test]
    fn test_debug_redacts_access_token() {
        let config = ToolConfig {
            access_token: Some("ya29.secret".to_string()),
            ..ToolConfig::default()
        };
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("ya29.secret"));
        assert!(rendered.contains("<redacted>"));
    }
}
