//! # GCP Providers
//!
//! Providers for the Google Cloud services the tools call:
//! - Secret Manager: secrets and secret versions
//! - Resource Manager: project IAM policy
//! - Cloud Run: services
//! - Cloud Build: triggers
//!
//! Uses native REST implementations that:
//! - Work directly with the local mock server in Pact mode
//! - Use reqwest with rustls (no OpenSSL dependencies)
//! - Easier to troubleshoot and maintain

pub mod auth;
mod client;

pub use auth::{create_token_source, TokenSource};
pub use client::{
    ApiError, CloudBuildREST, CloudRunREST, GcpRestClient, ResourceManagerREST,
    SecretManagerREST,
};

use crate::config::ToolConfig;
use crate::provider::{
    CloudBuildProvider, CloudRunProvider, IamPolicyProvider, SecretManagerProvider,
};
use anyhow::Result;
use paths::GcpService;
use std::sync::Arc;
use tracing::info;

/// Create a GCP Secret Manager provider
///
/// # Errors
/// Returns an error if the token source or HTTP client cannot be created
pub fn create_secret_manager_provider(
    project_id: &str,
    config: &ToolConfig,
) -> Result<Box<dyn SecretManagerProvider>> {
    info!("Using GCP Secret Manager REST client (native implementation)");
    let token_source = create_token_source(config)?;
    let client = GcpRestClient::new(GcpService::SecretManager, project_id, config, token_source)?;
    Ok(Box::new(SecretManagerREST::new(client, config.list_page_size)))
}

/// REST providers for the three surfaces `apply-config` writes to
#[derive(Debug)]
pub struct ApplierProviders {
    pub iam: Box<dyn IamPolicyProvider>,
    pub run: Box<dyn CloudRunProvider>,
    pub build: Box<dyn CloudBuildProvider>,
}

/// Create the IAM, Cloud Run and Cloud Build providers sharing one token source
///
/// # Errors
/// Returns an error if the token source or an HTTP client cannot be created
pub fn create_applier_providers(project_id: &str, config: &ToolConfig) -> Result<ApplierProviders> {
    info!("Using GCP REST clients (native implementation)");
    let token_source: Arc<dyn TokenSource> = create_token_source(config)?;
    let client = |service| {
        GcpRestClient::new(service, project_id, config, Arc::clone(&token_source))
    };

    Ok(ApplierProviders {
        iam: Box::new(ResourceManagerREST::new(client(
            GcpService::ResourceManager,
        )?)),
        run: Box::new(CloudRunREST::new(client(GcpService::CloudRun)?)),
        build: Box::new(CloudBuildREST::new(client(GcpService::CloudBuild)?)),
    })
}
