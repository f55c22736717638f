//! # Providers
//!
//! Traits for the remote GCP surfaces the tools call, plus the REST implementations
//! in [`gcp`]. Orchestration code only sees the traits.

pub mod gcp;
pub mod types;

use anyhow::Result;
use async_trait::async_trait;

pub use types::{
    Binding, Build, BuildStep, BuildTrigger, Container, EnvVar, Operation, Policy,
    ResourceRequirements, RevisionTemplate, Service,
};

/// Project-level IAM policy access (Cloud Resource Manager)
#[async_trait]
pub trait IamPolicyProvider: Send + Sync + std::fmt::Debug {
    /// Fetch the current policy of the project
    async fn get_iam_policy(&self) -> Result<Policy>;

    /// Replace the project policy, returning the stored policy
    async fn set_iam_policy(&self, policy: &Policy) -> Result<Policy>;
}

/// Cloud Run service management
#[async_trait]
pub trait CloudRunProvider: Send + Sync + std::fmt::Debug {
    /// Create a service in `location`; returns the long-running operation
    async fn create_service(
        &self,
        location: &str,
        service_id: &str,
        service: &Service,
    ) -> Result<Operation>;
}

/// Cloud Build trigger management
#[async_trait]
pub trait CloudBuildProvider: Send + Sync + std::fmt::Debug {
    /// Create a build trigger; returns the trigger as stored by the service
    async fn create_build_trigger(&self, trigger: &BuildTrigger) -> Result<BuildTrigger>;
}

/// Secret Manager access
#[async_trait]
pub trait SecretManagerProvider: Send + Sync + std::fmt::Debug {
    /// Create an empty secret with automatic replication
    async fn create_secret(&self, secret_id: &str) -> Result<()>;

    /// Add a version holding `value`; returns the version resource name
    async fn add_secret_version(&self, secret_id: &str, value: &str) -> Result<String>;

    /// List the short ids of every secret in the project
    async fn list_secrets(&self) -> Result<Vec<String>>;

    /// Read and decode a secret version (`latest` or a version number)
    ///
    /// Returns `Ok(None)` if the secret or version does not exist
    async fn access_secret_version(&self, secret_id: &str, version: &str)
        -> Result<Option<String>>;

    /// Whether the secret resource exists
    async fn secret_exists(&self, secret_id: &str) -> Result<bool>;
}
