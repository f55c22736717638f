//! # Operational Manager
//!
//! Secret Manager operations behind `opsctl`.
//!
//! ## Actions
//!
//! - `update-secret`: create the secret if it does not exist, then add a version
//! - `list-secrets`: list every secret in the project
//! - `get-secret`: read the `latest` version
//! - `update-from-env`: push the known variables of a `.env` file
//! - `validate`: check that the required secrets exist
//!
//! Every operation logs its failure before returning it, except `validate`, which reports
//! missing secrets as a `false` result.

mod action;
mod env_file;
mod error;
mod validation;

pub use action::{run_action, Action, ActionOutcome, ActionRequest};
pub use env_file::{read_env_file, required_secret_ids, SecretMapping, SECRET_MAPPINGS};
pub use error::ManagerError;
pub use validation::validate_secret_id;

use crate::config::ToolConfig;
use crate::provider::gcp::create_secret_manager_provider;
use crate::provider::SecretManagerProvider;
use anyhow::Result;
use std::path::Path;
use tracing::{error, info, warn};
use zeroize::Zeroizing;

/// Version alias read by `get-secret`
const LATEST_VERSION: &str = "latest";

/// Secrets written and variables skipped by `update-from-env`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvUpdateReport {
    /// `(env var, secret id)` pairs that received a new version
    pub updated: Vec<SecretMapping>,
    /// Mapped env vars absent from the file
    pub missing: Vec<SecretMapping>,
}

/// Secret Manager operations for one project
#[derive(Debug)]
pub struct SecretOperations {
    project_id: String,
    provider: Box<dyn SecretManagerProvider>,
}

impl SecretOperations {
    pub fn new(project_id: impl Into<String>, provider: Box<dyn SecretManagerProvider>) -> Self {
        Self {
            project_id: project_id.into(),
            provider,
        }
    }

    /// Build operations backed by the Secret Manager REST client
    ///
    /// # Errors
    /// Returns an error if the client cannot be created
    pub fn from_config(project_id: &str, config: &ToolConfig) -> Result<Self> {
        Ok(Self::new(
            project_id,
            create_secret_manager_provider(project_id, config)?,
        ))
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    /// Store `value` as a new version of `secret_id`, creating the secret first if needed
    ///
    /// Returns the full name of the new version.
    ///
    /// # Errors
    /// Returns an error if the id is invalid or a remote call fails
    pub async fn update_secret(&self, secret_id: &str, value: &str) -> Result<String> {
        self.try_update_secret(secret_id, value)
            .await
            .inspect_err(|e| error!("Error updating secret {secret_id}: {e:#}"))
    }

    async fn try_update_secret(&self, secret_id: &str, value: &str) -> Result<String> {
        validate_secret_id(secret_id)?;

        if !self.provider.secret_exists(secret_id).await? {
            self.provider.create_secret(secret_id).await?;
        }
        let version = self.provider.add_secret_version(secret_id, value).await?;
        info!("Updated secret: {secret_id}");
        Ok(version)
    }

    /// List the short ids of every secret in the project
    ///
    /// # Errors
    /// Returns an error if a list call fails
    pub async fn list_secrets(&self) -> Result<Vec<String>> {
        self.provider
            .list_secrets()
            .await
            .inspect_err(|e| error!("Error listing secrets: {e:#}"))
    }

    /// Read the latest version of `secret_id`
    ///
    /// # Errors
    /// Returns an error if the id is invalid, the secret has no latest version, or the
    /// read fails
    pub async fn get_secret(&self, secret_id: &str) -> Result<Zeroizing<String>> {
        self.try_get_secret(secret_id)
            .await
            .inspect_err(|e| error!("Error getting secret {secret_id}: {e:#}"))
    }

    async fn try_get_secret(&self, secret_id: &str) -> Result<Zeroizing<String>> {
        validate_secret_id(secret_id)?;

        match self
            .provider
            .access_secret_version(secret_id, LATEST_VERSION)
            .await?
        {
            Some(value) => Ok(Zeroizing::new(value)),
            None => Err(ManagerError::SecretNotFound(secret_id.to_string()).into()),
        }
    }

    /// Push each mapped variable found in `env_file` to its secret
    ///
    /// Variables outside [`SECRET_MAPPINGS`] are ignored; mapped variables absent from the
    /// file are logged and reported as missing.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or an update fails; the first failing
    /// update stops the run
    pub async fn update_from_env(&self, env_file: &Path) -> Result<EnvUpdateReport> {
        let values = read_env_file(env_file)
            .inspect_err(|e| error!("Error updating secrets from env: {e}"))?;

        let mut report = EnvUpdateReport::default();
        for mapping in SECRET_MAPPINGS {
            match values.get(mapping.env_var) {
                Some(value) => {
                    self.update_secret(mapping.secret_id, value).await?;
                    report.updated.push(mapping);
                }
                None => {
                    warn!("Environment variable {} not found", mapping.env_var);
                    report.missing.push(mapping);
                }
            }
        }

        info!(
            updated = report.updated.len(),
            missing = report.missing.len(),
            "Updated secrets from {}",
            env_file.display()
        );
        Ok(report)
    }

    /// Check that every required secret exists
    ///
    /// A failed lookup counts as missing.
    pub async fn validate(&self) -> bool {
        let mut all_present = true;

        for secret_id in required_secret_ids() {
            match self.provider.secret_exists(secret_id).await {
                Ok(true) => {}
                Ok(false) => {
                    error!("Missing required secret: {secret_id}");
                    all_present = false;
                }
                Err(e) => {
                    error!("Error validating secret {secret_id}: {e:#}");
                    all_present = false;
                }
            }
        }

        if all_present {
            info!("All required secrets are present");
        }
        all_present
    }
}
