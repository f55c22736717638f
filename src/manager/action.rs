//! # Actions
//!
//! The five `opsctl` actions and their dispatch onto [`SecretOperations`].

use super::{EnvUpdateReport, ManagerError, SecretOperations};
use anyhow::Result;
use clap::ValueEnum;
use std::fmt;
use std::path::PathBuf;
use zeroize::Zeroizing;

/// `opsctl --action` values
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "kebab-case")]
pub enum Action {
    UpdateSecret,
    ListSecrets,
    GetSecret,
    UpdateFromEnv,
    Validate,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Action::UpdateSecret => "update-secret",
            Action::ListSecrets => "list-secrets",
            Action::GetSecret => "get-secret",
            Action::UpdateFromEnv => "update-from-env",
            Action::Validate => "validate",
        };
        f.write_str(name)
    }
}

/// Parsed `opsctl` arguments for one action
#[derive(Clone)]
pub struct ActionRequest {
    pub action: Action,
    pub secret_id: Option<String>,
    pub secret_value: Option<Zeroizing<String>>,
    pub env_file: PathBuf,
}

impl fmt::Debug for ActionRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionRequest")
            .field("action", &self.action)
            .field("secret_id", &self.secret_id)
            .field("secret_value", &self.secret_value.as_ref().map(|_| "<redacted>"))
            .field("env_file", &self.env_file)
            .finish()
    }
}

impl ActionRequest {
    pub fn new(action: Action) -> Self {
        Self {
            action,
            secret_id: None,
            secret_value: None,
            env_file: PathBuf::from(crate::constants::DEFAULT_ENV_FILE),
        }
    }

    fn secret_id(&self) -> Result<&str, ManagerError> {
        self.secret_id
            .as_deref()
            .ok_or(ManagerError::MissingArgument("secret-id"))
    }

    fn secret_value(&self) -> Result<&str, ManagerError> {
        self.secret_value
            .as_ref()
            .map(|value| value.as_str())
            .ok_or(ManagerError::MissingArgument("secret-value"))
    }
}

/// Result of a completed action
pub enum ActionOutcome {
    Updated { secret_id: String, version: String },
    Listed(Vec<String>),
    Value {
        secret_id: String,
        value: Zeroizing<String>,
    },
    EnvUpdated(EnvUpdateReport),
    Validated(bool),
}

impl fmt::Debug for ActionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionOutcome::Updated { secret_id, version } => f
                .debug_struct("Updated")
                .field("secret_id", secret_id)
                .field("version", version)
                .finish(),
            ActionOutcome::Listed(ids) => f.debug_tuple("Listed").field(ids).finish(),
            ActionOutcome::Value { secret_id, .. } => f
                .debug_struct("Value")
                .field("secret_id", secret_id)
                .finish_non_exhaustive(),
            ActionOutcome::EnvUpdated(report) => f.debug_tuple("EnvUpdated").field(report).finish(),
            ActionOutcome::Validated(valid) => f.debug_tuple("Validated").field(valid).finish(),
        }
    }
}

impl ActionOutcome {
    /// Process exit code; only a failed `validate` is non-zero
    pub fn exit_code(&self) -> u8 {
        match self {
            ActionOutcome::Validated(false) => 1,
            _ => 0,
        }
    }
}

/// Run one action against Secret Manager
///
/// # Errors
/// Returns an error if a required argument is missing or a remote call fails.
/// `validate` never fails; missing secrets are reported in the outcome.
pub async fn run_action(operations: &SecretOperations, request: &ActionRequest) -> Result<ActionOutcome> {
    match request.action {
        Action::UpdateSecret => {
            let secret_id = request.secret_id()?;
            let version = operations
                .update_secret(secret_id, request.secret_value()?)
                .await?;
            Ok(ActionOutcome::Updated {
                secret_id: secret_id.to_string(),
                version,
            })
        }
        Action::ListSecrets => Ok(ActionOutcome::Listed(operations.list_secrets().await?)),
        Action::GetSecret => {
            let secret_id = request.secret_id()?;
            let value = operations.get_secret(secret_id).await?;
            Ok(ActionOutcome::Value {
                secret_id: secret_id.to_string(),
                value,
            })
        }
        Action::UpdateFromEnv => Ok(ActionOutcome::EnvUpdated(
            operations.update_from_env(&request.env_file).await?,
        )),
        Action::Validate => Ok(ActionOutcome::Validated(operations.validate().await)),
    }
}
