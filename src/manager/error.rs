use thiserror::Error;

/// Errors raised by `opsctl` before or instead of a remote call
#[derive(Debug, Error)]
pub enum ManagerError {
    #[error("--{0} is required for this action")]
    MissingArgument(&'static str),

    #[error("Invalid secret id '{secret_id}': {reason}")]
    InvalidSecretId { secret_id: String, reason: String },

    #[error("Secret {0} has no accessible latest version")]
    SecretNotFound(String),

    #[error("Failed to read env file {path}: {source}")]
    EnvFile {
        path: String,
        #[source]
        source: dotenvy::Error,
    },
}
