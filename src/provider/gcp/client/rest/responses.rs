//! # Response Types
//!
//! JSON payloads returned by the Secret Manager REST API.

use serde::{Deserialize, Serialize};

/// Replication policy of a secret
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Replication {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub automatic: Option<AutomaticReplication>,
}

/// Automatic replication (Google chooses the regions)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutomaticReplication {}

/// Secret payload; `data` is base64-encoded on the wire
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecretPayload {
    pub data: String,
}

/// Secret metadata
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecretResponse {
    /// `projects/{project}/secrets/{secret}`
    pub name: String,
    #[serde(default)]
    pub create_time: Option<String>,
}

/// Secret version metadata returned by `addVersion`
#[derive(Debug, Clone, Deserialize)]
pub struct SecretVersionResponse {
    /// `projects/{project}/secrets/{secret}/versions/{version}`
    pub name: String,
}

/// Response of `versions/{version}:access`
#[derive(Debug, Clone, Deserialize)]
pub struct AccessSecretVersionResponse {
    #[serde(default)]
    pub name: String,
    pub payload: SecretPayload,
}

/// One page of `GET /v1/projects/{project}/secrets`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListSecretsResponse {
    #[serde(default)]
    pub secrets: Vec<SecretResponse>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}
