//! # Request Types
//!
//! JSON payloads sent to the GCP REST APIs. Designed to match the API schemas:
//! - https://cloud.google.com/secret-manager/docs/reference/rest
//! - https://cloud.google.com/resource-manager/reference/rest/v3/projects

use serde::Serialize;

use super::responses::{AutomaticReplication, Replication, SecretPayload};
use crate::provider::Policy;

/// Request body for creating a new secret
///
/// Used in `POST /v1/projects/{project}/secrets?secretId={secret}`.
/// Creates the secret metadata only; the value is added with [`AddVersionRequest`].
#[derive(Debug, Serialize)]
pub struct CreateSecretRequest {
    pub replication: Replication,
}

impl CreateSecretRequest {
    /// Create a new request with automatic replication
    pub fn automatic() -> Self {
        Self {
            replication: Replication {
                automatic: Some(AutomaticReplication {}),
            },
        }
    }
}

/// Request body for adding a new version to an existing secret
///
/// Used in `POST /v1/projects/{project}/secrets/{secret}:addVersion`.
///
/// **Important**: The payload data must be base64-encoded before sending.
#[derive(Debug, Serialize)]
pub struct AddVersionRequest {
    pub payload: SecretPayload,
}

impl AddVersionRequest {
    /// Create a new request with base64-encoded data
    pub fn new(data: String) -> Self {
        Self {
            payload: SecretPayload { data },
        }
    }
}

/// Request body for `POST /v3/projects/{project}:getIamPolicy`
#[derive(Debug, Serialize)]
pub struct GetIamPolicyRequest {
    pub options: GetPolicyOptions,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GetPolicyOptions {
    pub requested_policy_version: i32,
}

impl GetIamPolicyRequest {
    pub fn new(requested_policy_version: i32) -> Self {
        Self {
            options: GetPolicyOptions {
                requested_policy_version,
            },
        }
    }
}

/// Request body for `POST /v3/projects/{project}:setIamPolicy`
#[derive(Debug, Serialize)]
pub struct SetIamPolicyRequest<'a> {
    pub policy: &'a Policy,
}
