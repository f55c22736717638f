//! # Resource Manager REST Client
//!
//! Project IAM policy read/write over the Cloud Resource Manager v3 REST API.

use super::requests::{GetIamPolicyRequest, SetIamPolicyRequest};
use super::GcpRestClient;
use crate::constants::IAM_POLICY_VERSION;
use crate::provider::{IamPolicyProvider, Policy};
use anyhow::{Context, Result};
use async_trait::async_trait;
use paths::GcpOperation;
use tracing::debug;

/// Project IAM policy provider implementation
#[derive(Debug, Clone)]
pub struct ResourceManagerREST {
    client: GcpRestClient,
}

impl ResourceManagerREST {
    pub fn new(client: GcpRestClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl IamPolicyProvider for ResourceManagerREST {
    async fn get_iam_policy(&self) -> Result<Policy> {
        let path = self.client.path(GcpOperation::GetIamPolicy);
        let policy: Policy = self
            .client
            .post(
                GcpOperation::GetIamPolicy,
                &path,
                &[],
                &GetIamPolicyRequest::new(IAM_POLICY_VERSION),
            )
            .await
            .with_context(|| {
                format!(
                    "Failed to get IAM policy for projects/{}",
                    self.client.project_id()
                )
            })?;
        debug!(
            "Fetched IAM policy with {} bindings (etag {})",
            policy.bindings.len(),
            policy.etag
        );
        Ok(policy)
    }

    async fn set_iam_policy(&self, policy: &Policy) -> Result<Policy> {
        let path = self.client.path(GcpOperation::SetIamPolicy);
        self.client
            .post(
                GcpOperation::SetIamPolicy,
                &path,
                &[],
                &SetIamPolicyRequest { policy },
            )
            .await
            .with_context(|| {
                format!(
                    "Failed to set IAM policy for projects/{}",
                    self.client.project_id()
                )
            })
    }
}
