//! # Cloud Build REST Client

use super::GcpRestClient;
use crate::provider::{BuildTrigger, CloudBuildProvider};
use anyhow::{Context, Result};
use async_trait::async_trait;
use paths::GcpOperation;

/// Cloud Build API v1 provider implementation
#[derive(Debug, Clone)]
pub struct CloudBuildREST {
    client: GcpRestClient,
}

impl CloudBuildREST {
    pub fn new(client: GcpRestClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl CloudBuildProvider for CloudBuildREST {
    async fn create_build_trigger(&self, trigger: &BuildTrigger) -> Result<BuildTrigger> {
        let path = self.client.path(GcpOperation::CreateBuildTrigger);
        self.client
            .post(GcpOperation::CreateBuildTrigger, &path, &[], trigger)
            .await
            .with_context(|| format!("Failed to create Cloud Build trigger {}", trigger.name))
    }
}
