//! # Cloud Run REST Client

use super::GcpRestClient;
use crate::provider::{CloudRunProvider, Operation, Service};
use anyhow::{Context, Result};
use async_trait::async_trait;
use paths::GcpOperation;
use tracing::debug;

/// Cloud Run Admin API v2 provider implementation
#[derive(Debug, Clone)]
pub struct CloudRunREST {
    client: GcpRestClient,
}

impl CloudRunREST {
    pub fn new(client: GcpRestClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl CloudRunProvider for CloudRunREST {
    async fn create_service(
        &self,
        location: &str,
        service_id: &str,
        service: &Service,
    ) -> Result<Operation> {
        let path = self
            .client
            .path(GcpOperation::CreateService)
            .location(location);
        let operation: Operation = self
            .client
            .post(
                GcpOperation::CreateService,
                &path,
                &[("serviceId", service_id)],
                service,
            )
            .await
            .with_context(|| {
                format!("Failed to create Cloud Run service {service_id} in {location}")
            })?;
        debug!(
            "Cloud Run create operation {} (done: {})",
            operation.name, operation.done
        );
        Ok(operation)
    }
}
