//! # Secret Manager REST Client
//!
//! `SecretManagerProvider` over the Secret Manager v1 REST API.

use super::requests::{AddVersionRequest, CreateSecretRequest};
use super::responses::{
    AccessSecretVersionResponse, ListSecretsResponse, SecretResponse, SecretVersionResponse,
};
use super::GcpRestClient;
use crate::provider::SecretManagerProvider;
use anyhow::{Context, Result};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use paths::GcpOperation;
use tracing::{debug, info, info_span, Instrument};

/// Secret Manager provider implementation
#[derive(Debug, Clone)]
pub struct SecretManagerREST {
    client: GcpRestClient,
    page_size: u32,
}

impl SecretManagerREST {
    pub fn new(client: GcpRestClient, page_size: u32) -> Self {
        Self {
            client,
            page_size: page_size.max(1),
        }
    }
}

#[async_trait]
impl SecretManagerProvider for SecretManagerREST {
    async fn create_secret(&self, secret_id: &str) -> Result<()> {
        let span = info_span!(
            "gcp.secretmanager.secret.create",
            secret.name = secret_id,
            project.id = self.client.project_id()
        );
        async move {
            let path = self.client.path(GcpOperation::CreateSecret);
            let created: SecretResponse = self
                .client
                .post(
                    GcpOperation::CreateSecret,
                    &path,
                    &[("secretId", secret_id)],
                    &CreateSecretRequest::automatic(),
                )
                .await
                .with_context(|| format!("Failed to create GCP secret {secret_id}"))?;
            info!("Created GCP secret: {}", created.name);
            Ok(())
        }
        .instrument(span)
        .await
    }

    async fn add_secret_version(&self, secret_id: &str, value: &str) -> Result<String> {
        let span = info_span!(
            "gcp.secretmanager.version.add",
            secret.name = secret_id,
            project.id = self.client.project_id()
        );
        async move {
            let path = self
                .client
                .path(GcpOperation::AddSecretVersion)
                .secret(secret_id);
            let request = AddVersionRequest::new(STANDARD.encode(value.as_bytes()));
            let version: SecretVersionResponse = self
                .client
                .post(GcpOperation::AddSecretVersion, &path, &[], &request)
                .await
                .with_context(|| format!("Failed to add version to GCP secret {secret_id}"))?;
            debug!("Added secret version: {}", version.name);
            Ok(version.name)
        }
        .instrument(span)
        .await
    }

    async fn list_secrets(&self) -> Result<Vec<String>> {
        let path = self.client.path(GcpOperation::ListSecrets);
        let page_size = self.page_size.to_string();
        let mut secret_ids = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut query = vec![("pageSize", page_size.as_str())];
            if let Some(token) = page_token.as_deref() {
                query.push(("pageToken", token));
            }

            let page: ListSecretsResponse = self
                .client
                .get(GcpOperation::ListSecrets, &path, &query)
                .await
                .context("Failed to list GCP secrets")?;

            secret_ids.extend(
                page.secrets
                    .iter()
                    .map(|secret| paths::gcp::short_secret_id(&secret.name).to_string()),
            );

            match page.next_page_token.filter(|token| !token.is_empty()) {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        debug!("Listed {} GCP secrets", secret_ids.len());
        Ok(secret_ids)
    }

    async fn access_secret_version(
        &self,
        secret_id: &str,
        version: &str,
    ) -> Result<Option<String>> {
        let span = tracing::debug_span!(
            "gcp.secretmanager.version.access",
            secret.name = secret_id,
            secret.version = version
        );
        async move {
            let path = self
                .client
                .path(GcpOperation::AccessSecretVersion)
                .secret(secret_id)
                .version(version);
            let response = self
                .client
                .get::<AccessSecretVersionResponse>(GcpOperation::AccessSecretVersion, &path, &[])
                .await;

            let response = match response {
                Ok(response) => response,
                Err(e) if e.is_not_found() => return Ok(None),
                Err(e) => {
                    return Err(anyhow::Error::new(e)
                        .context(format!("Failed to access GCP secret {secret_id}")))
                }
            };

            let decoded = STANDARD
                .decode(response.payload.data.as_bytes())
                .with_context(|| format!("Secret {secret_id} payload is not valid base64"))?;
            let value = String::from_utf8(decoded)
                .with_context(|| format!("Secret {secret_id} payload is not valid UTF-8"))?;
            Ok(Some(value))
        }
        .instrument(span)
        .await
    }

    async fn secret_exists(&self, secret_id: &str) -> Result<bool> {
        let path = self.client.path(GcpOperation::GetSecret).secret(secret_id);
        match self
            .client
            .get::<SecretResponse>(GcpOperation::GetSecret, &path, &[])
            .await
        {
            Ok(_) => Ok(true),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(anyhow::Error::new(e)
                .context(format!("Failed to look up GCP secret {secret_id}"))),
        }
    }
}
