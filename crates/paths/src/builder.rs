//! # PathBuilder
//!
//! Builds the HTTP path (query string excluded) for a [`GcpOperation`].
//!
//! ```
//! use paths::{GcpOperation, PathBuilder};
//!
//! let path = PathBuilder::new()
//!     .operation(GcpOperation::AccessSecretVersion)
//!     .project("my-project")
//!     .secret("api-key")
//!     .version("latest")
//!     .build()
//!     .unwrap();
//! assert_eq!(path, "/v1/projects/my-project/secrets/api-key/versions/latest:access");
//! ```

use crate::errors::PathBuilderError;
use crate::operations::{GcpOperation, PathParams};

#[derive(Debug, Clone, Default)]
pub struct PathBuilder {
    operation: Option<GcpOperation>,
    params: PathParams,
}

impl PathBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn operation(mut self, operation: GcpOperation) -> Self {
        self.operation = Some(operation);
        self
    }

    #[must_use]
    pub fn project(mut self, project: &str) -> Self {
        self.params.project = project.to_string();
        self
    }

    #[must_use]
    pub fn secret(mut self, secret: &str) -> Self {
        self.params.secret = Some(secret.to_string());
        self
    }

    #[must_use]
    pub fn version(mut self, version: &str) -> Self {
        self.params.version = Some(version.to_string());
        self
    }

    #[must_use]
    pub fn location(mut self, location: &str) -> Self {
        self.params.location = Some(location.to_string());
        self
    }

    /// Build the path for the configured operation
    ///
    /// # Errors
    /// Returns an error if no operation is set or a required parameter is missing
    pub fn build(&self) -> Result<String, PathBuilderError> {
        let operation = self.operation.ok_or(PathBuilderError::MissingOperation)?;
        let require = |value: &Option<String>, parameter: &'static str| {
            value
                .clone()
                .filter(|v| !v.is_empty())
                .ok_or(PathBuilderError::MissingParameter {
                    operation,
                    parameter,
                })
        };

        if self.params.project.is_empty() {
            return Err(PathBuilderError::MissingParameter {
                operation,
                parameter: "project",
            });
        }
        let project = &self.params.project;
        let api = operation.service().api_version();

        let path = match operation {
            GcpOperation::CreateSecret | GcpOperation::ListSecrets => {
                format!("/{api}/projects/{project}/secrets")
            }
            GcpOperation::AddSecretVersion => {
                let secret = require(&self.params.secret, "secret")?;
                format!("/{api}/projects/{project}/secrets/{secret}:addVersion")
            }
            GcpOperation::GetSecret => {
                let secret = require(&self.params.secret, "secret")?;
                format!("/{api}/projects/{project}/secrets/{secret}")
            }
            GcpOperation::AccessSecretVersion => {
                let secret = require(&self.params.secret, "secret")?;
                let version = require(&self.params.version, "version")?;
                format!("/{api}/projects/{project}/secrets/{secret}/versions/{version}:access")
            }
            GcpOperation::GetIamPolicy => format!("/{api}/projects/{project}:getIamPolicy"),
            GcpOperation::SetIamPolicy => format!("/{api}/projects/{project}:setIamPolicy"),
            GcpOperation::CreateService => {
                let location = require(&self.params.location, "location")?;
                format!("/{api}/projects/{project}/locations/{location}/services")
            }
            GcpOperation::CreateBuildTrigger => format!("/{api}/projects/{project}/triggers"),
        };

        Ok(path)
    }
}
