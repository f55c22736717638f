//! # GCP Services
//!
//! Base URLs and resource-name helpers for the GCP services the tools talk to.

/// GCP REST services used by the config applier and the operational manager
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GcpService {
    /// Secret Manager API v1
    SecretManager,
    /// Cloud Resource Manager API v3 (project IAM policies)
    ResourceManager,
    /// Cloud Run Admin API v2
    CloudRun,
    /// Cloud Build API v1
    CloudBuild,
}

impl GcpService {
    /// Public endpoint of the service, without trailing slash
    pub fn default_base_url(self) -> &'static str {
        match self {
            GcpService::SecretManager => "https://secretmanager.googleapis.com",
            GcpService::ResourceManager => "https://cloudresourcemanager.googleapis.com",
            GcpService::CloudRun => "https://run.googleapis.com",
            GcpService::CloudBuild => "https://cloudbuild.googleapis.com",
        }
    }

    /// API version prefix used in every path of the service
    pub fn api_version(self) -> &'static str {
        match self {
            GcpService::SecretManager | GcpService::CloudBuild => "v1",
            GcpService::ResourceManager => "v3",
            GcpService::CloudRun => "v2",
        }
    }

    /// Environment variable that overrides the base URL (used with the mock server)
    pub fn endpoint_env_var(self) -> &'static str {
        match self {
            GcpService::SecretManager => "GCP_SECRET_MANAGER_ENDPOINT",
            GcpService::ResourceManager => "GCP_RESOURCE_MANAGER_ENDPOINT",
            GcpService::CloudRun => "GCP_CLOUD_RUN_ENDPOINT",
            GcpService::CloudBuild => "GCP_CLOUD_BUILD_ENDPOINT",
        }
    }

    /// Short name used in log fields
    pub fn as_str(self) -> &'static str {
        match self {
            GcpService::SecretManager => "secretmanager",
            GcpService::ResourceManager => "resourcemanager",
            GcpService::CloudRun => "run",
            GcpService::CloudBuild => "cloudbuild",
        }
    }
}

/// `projects/{project}`
pub fn project_name(project: &str) -> String {
    format!("projects/{project}")
}

/// `projects/{project}/secrets/{secret}`
pub fn secret_name(project: &str, secret: &str) -> String {
    format!("projects/{project}/secrets/{secret}")
}

/// `projects/{project}/secrets/{secret}/versions/{version}`
pub fn secret_version_name(project: &str, secret: &str, version: &str) -> String {
    format!("projects/{project}/secrets/{secret}/versions/{version}")
}

/// `projects/{project}/locations/{location}`
pub fn location_name(project: &str, location: &str) -> String {
    format!("projects/{project}/locations/{location}")
}

/// `projects/{project}/locations/{location}/services/{service}`
pub fn service_name(project: &str, location: &str, service: &str) -> String {
    format!("projects/{project}/locations/{location}/services/{service}")
}

/// Extract the short secret id from a full secret resource name
///
/// Returns the input unchanged when it is not a full resource name.
pub fn short_secret_id(name: &str) -> &str {
    match name.rsplit_once("/secrets/") {
        Some((_, id)) => id,
        None => name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_names() {
        assert_eq!(project_name("p1"), "projects/p1");
        assert_eq!(secret_name("p1", "db"), "projects/p1/secrets/db");
        assert_eq!(
            secret_version_name("p1", "db", "latest"),
            "projects/p1/secrets/db/versions/latest"
        );
        assert_eq!(
            service_name("p1", "us-central1", "api"),
            "projects/p1/locations/us-central1/services/api"
        );
    }

    #[test]
    fn test_short_secret_id() {
        assert_eq!(short_secret_id("projects/p1/secrets/api-key"), "api-key");
        assert_eq!(short_secret_id("api-key"), "api-key");
    }
}
