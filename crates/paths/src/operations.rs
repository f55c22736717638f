//! # Operations
//!
//! Every REST operation issued by the tools, with its HTTP method, owning
//! service and a matcher that turns an incoming request path back into the
//! operation and its path parameters.

use crate::gcp::GcpService;

/// HTTP method of an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
        }
    }
}

/// GCP REST operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GcpOperation {
    /// `POST /v1/projects/{project}/secrets?secretId={secret}`
    CreateSecret,
    /// `POST /v1/projects/{project}/secrets/{secret}:addVersion`
    AddSecretVersion,
    /// `GET /v1/projects/{project}/secrets`
    ListSecrets,
    /// `GET /v1/projects/{project}/secrets/{secret}`
    GetSecret,
    /// `GET /v1/projects/{project}/secrets/{secret}/versions/{version}:access`
    AccessSecretVersion,
    /// `POST /v3/projects/{project}:getIamPolicy`
    GetIamPolicy,
    /// `POST /v3/projects/{project}:setIamPolicy`
    SetIamPolicy,
    /// `POST /v2/projects/{project}/locations/{location}/services?serviceId={service}`
    CreateService,
    /// `POST /v1/projects/{project}/triggers`
    CreateBuildTrigger,
}

impl GcpOperation {
    pub fn service(self) -> GcpService {
        match self {
            GcpOperation::CreateSecret
            | GcpOperation::AddSecretVersion
            | GcpOperation::ListSecrets
            | GcpOperation::GetSecret
            | GcpOperation::AccessSecretVersion => GcpService::SecretManager,
            GcpOperation::GetIamPolicy | GcpOperation::SetIamPolicy => {
                GcpService::ResourceManager
            }
            GcpOperation::CreateService => GcpService::CloudRun,
            GcpOperation::CreateBuildTrigger => GcpService::CloudBuild,
        }
    }

    pub fn method(self) -> HttpMethod {
        match self {
            GcpOperation::ListSecrets
            | GcpOperation::GetSecret
            | GcpOperation::AccessSecretVersion => HttpMethod::Get,
            _ => HttpMethod::Post,
        }
    }

    /// Name used in log fields and mock server request records
    pub fn as_str(self) -> &'static str {
        match self {
            GcpOperation::CreateSecret => "create_secret",
            GcpOperation::AddSecretVersion => "add_secret_version",
            GcpOperation::ListSecrets => "list_secrets",
            GcpOperation::GetSecret => "get_secret",
            GcpOperation::AccessSecretVersion => "access_secret_version",
            GcpOperation::GetIamPolicy => "get_iam_policy",
            GcpOperation::SetIamPolicy => "set_iam_policy",
            GcpOperation::CreateService => "create_service",
            GcpOperation::CreateBuildTrigger => "create_build_trigger",
        }
    }

    /// Match an HTTP method and path (query string excluded) to an operation
    ///
    /// Returns `None` for anything the tools never call.
    pub fn match_request(method: &str, path: &str) -> Option<(GcpOperation, PathParams)> {
        let segments: Vec<&str> = path.trim_start_matches('/').split('/').collect();
        let is_get = method.eq_ignore_ascii_case("GET");
        let is_post = method.eq_ignore_ascii_case("POST");

        match segments.as_slice() {
            ["v1", "projects", project, "secrets"] => {
                let params = PathParams::project(project);
                if is_get {
                    Some((GcpOperation::ListSecrets, params))
                } else if is_post {
                    Some((GcpOperation::CreateSecret, params))
                } else {
                    None
                }
            }
            ["v1", "projects", project, "secrets", secret] => {
                if let Some(secret) = secret.strip_suffix(":addVersion") {
                    is_post.then(|| {
                        (
                            GcpOperation::AddSecretVersion,
                            PathParams::project(project).with_secret(secret),
                        )
                    })
                } else if is_get && !secret.contains(':') {
                    Some((
                        GcpOperation::GetSecret,
                        PathParams::project(project).with_secret(secret),
                    ))
                } else {
                    None
                }
            }
            ["v1", "projects", project, "secrets", secret, "versions", version] => {
                let version = version.strip_suffix(":access")?;
                is_get.then(|| {
                    let mut params = PathParams::project(project).with_secret(secret);
                    params.version = Some(version.to_string());
                    (GcpOperation::AccessSecretVersion, params)
                })
            }
            ["v3", "projects", project_verb] if is_post => {
                let (project, verb) = project_verb.split_once(':')?;
                let operation = match verb {
                    "getIamPolicy" => GcpOperation::GetIamPolicy,
                    "setIamPolicy" => GcpOperation::SetIamPolicy,
                    _ => return None,
                };
                Some((operation, PathParams::project(project)))
            }
            ["v2", "projects", project, "locations", location, "services"] if is_post => {
                let mut params = PathParams::project(project);
                params.location = Some((*location).to_string());
                Some((GcpOperation::CreateService, params))
            }
            ["v1", "projects", project, "triggers"] if is_post => {
                Some((GcpOperation::CreateBuildTrigger, PathParams::project(project)))
            }
            _ => None,
        }
    }
}

/// Path parameters extracted from, or used to build, an operation path
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathParams {
    pub project: String,
    pub secret: Option<String>,
    pub version: Option<String>,
    pub location: Option<String>,
}

impl PathParams {
    pub fn project(project: &str) -> Self {
        Self {
            project: project.to_string(),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_secret(mut self, secret: &str) -> Self {
        self.secret = Some(secret.to_string());
        self
    }
}
