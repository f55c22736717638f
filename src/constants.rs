//! # Constants
//!
//! Defaults for settings that can be overridden from the environment.

/// Environment variable holding the target project
pub const PROJECT_ID_ENV_VAR: &str = "GCP_PROJECT_ID";

/// Environment variable holding a pre-minted OAuth access token
pub const ACCESS_TOKEN_ENV_VAR: &str = "GCP_ACCESS_TOKEN";

/// Environment variable enabling mock endpoints and a dummy token
pub const PACT_MODE_ENV_VAR: &str = "PACT_MODE";

/// Environment variable overriding the metadata server host
pub const METADATA_HOST_ENV_VAR: &str = "GCE_METADATA_HOST";

/// Environment variable overriding the HTTP timeout
pub const HTTP_TIMEOUT_ENV_VAR: &str = "HTTP_TIMEOUT_SECS";

/// Environment variable overriding the `list-secrets` page size
pub const LIST_PAGE_SIZE_ENV_VAR: &str = "LIST_PAGE_SIZE";

/// GCE metadata server host (overridable via `GCE_METADATA_HOST`)
pub const DEFAULT_METADATA_HOST: &str = "metadata.google.internal";

/// Path of the default service account token on the metadata server
pub const METADATA_TOKEN_PATH: &str = "/computeMetadata/v1/instance/service-accounts/default/token";

/// HTTP request timeout (seconds)
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Page size requested when listing secrets
pub const DEFAULT_LIST_PAGE_SIZE: u32 = 100;

/// Refresh cached tokens this many seconds before they expire
pub const TOKEN_EXPIRY_SKEW_SECS: u64 = 60;

/// Default `.env` file used by `opsctl --action update-from-env`
pub const DEFAULT_ENV_FILE: &str = ".env";

/// IAM policy version requested on read (3 preserves conditional bindings)
pub const IAM_POLICY_VERSION: i32 = 3;
