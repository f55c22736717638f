//! # Configuration Documents
//!
//! YAML documents read by `apply-config`, one per file:
//!
//! ```yaml
//! # iam/project.yaml
//! bindings:
//!   - role: roles/secretmanager.secretAccessor
//!     members:
//!       - serviceAccount:api@my-project.iam.gserviceaccount.com
//! ```
//!
//! ```yaml
//! # cloudrun/api.yaml
//! name: api
//! location: europe-west1
//! image: europe-docker.pkg.dev/my-project/api/api:1.4.0
//! env:
//!   - name: PORT
//!     value: 8080
//! resources:
//!   limits:
//!     cpu: 1
//!     memory: 512Mi
//! ```
//!
//! ```yaml
//! # cloudbuild/api.yaml
//! name: api-build
//! steps:
//!   - name: gcr.io/cloud-builders/docker
//!     args: ["build", "-t", "api", "."]
//! ```

use serde::de::{self, DeserializeOwned, Deserializer};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use std::{fs, io};
use thiserror::Error;

/// Errors raised while loading a configuration document
#[derive(Debug, Error)]
pub enum ConfigFileError {
    #[error("File {0} not found")]
    NotFound(String),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Invalid {kind} configuration in {path}: {message}")]
    Invalid {
        kind: &'static str,
        path: String,
        message: String,
    },
}

/// A YAML document with post-parse validation
pub trait Document: DeserializeOwned {
    /// Human readable kind used in error messages
    const KIND: &'static str;

    /// Check constraints serde cannot express (non-empty required strings)
    ///
    /// # Errors
    /// Returns a message describing the first violation
    fn validate(&self) -> Result<(), String>;
}

/// Read and parse a YAML document from disk
///
/// # Errors
/// Returns [`ConfigFileError`] when the file is missing, unreadable, malformed or invalid
pub fn load_document<T: Document>(path: &Path) -> Result<T, ConfigFileError> {
    let display = path.display().to_string();
    let contents = fs::read_to_string(path).map_err(|source| match source.kind() {
        io::ErrorKind::NotFound => ConfigFileError::NotFound(display.clone()),
        _ => ConfigFileError::Io {
            path: display.clone(),
            source,
        },
    })?;

    let document: T = serde_yaml::from_str(&contents).map_err(|source| ConfigFileError::Parse {
        path: display.clone(),
        source,
    })?;

    document
        .validate()
        .map_err(|message| ConfigFileError::Invalid {
            kind: T::KIND,
            path: display,
            message,
        })?;

    Ok(document)
}

/// YAML scalar read as text (`8080`, `true` and `"8080"` all become `"8080"`/`"true"`)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScalarString(pub String);

impl<'de> Deserialize<'de> for ScalarString {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        match serde_yaml::Value::deserialize(deserializer)? {
            serde_yaml::Value::String(s) => Ok(Self(s)),
            serde_yaml::Value::Number(n) => Ok(Self(n.to_string())),
            serde_yaml::Value::Bool(b) => Ok(Self(b.to_string())),
            serde_yaml::Value::Null => Ok(Self(String::new())),
            _ => Err(de::Error::custom("expected a scalar value")),
        }
    }
}

/// `iam/*.yaml`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IamConfig {
    #[serde(default)]
    pub bindings: Vec<IamBinding>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IamBinding {
    pub role: String,
    #[serde(default)]
    pub members: Vec<String>,
}

impl Document for IamConfig {
    const KIND: &'static str = "IAM";

    fn validate(&self) -> Result<(), String> {
        for (index, binding) in self.bindings.iter().enumerate() {
            if binding.role.trim().is_empty() {
                return Err(format!("bindings[{index}].role cannot be empty"));
            }
        }
        Ok(())
    }
}

/// `cloudrun/*.yaml`
#[derive(Debug, Clone, Deserialize)]
pub struct CloudRunConfig {
    pub name: String,
    pub location: String,
    pub image: String,
    #[serde(default)]
    pub env: Vec<EnvVarConfig>,
    #[serde(default)]
    pub resources: Option<ResourcesConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EnvVarConfig {
    pub name: String,
    #[serde(default)]
    pub value: ScalarString,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResourcesConfig {
    #[serde(default)]
    pub limits: BTreeMap<String, ScalarString>,
}

impl Document for CloudRunConfig {
    const KIND: &'static str = "Cloud Run";

    fn validate(&self) -> Result<(), String> {
        for (field, value) in [
            ("name", &self.name),
            ("location", &self.location),
            ("image", &self.image),
        ] {
            if value.trim().is_empty() {
                return Err(format!("{field} cannot be empty"));
            }
        }
        if let Some(index) = self.env.iter().position(|var| var.name.trim().is_empty()) {
            return Err(format!("env[{index}].name cannot be empty"));
        }
        Ok(())
    }
}

/// `cloudbuild/*.yaml`
#[derive(Debug, Clone, Deserialize)]
pub struct CloudBuildConfig {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub steps: Vec<BuildStepConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BuildStepConfig {
    pub name: String,
    #[serde(default)]
    pub args: Vec<ScalarString>,
}

impl Document for CloudBuildConfig {
    const KIND: &'static str = "Cloud Build";

    fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("name cannot be empty".to_string());
        }
        if let Some(index) = self.steps.iter().position(|step| step.name.trim().is_empty()) {
            return Err(format!("steps[{index}].name cannot be empty"));
        }
        Ok(())
    }
}
