//! # Resource Types
//!
//! JSON representations of the remote resources the tools create or modify.
//! Field names follow the REST API schemas (camelCase on the wire).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// An IAM policy: a collection of bindings of principals to roles
///
/// Fields this tool does not manage (`auditConfigs`, ...) are kept in `extra`
/// so a read-modify-write round trip does not drop them.
#[derive(Clone, PartialEq, Deserialize, Serialize, Default, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Policy {
    #[serde(default)]
    pub version: i32,
    #[serde(default)]
    pub bindings: Vec<Binding>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub etag: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Associates `members`, or principals, with a `role`
#[derive(Clone, PartialEq, Deserialize, Serialize, Default, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Binding {
    pub role: String,
    #[serde(default)]
    pub members: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<Condition>,
}

#[derive(Clone, PartialEq, Deserialize, Serialize, Default, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    pub expression: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub title: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
}

/// Cloud Run v2 service
#[derive(Clone, PartialEq, Deserialize, Serialize, Default, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    /// `projects/{project}/locations/{location}/services/{service}`
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    pub template: RevisionTemplate,
}

#[derive(Clone, PartialEq, Deserialize, Serialize, Default, Debug)]
#[serde(rename_all = "camelCase")]
pub struct RevisionTemplate {
    #[serde(default)]
    pub containers: Vec<Container>,
}

#[derive(Clone, PartialEq, Deserialize, Serialize, Default, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Container {
    pub image: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub env: Vec<EnvVar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resources: Option<ResourceRequirements>,
}

#[derive(Clone, PartialEq, Deserialize, Serialize, Default, Debug)]
pub struct EnvVar {
    pub name: String,
    #[serde(default)]
    pub value: String,
}

#[derive(Clone, PartialEq, Deserialize, Serialize, Default, Debug)]
pub struct ResourceRequirements {
    #[serde(default)]
    pub limits: BTreeMap<String, String>,
}

/// Long-running operation returned by Cloud Run mutations
#[derive(Clone, PartialEq, Deserialize, Serialize, Default, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    pub name: String,
    #[serde(default)]
    pub done: bool,
}

/// Cloud Build trigger
#[derive(Clone, PartialEq, Deserialize, Serialize, Default, Debug)]
#[serde(rename_all = "camelCase")]
pub struct BuildTrigger {
    /// Server-assigned identifier, empty on create
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub build: Build,
}

#[derive(Clone, PartialEq, Deserialize, Serialize, Default, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Build {
    #[serde(default)]
    pub steps: Vec<BuildStep>,
}

#[derive(Clone, PartialEq, Deserialize, Serialize, Default, Debug)]
#[serde(rename_all = "camelCase")]
pub struct BuildStep {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_policy_round_trip_keeps_unmanaged_fields() {
        let raw = json!({
            "version": 1,
            "etag": "BwWWja0YfJA=",
            "bindings": [{"role": "roles/viewer", "members": ["user:eve@example.com"]}],
            "auditConfigs": [{"service": "allServices"}]
        });
        let policy: Policy = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(policy.bindings.len(), 1);
        assert_eq!(serde_json::to_value(&policy).unwrap(), raw);
    }

    #[test]
    fn test_service_serializes_camel_case_without_empty_fields() {
        let service = Service {
            name: String::new(),
            template: RevisionTemplate {
                containers: vec![Container {
                    image: "gcr.io/p/api:1".to_string(),
                    ..Default::default()
                }],
            },
        };
        assert_eq!(
            serde_json::to_value(&service).unwrap(),
            json!({"template": {"containers": [{"image": "gcr.io/p/api:1"}]}})
        );
    }
}
