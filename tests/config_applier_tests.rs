//! # Config Applier Integration Tests
//!
//! Applies YAML config trees through the REST clients against the in-process mock server.
//!
//! These tests verify:
//! - One IAM binding produces exactly one setIamPolicy call with its role and members
//! - Re-applying an IAM file appends duplicate bindings
//! - Cloud Run and Cloud Build documents become create calls
//! - Missing directories are skipped and non-yaml files ignored
//! - The first failure stops the run

use gcp_config_tools::{ConfigApplier, ConfigKind, ToolConfig};
use gcp_mock_server::MockServer;
use paths::GcpOperation;
use reqwest::StatusCode;
use serde_json::json;
use std::fs;
use std::path::Path;
use tempfile::{tempdir, TempDir};

const PROJECT: &str = "test-project";

fn applier(server: &MockServer) -> ConfigApplier {
    ConfigApplier::from_config(PROJECT, &ToolConfig::for_mock_server(&server.url())).unwrap()
}

fn write(root: &Path, relative: &str, contents: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

fn iam_tree() -> TempDir {
    let root = tempdir().unwrap();
    write(
        root.path(),
        "iam/project.yaml",
        r#"
bindings:
  - role: roles/secretmanager.secretAccessor
    members:
      - serviceAccount:api@test-project.iam.gserviceaccount.com
      - group:platform@example.com
"#,
    );
    root
}

#[tokio::test]
async fn test_iam_binding_produces_one_policy_update() {
    let server = MockServer::start().await.unwrap();
    let root = iam_tree();
    let applier = applier(&server);
    assert_eq!(applier.project_id(), PROJECT);

    let summary = applier.apply_all(root.path()).await.unwrap();
    assert_eq!(summary.iam_files, 1);
    assert_eq!(summary.skipped_dirs, vec!["cloudrun", "cloudbuild"]);

    let set_calls = server.requests_for(GcpOperation::SetIamPolicy).await;
    assert_eq!(set_calls.len(), 1);
    let bindings = &set_calls[0].body.as_ref().unwrap()["policy"]["bindings"];
    assert_eq!(
        *bindings,
        json!([{
            "role": "roles/secretmanager.secretAccessor",
            "members": [
                "serviceAccount:api@test-project.iam.gserviceaccount.com",
                "group:platform@example.com"
            ]
        }])
    );
    assert_eq!(server.requests_for(GcpOperation::GetIamPolicy).await.len(), 1);
}

#[tokio::test]
async fn test_reapplying_iam_appends_duplicate_bindings() {
    let server = MockServer::start().await.unwrap();
    let root = iam_tree();
    let applier = applier(&server);

    applier.apply_all(root.path()).await.unwrap();
    applier.apply_all(root.path()).await.unwrap();

    let policy = server.iam_policy(PROJECT).await;
    let bindings = policy["bindings"].as_array().unwrap();
    assert_eq!(bindings.len(), 2);
    assert_eq!(bindings[0], bindings[1]);
}

#[tokio::test]
async fn test_each_binding_is_a_separate_read_modify_write() {
    let server = MockServer::start().await.unwrap();
    let root = tempdir().unwrap();
    write(
        root.path(),
        "iam/roles.yaml",
        "bindings:\n  - role: roles/run.invoker\n    members: [allUsers]\n  - role: roles/viewer\n    members: [user:ana@example.com]\n",
    );

    let applied = applier(&server)
        .apply_iam_config(&root.path().join("iam/roles.yaml"))
        .await
        .unwrap();
    assert_eq!(applied, 2);
    assert_eq!(server.requests_for(GcpOperation::GetIamPolicy).await.len(), 2);
    assert_eq!(server.requests_for(GcpOperation::SetIamPolicy).await.len(), 2);

    let policy = server.iam_policy(PROJECT).await;
    let roles: Vec<_> = policy["bindings"]
        .as_array()
        .unwrap()
        .iter()
        .map(|binding| binding["role"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(roles, vec!["roles/run.invoker", "roles/viewer"]);
}

#[tokio::test]
async fn test_cloudrun_config_creates_service() {
    let server = MockServer::start().await.unwrap();
    let root = tempdir().unwrap();
    write(
        root.path(),
        "cloudrun/api.yaml",
        r#"
name: api
location: europe-west1
image: europe-docker.pkg.dev/test-project/api/api:1.4.0
env:
  - name: PORT
    value: 8080
  - name: RUST_LOG
    value: info
resources:
  limits:
    cpu: 1
    memory: 512Mi
"#,
    );

    let summary = applier(&server).apply_all(root.path()).await.unwrap();
    assert_eq!(summary.cloudrun_files, 1);

    let create = &server.requests_for(GcpOperation::CreateService).await[0];
    assert_eq!(create.params.location.as_deref(), Some("europe-west1"));
    assert_eq!(create.query.get("serviceId").map(String::as_str), Some("api"));

    let services = server.services().await;
    let service = &services["projects/test-project/locations/europe-west1/services/api"];
    let container = &service["template"]["containers"][0];
    assert_eq!(container["image"], "europe-docker.pkg.dev/test-project/api/api:1.4.0");
    assert_eq!(container["env"][0], json!({"name": "PORT", "value": "8080"}));
    assert_eq!(container["resources"]["limits"], json!({"cpu": "1", "memory": "512Mi"}));
}

#[tokio::test]
async fn test_cloudbuild_config_creates_trigger() {
    let server = MockServer::start().await.unwrap();
    let root = tempdir().unwrap();
    write(
        root.path(),
        "cloudbuild/api.yaml",
        r#"
name: api-build
description: Build and push the API image
steps:
  - name: gcr.io/cloud-builders/docker
    args: ["build", "-t", "europe-docker.pkg.dev/test-project/api/api", "."]
  - name: gcr.io/cloud-builders/docker
    args: ["push", "europe-docker.pkg.dev/test-project/api/api"]
"#,
    );

    applier(&server)
        .apply(ConfigKind::CloudBuild, &root.path().join("cloudbuild/api.yaml"))
        .await
        .unwrap();

    let triggers = server.triggers().await;
    assert_eq!(triggers.len(), 1);
    assert_eq!(triggers[0]["name"], "api-build");
    assert_eq!(triggers[0]["build"]["steps"].as_array().unwrap().len(), 2);
    assert_eq!(triggers[0]["build"]["steps"][1]["args"][0], "push");
}

#[tokio::test]
async fn test_missing_directories_and_other_files_are_skipped() {
    let server = MockServer::start().await.unwrap();
    let root = tempdir().unwrap();
    fs::create_dir_all(root.path().join("iam")).unwrap();
    write(root.path(), "iam/README.md", "not a config");
    write(root.path(), "iam/legacy.yml", "bindings: [{role: roles/owner}]");

    let summary = applier(&server).apply_all(root.path()).await.unwrap();
    assert_eq!(summary.total_files(), 0);
    assert_eq!(summary.skipped_dirs, vec!["cloudrun", "cloudbuild"]);
    assert!(server.requests().await.is_empty());
}

#[tokio::test]
async fn test_first_failure_stops_the_run() {
    let server = MockServer::start().await.unwrap();
    let root = iam_tree();
    write(
        root.path(),
        "cloudbuild/api.yaml",
        "name: api-build\nsteps:\n  - name: gcr.io/cloud-builders/docker\n",
    );
    server
        .fail_next(GcpOperation::SetIamPolicy, StatusCode::FORBIDDEN)
        .await;

    let err = applier(&server).apply_all(root.path()).await.unwrap_err();
    assert!(format!("{err:#}").contains("HTTP 403"));
    assert!(server.requests_for(GcpOperation::CreateBuildTrigger).await.is_empty());
}

#[tokio::test]
async fn test_invalid_document_is_rejected_before_any_call() {
    let server = MockServer::start().await.unwrap();
    let root = tempdir().unwrap();
    write(root.path(), "cloudrun/broken.yaml", "name: api\nlocation: europe-west1\n");

    let err = applier(&server)
        .apply_cloudrun_config(&root.path().join("cloudrun/broken.yaml"))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("broken.yaml"));
    assert!(server.requests().await.is_empty());
}
