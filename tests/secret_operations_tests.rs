//! # Secret Operations Integration Tests
//!
//! Drives `SecretOperations` and the `opsctl` actions through the Secret Manager REST
//! client against the in-process mock server.
//!
//! These tests verify:
//! - update-secret creates missing secrets and adds a version
//! - get-secret reads the decoded `latest` version
//! - list-secrets follows pagination
//! - update-from-env pushes only the mapped variables present in the file
//! - validate fails (exit code 1) when a required secret is missing

use gcp_config_tools::manager::{run_action, EnvUpdateReport, ManagerError};
use gcp_config_tools::provider::gcp::ApiError;
use gcp_config_tools::{Action, ActionOutcome, ActionRequest, SecretOperations, ToolConfig};
use gcp_mock_server::MockServer;
use paths::GcpOperation;
use reqwest::StatusCode;
use std::fs;
use tempfile::tempdir;
use zeroize::Zeroizing;

const PROJECT: &str = "test-project";

fn operations(server: &MockServer) -> SecretOperations {
    SecretOperations::from_config(PROJECT, &ToolConfig::for_mock_server(&server.url())).unwrap()
}

#[tokio::test]
async fn test_update_secret_creates_then_adds_version() {
    let server = MockServer::start().await.unwrap();
    let version = operations(&server)
        .update_secret("api-key", "first")
        .await
        .unwrap();

    assert_eq!(version, "projects/test-project/secrets/api-key/versions/1");
    assert_eq!(server.requests_for(GcpOperation::CreateSecret).await.len(), 1);
    assert_eq!(
        server.secret_values(PROJECT, "api-key").await,
        Some(vec!["first".to_string()])
    );

    let create = &server.requests_for(GcpOperation::CreateSecret).await[0];
    assert_eq!(create.query.get("secretId").map(String::as_str), Some("api-key"));
    assert!(create.body.as_ref().unwrap()["replication"]["automatic"].is_object());
}

#[tokio::test]
async fn test_update_existing_secret_only_adds_version() {
    let server = MockServer::start().await.unwrap();
    server.seed_secret(PROJECT, "api-key", "old").await;

    operations(&server)
        .update_secret("api-key", "new")
        .await
        .unwrap();

    assert!(server.requests_for(GcpOperation::CreateSecret).await.is_empty());
    assert_eq!(
        server.secret_values(PROJECT, "api-key").await,
        Some(vec!["old".to_string(), "new".to_string()])
    );
}

#[tokio::test]
async fn test_get_secret_reads_latest_version() {
    let server = MockServer::start().await.unwrap();
    server.seed_secret(PROJECT, "jwt-secret", "v1").await;
    server.seed_secret(PROJECT, "jwt-secret", "v2 with spaces").await;

    let value = operations(&server).get_secret("jwt-secret").await.unwrap();
    assert_eq!(value.as_str(), "v2 with spaces");

    let access = &server.requests_for(GcpOperation::AccessSecretVersion).await[0];
    assert_eq!(access.params.secret.as_deref(), Some("jwt-secret"));
    assert_eq!(access.params.version.as_deref(), Some("latest"));
}

#[tokio::test]
async fn test_get_missing_secret_fails() {
    let server = MockServer::start().await.unwrap();
    let err = operations(&server).get_secret("nope").await.unwrap_err();

    assert!(matches!(
        err.downcast_ref::<ManagerError>(),
        Some(ManagerError::SecretNotFound(id)) if id == "nope"
    ));
}

#[tokio::test]
async fn test_get_secret_without_versions_fails() {
    let server = MockServer::start().await.unwrap();
    server.seed_empty_secret(PROJECT, "redis-url").await;

    let operations = operations(&server);
    assert_eq!(operations.project_id(), PROJECT);
    let err = operations.get_secret("redis-url").await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ManagerError>(),
        Some(ManagerError::SecretNotFound(id)) if id == "redis-url"
    ));
    assert_eq!(server.secret_values(PROJECT, "redis-url").await, Some(vec![]));
}

#[tokio::test]
async fn test_list_secrets_follows_pagination() {
    let server = MockServer::start().await.unwrap();
    for id in ["api-key", "database-url", "jwt-secret", "redis-url", "smtp-password"] {
        server.seed_secret(PROJECT, id, "x").await;
    }
    server.seed_secret("other-project", "unrelated", "x").await;

    let mut config = ToolConfig::for_mock_server(&server.url());
    config.list_page_size = 2;
    let operations = SecretOperations::from_config(PROJECT, &config).unwrap();

    let secrets = operations.list_secrets().await.unwrap();
    assert_eq!(
        secrets,
        vec!["api-key", "database-url", "jwt-secret", "redis-url", "smtp-password"]
    );
    assert_eq!(server.requests_for(GcpOperation::ListSecrets).await.len(), 3);
}

#[tokio::test]
async fn test_update_from_env_updates_present_subset() {
    let server = MockServer::start().await.unwrap();
    let dir = tempdir().unwrap();
    let env_file = dir.path().join(".env.production");
    fs::write(
        &env_file,
        "DATABASE_URL=postgres://prod-db:5432/app\nAPI_KEY=key-123\nLOG_LEVEL=debug\n",
    )
    .unwrap();

    let report: EnvUpdateReport = operations(&server)
        .update_from_env(&env_file)
        .await
        .unwrap();

    let updated: Vec<_> = report.updated.iter().map(|m| m.secret_id).collect();
    let missing: Vec<_> = report.missing.iter().map(|m| m.env_var).collect();
    assert_eq!(updated, vec!["database-url", "api-key"]);
    assert_eq!(missing, vec!["REDIS_URL", "JWT_SECRET"]);

    assert_eq!(
        server.secret_values(PROJECT, "database-url").await,
        Some(vec!["postgres://prod-db:5432/app".to_string()])
    );
    assert_eq!(server.secret_values(PROJECT, "redis-url").await, None);
    assert_eq!(server.secret_values(PROJECT, "log-level").await, None);
}

#[tokio::test]
async fn test_update_from_env_keeps_dollar_signs() {
    let server = MockServer::start().await.unwrap();
    let dir = tempdir().unwrap();
    let env_file = dir.path().join(".env");
    fs::write(
        &env_file,
        "JWT_SECRET=abc$def\nREDIS_URL=redis://:pa$$w0rd@host:6379\nAPI_KEY=\"p@ss$word1\"\nDATABASE_URL='postgres://app:$ecret@db/app'\n",
    )
    .unwrap();

    let report = operations(&server).update_from_env(&env_file).await.unwrap();
    assert_eq!(report.updated.len(), 4);
    assert!(report.missing.is_empty());

    for (secret_id, expected) in [
        ("jwt-secret", "abc$def"),
        ("redis-url", "redis://:pa$$w0rd@host:6379"),
        ("api-key", "p@ss$word1"),
        ("database-url", "postgres://app:$ecret@db/app"),
    ] {
        assert_eq!(
            server.secret_values(PROJECT, secret_id).await,
            Some(vec![expected.to_string()])
        );
    }
}

#[tokio::test]
async fn test_validate_action_exit_codes() {
    let server = MockServer::start().await.unwrap();
    for id in ["database-url", "redis-url", "jwt-secret"] {
        server.seed_secret(PROJECT, id, "x").await;
    }
    let operations = operations(&server);
    let request = ActionRequest::new(Action::Validate);

    let outcome = run_action(&operations, &request).await.unwrap();
    assert!(matches!(outcome, ActionOutcome::Validated(false)));
    assert_eq!(outcome.exit_code(), 1);

    server.seed_secret(PROJECT, "api-key", "x").await;
    let outcome = run_action(&operations, &request).await.unwrap();
    assert!(matches!(outcome, ActionOutcome::Validated(true)));
    assert_eq!(outcome.exit_code(), 0);
}

#[tokio::test]
async fn test_validate_treats_lookup_errors_as_missing() {
    let server = MockServer::start().await.unwrap();
    for id in ["database-url", "redis-url", "jwt-secret", "api-key"] {
        server.seed_secret(PROJECT, id, "x").await;
    }
    server
        .fail_next(GcpOperation::GetSecret, StatusCode::FORBIDDEN)
        .await;

    assert!(!operations(&server).validate().await);
}

#[tokio::test]
async fn test_update_secret_action_requires_value() {
    let server = MockServer::start().await.unwrap();
    let mut request = ActionRequest::new(Action::UpdateSecret);
    request.secret_id = Some("api-key".to_string());

    let err = run_action(&operations(&server), &request).await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ManagerError>(),
        Some(ManagerError::MissingArgument("secret-value"))
    ));
    assert!(server.requests().await.is_empty());

    request.secret_value = Some(Zeroizing::new("value".to_string()));
    let outcome = run_action(&operations(&server), &request).await.unwrap();
    assert!(matches!(outcome, ActionOutcome::Updated { ref secret_id, .. } if secret_id == "api-key"));
}

#[tokio::test]
async fn test_remote_errors_carry_status() {
    let server = MockServer::start().await.unwrap();
    server
        .fail_next(GcpOperation::AddSecretVersion, StatusCode::FORBIDDEN)
        .await;

    let err = operations(&server)
        .update_secret("api-key", "value")
        .await
        .unwrap_err();
    let api_error = err.downcast_ref::<ApiError>().unwrap();
    assert_eq!(api_error.status(), Some(403));
    assert!(format!("{err:#}").contains("add_secret_version failed: HTTP 403"));
}
