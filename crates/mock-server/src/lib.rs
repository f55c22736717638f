//! # GCP Mock Server
//!
//! In-memory axum server emulating the parts of the GCP REST APIs used by
//! `apply-config` and `opsctl`:
//!
//! - Secret Manager v1: create secret, add version, list, get, access version
//! - Resource Manager v3: project `getIamPolicy` / `setIamPolicy`
//! - Cloud Run v2: create service
//! - Cloud Build v1: create trigger
//!
//! All four services are served from one address, so every `GCP_*_ENDPOINT`
//! override can point at the same URL. Requests must carry a bearer token (any value).
//! Every matched request is recorded, and a failure can be injected for the next call
//! of an operation.
//!
//! Paths contain colons (`:addVersion`, `:access`, `:getIamPolicy`), so routing goes
//! through a single fallback handler that matches paths with [`GcpOperation::match_request`].

pub mod errors;

pub use errors::gcp_error_response;

use anyhow::{Context, Result};
use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::{header, HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::get;
use axum::Router;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use paths::gcp::{location_name, project_name, secret_name, secret_version_name, service_name};
use paths::{GcpOperation, PathParams};
use serde_json::{json, Value};
use std::collections::{BTreeMap, HashMap};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

/// Page size used by `secrets.list` when the request does not set one
const DEFAULT_PAGE_SIZE: usize = 25;

/// A request that matched a known operation
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub operation: GcpOperation,
    pub params: PathParams,
    pub query: HashMap<String, String>,
    pub body: Option<Value>,
}

/// Resources held by the mock
#[derive(Debug, Default)]
pub struct MockState {
    /// Secret name → base64 payloads, oldest first (version `n` is index `n - 1`)
    secrets: BTreeMap<String, Vec<String>>,
    /// Project id → IAM policy
    policies: HashMap<String, Value>,
    /// Service name → service
    services: BTreeMap<String, Value>,
    triggers: Vec<Value>,
    requests: Vec<RecordedRequest>,
    failures: HashMap<GcpOperation, StatusCode>,
    sequence: u64,
}

pub type SharedState = Arc<RwLock<MockState>>;

fn default_policy() -> Value {
    json!({ "version": 1, "etag": "BwE=", "bindings": [] })
}

fn bad_request(message: &str) -> Response {
    gcp_error_response(StatusCode::BAD_REQUEST, message.to_string(), None)
}

fn not_found(message: String) -> Response {
    gcp_error_response(StatusCode::NOT_FOUND, message, None)
}

fn already_exists(message: String) -> Response {
    gcp_error_response(StatusCode::CONFLICT, message, None)
}

impl MockState {
    fn next_sequence(&mut self) -> u64 {
        self.sequence += 1;
        self.sequence
    }

    fn dispatch(
        &mut self,
        operation: GcpOperation,
        params: &PathParams,
        query: &HashMap<String, String>,
        body: Option<&Value>,
    ) -> Response {
        let project = params.project.as_str();
        let secret = params.secret.as_deref().unwrap_or_default();

        match operation {
            GcpOperation::CreateSecret => self.create_secret(project, query.get("secretId")),
            GcpOperation::AddSecretVersion => self.add_secret_version(project, secret, body),
            GcpOperation::ListSecrets => self.list_secrets(project, query),
            GcpOperation::GetSecret => self.get_secret(project, secret),
            GcpOperation::AccessSecretVersion => {
                let version = params.version.as_deref().unwrap_or("latest");
                self.access_secret_version(project, secret, version)
            }
            GcpOperation::GetIamPolicy => self.get_iam_policy(project),
            GcpOperation::SetIamPolicy => self.set_iam_policy(project, body),
            GcpOperation::CreateService => {
                let location = params.location.as_deref().unwrap_or_default();
                self.create_service(project, location, query.get("serviceId"), body)
            }
            GcpOperation::CreateBuildTrigger => self.create_build_trigger(project, body),
        }
    }

    fn create_secret(&mut self, project: &str, secret_id: Option<&String>) -> Response {
        let Some(secret_id) = secret_id.filter(|id| !id.is_empty()) else {
            return bad_request("secretId is required");
        };
        let name = secret_name(project, secret_id);
        if self.secrets.contains_key(&name) {
            return already_exists(format!("Secret [{name}] already exists."));
        }

        self.secrets.insert(name.clone(), Vec::new());
        info!("  Created mock secret: {}", name);
        Json(json!({ "name": name, "replication": { "automatic": {} } })).into_response()
    }

    fn add_secret_version(&mut self, project: &str, secret: &str, body: Option<&Value>) -> Response {
        let Some(data) = body
            .and_then(|body| body.pointer("/payload/data"))
            .and_then(Value::as_str)
        else {
            return bad_request("payload.data is required");
        };
        if STANDARD.decode(data).is_err() {
            return bad_request("payload.data must be base64 encoded");
        }

        let name = secret_name(project, secret);
        let Some(versions) = self.secrets.get_mut(&name) else {
            return not_found(format!("Secret [{name}] not found."));
        };
        versions.push(data.to_string());
        let version = versions.len().to_string();

        info!("  Added version {} to mock secret: {}", version, name);
        Json(json!({
            "name": secret_version_name(project, secret, &version),
            "state": "ENABLED"
        }))
        .into_response()
    }

    fn list_secrets(&self, project: &str, query: &HashMap<String, String>) -> Response {
        let prefix = format!("{}/secrets/", project_name(project));
        let names: Vec<&String> = self
            .secrets
            .keys()
            .filter(|name| name.starts_with(&prefix))
            .collect();

        let page_size = query
            .get("pageSize")
            .and_then(|size| size.parse::<usize>().ok())
            .filter(|size| *size > 0)
            .unwrap_or(DEFAULT_PAGE_SIZE);
        let offset = match query.get("pageToken").map(String::as_str) {
            None | Some("") => 0,
            Some(token) => match token.parse::<usize>() {
                Ok(offset) => offset,
                Err(_) => return bad_request("Invalid page token"),
            },
        };

        let page: Vec<Value> = names
            .iter()
            .skip(offset)
            .take(page_size)
            .map(|name| json!({ "name": name }))
            .collect();

        let mut response = json!({ "secrets": page, "totalSize": names.len() });
        let next_offset = offset.saturating_add(page_size);
        if next_offset < names.len() {
            response["nextPageToken"] = json!(next_offset.to_string());
        }
        Json(response).into_response()
    }

    fn get_secret(&self, project: &str, secret: &str) -> Response {
        let name = secret_name(project, secret);
        if self.secrets.contains_key(&name) {
            Json(json!({ "name": name, "replication": { "automatic": {} } })).into_response()
        } else {
            not_found(format!("Secret [{name}] not found."))
        }
    }

    fn access_secret_version(&self, project: &str, secret: &str, version: &str) -> Response {
        let name = secret_name(project, secret);
        let versions = self.secrets.get(&name).map(Vec::as_slice).unwrap_or_default();
        let index = match version {
            "latest" => versions.len().checked_sub(1),
            number => number
                .parse::<usize>()
                .ok()
                .and_then(|number| number.checked_sub(1)),
        };

        match index.and_then(|index| versions.get(index).map(|data| (index, data))) {
            Some((index, data)) => Json(json!({
                "name": secret_version_name(project, secret, &(index + 1).to_string()),
                "payload": { "data": data }
            }))
            .into_response(),
            None => {
                warn!("  Secret version not found in store: {}/versions/{}", name, version);
                not_found(format!("Secret Version [{name}/versions/{version}] not found."))
            }
        }
    }

    fn get_iam_policy(&mut self, project: &str) -> Response {
        let policy = self
            .policies
            .entry(project.to_string())
            .or_insert_with(default_policy);
        Json(policy.clone()).into_response()
    }

    fn set_iam_policy(&mut self, project: &str, body: Option<&Value>) -> Response {
        let Some(policy) = body
            .and_then(|body| body.get("policy"))
            .filter(|policy| policy.is_object())
        else {
            return bad_request("policy is required");
        };

        let current_etag = self
            .policies
            .get(project)
            .cloned()
            .unwrap_or_else(default_policy)["etag"]
            .clone();
        if let Some(etag) = policy.get("etag") {
            if *etag != current_etag {
                return gcp_error_response(
                    StatusCode::CONFLICT,
                    "There were concurrent policy changes. Please retry the whole read-modify-write with exponential backoff.".to_string(),
                    Some("ABORTED"),
                );
            }
        }

        let mut stored = policy.clone();
        stored["etag"] = json!(format!("BwE{}", self.next_sequence()));
        self.policies.insert(project.to_string(), stored.clone());

        info!("  Updated IAM policy for {}", project_name(project));
        Json(stored).into_response()
    }

    fn create_service(
        &mut self,
        project: &str,
        location: &str,
        service_id: Option<&String>,
        body: Option<&Value>,
    ) -> Response {
        let Some(service_id) = service_id.filter(|id| !id.is_empty()) else {
            return bad_request("serviceId is required");
        };
        let Some(service) = body.filter(|body| body.is_object()) else {
            return bad_request("service is required");
        };

        let name = service_name(project, location, service_id);
        if self.services.contains_key(&name) {
            return already_exists(format!("Resource '{service_id}' already exists."));
        }

        let mut stored = service.clone();
        stored["name"] = json!(name);
        self.services.insert(name.clone(), stored);

        info!("  Created mock Cloud Run service: {}", name);
        let operation = format!(
            "{}/operations/op-{}",
            location_name(project, location),
            self.next_sequence()
        );
        Json(json!({ "name": operation, "done": false })).into_response()
    }

    fn create_build_trigger(&mut self, project: &str, body: Option<&Value>) -> Response {
        let Some(trigger_name) = body
            .and_then(|body| body.get("name"))
            .and_then(Value::as_str)
            .filter(|name| !name.is_empty())
        else {
            return bad_request("trigger.name is required");
        };
        if self
            .triggers
            .iter()
            .any(|trigger| trigger["name"] == trigger_name)
        {
            return already_exists(format!("trigger {trigger_name} already exists"));
        }

        let mut stored = body.cloned().unwrap_or_default();
        stored["id"] = json!(format!("trigger-{}", self.next_sequence()));
        stored["resourceName"] = json!(format!(
            "{}/locations/global/triggers/{}",
            project_name(project),
            trigger_name
        ));
        self.triggers.push(stored.clone());

        info!("  Created mock Cloud Build trigger: {}", trigger_name);
        Json(stored).into_response()
    }
}

fn has_bearer_token(headers: &HeaderMap) -> bool {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .is_some_and(|token| !token.trim().is_empty())
}

async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Handler for every API route
async fn handle_request(
    State(state): State<SharedState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
    body: Bytes,
) -> Response {
    let Some((operation, params)) = GcpOperation::match_request(method.as_str(), uri.path())
    else {
        warn!("  Unhandled request: {} {}", method, uri.path());
        return not_found(format!("Method not found: {} {}", method, uri.path()));
    };

    let body = if body.is_empty() {
        None
    } else {
        match serde_json::from_slice::<Value>(&body) {
            Ok(body) => Some(body),
            Err(e) => return bad_request(&format!("Invalid JSON payload received: {e}")),
        }
    };

    if !has_bearer_token(&headers) {
        return gcp_error_response(
            StatusCode::UNAUTHORIZED,
            "Request is missing required authentication credential.".to_string(),
            None,
        );
    }

    info!("  {} {} ({})", method, uri.path(), operation.as_str());
    let mut store = state.write().await;
    store.requests.push(RecordedRequest {
        operation,
        params: params.clone(),
        query: query.clone(),
        body: body.clone(),
    });

    if let Some(status) = store.failures.remove(&operation) {
        warn!("  Injected {} for {}", status.as_u16(), operation.as_str());
        return gcp_error_response(
            status,
            format!("Injected failure for {}", operation.as_str()),
            None,
        );
    }

    store.dispatch(operation, &params, &query, body.as_ref())
}

/// Router serving all four APIs plus `/health`
pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .fallback(handle_request)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// A mock server running on a random local port for the lifetime of the value
#[derive(Debug)]
pub struct MockServer {
    addr: SocketAddr,
    state: SharedState,
    handle: JoinHandle<()>,
}

impl MockServer {
    /// Start a server on `127.0.0.1` with an OS-assigned port
    ///
    /// # Errors
    /// Returns an error if the listener cannot be bound
    pub async fn start() -> Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .context("Failed to bind mock server listener")?;
        let addr = listener
            .local_addr()
            .context("Failed to read mock server address")?;

        let state = SharedState::default();
        let app = router(Arc::clone(&state));
        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                error!("Mock server error: {}", e);
            }
        });

        Ok(Self { addr, state, handle })
    }

    /// Base URL, usable for every `GCP_*_ENDPOINT` override
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Create a secret (if needed) and add `value` as its newest version
    pub async fn seed_secret(&self, project: &str, secret: &str, value: &str) {
        self.state
            .write()
            .await
            .secrets
            .entry(secret_name(project, secret))
            .or_default()
            .push(STANDARD.encode(value));
    }

    /// Create a secret with no versions
    pub async fn seed_empty_secret(&self, project: &str, secret: &str) {
        self.state
            .write()
            .await
            .secrets
            .entry(secret_name(project, secret))
            .or_default();
    }

    /// Decoded payloads of a secret, oldest first; `None` if the secret does not exist
    pub async fn secret_values(&self, project: &str, secret: &str) -> Option<Vec<String>> {
        let state = self.state.read().await;
        state.secrets.get(&secret_name(project, secret)).map(|versions| {
            versions
                .iter()
                .filter_map(|data| STANDARD.decode(data).ok())
                .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
                .collect()
        })
    }

    /// Current IAM policy of a project
    pub async fn iam_policy(&self, project: &str) -> Value {
        self.state
            .read()
            .await
            .policies
            .get(project)
            .cloned()
            .unwrap_or_else(default_policy)
    }

    /// Services created so far, keyed by full service name
    pub async fn services(&self) -> BTreeMap<String, Value> {
        self.state.read().await.services.clone()
    }

    /// Triggers created so far, in creation order
    pub async fn triggers(&self) -> Vec<Value> {
        self.state.read().await.triggers.clone()
    }

    /// Every matched request, in arrival order
    pub async fn requests(&self) -> Vec<RecordedRequest> {
        self.state.read().await.requests.clone()
    }

    /// Matched requests for one operation, in arrival order
    pub async fn requests_for(&self, operation: GcpOperation) -> Vec<RecordedRequest> {
        self.state
            .read()
            .await
            .requests
            .iter()
            .filter(|request| request.operation == operation)
            .cloned()
            .collect()
    }

    /// Fail the next call of `operation` with `status`
    pub async fn fail_next(&self, operation: GcpOperation, status: StatusCode) {
        self.state.write().await.failures.insert(operation, status);
    }
}

impl Drop for MockServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
