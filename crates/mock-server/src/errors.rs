//! GCP error envelope
//!
//! Format: `{"error": {"code": 404, "message": "...", "status": "NOT_FOUND"}}`
//! Reference: https://cloud.google.com/apis/design/errors

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde_json::json;

/// Canonical status string for an HTTP status
pub fn gcp_status(status: StatusCode) -> &'static str {
    match status {
        StatusCode::NOT_FOUND => "NOT_FOUND",
        StatusCode::CONFLICT => "ALREADY_EXISTS",
        StatusCode::UNAUTHORIZED => "UNAUTHENTICATED",
        StatusCode::FORBIDDEN => "PERMISSION_DENIED",
        StatusCode::BAD_REQUEST => "INVALID_ARGUMENT",
        StatusCode::TOO_MANY_REQUESTS => "RESOURCE_EXHAUSTED",
        StatusCode::SERVICE_UNAVAILABLE => "UNAVAILABLE",
        StatusCode::INTERNAL_SERVER_ERROR => "INTERNAL",
        _ => "UNKNOWN",
    }
}

/// GCP error response
///
/// `status_string` overrides the canonical status derived from the HTTP status
/// (e.g. `ABORTED` for a 409 caused by a stale etag).
pub fn gcp_error_response(status: StatusCode, message: String, status_string: Option<&str>) -> Response {
    (
        status,
        Json(json!({
            "error": {
                "code": status.as_u16(),
                "message": message,
                "status": status_string.unwrap_or_else(|| gcp_status(status))
            }
        })),
    )
        .into_response()
}
