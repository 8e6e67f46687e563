//! Mapping of crate errors onto HTTP responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value};

use crate::error::Error;

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, body) = error_body(&self);
        if status.is_server_error() {
            tracing::error!("{} -> {}", self, status);
        } else {
            tracing::debug!("{} -> {}", self, status);
        }
        (status, Json(body)).into_response()
    }
}

/// Status and JSON body for an error
pub fn error_body(err: &Error) -> (StatusCode, Value) {
    match err {
        Error::Validation(message) => (StatusCode::BAD_REQUEST, json!({ "error": message })),
        Error::NotFound(resource) => (
            StatusCode::NOT_FOUND,
            json!({ "error": format!("{} not found", resource) }),
        ),
        Error::Upstream(failure) => {
            let status = StatusCode::from_u16(failure.status).unwrap_or(StatusCode::BAD_GATEWAY);
            (
                status,
                json!({
                    "error": failure.message,
                    "details": failure.detail,
                    "status": failure.status,
                }),
            )
        }
        Error::Parse(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            json!({ "error": "Invalid response from provider" }),
        ),
        Error::Orphaned {
            knowledge_base_id,
            source,
        } => {
            let (status, mut body) = error_body(source);
            body["orphanedKnowledgeBaseId"] = json!(knowledge_base_id);
            (status, body)
        }
        other => (
            StatusCode::INTERNAL_SERVER_ERROR,
            json!({
                "error": "Internal server error",
                "details": other.to_string(),
            }),
        ),
    }
}
