//! Normalization of provider error bodies.
//!
//! The provider is not consistent about its error shape: some endpoints
//! answer `{"message": ...}`, others `{"error": ...}` or problem-details
//! style `{"title": ..., "detail": ...}`, and some answer plain text. Every
//! outbound call site funnels non-success responses through
//! [`normalize_failure`].

use std::fmt;

use serde::Serialize;
use serde_json::Value;

/// Broad classification of a failed provider call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    NotFound,
    Upstream,
}

/// A provider failure reduced to `{kind, message, detail}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProviderFailure {
    pub kind: FailureKind,
    pub status: u16,
    pub message: String,
    pub detail: String,
}

impl fmt::Display for ProviderFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}): {}", self.status, self.message)
    }
}

const MESSAGE_KEYS: &[&str] = &["message", "error", "title"];
const DETAIL_KEYS: &[&str] = &["detail", "details"];

/// Reduce a non-success provider response to a [`ProviderFailure`].
///
/// `fallback` is used as the message when the body offers none.
pub fn normalize_failure(status: u16, body: &str, fallback: &str) -> ProviderFailure {
    let kind = if status == 404 {
        FailureKind::NotFound
    } else {
        FailureKind::Upstream
    };

    let (message, detail) = match serde_json::from_str::<Value>(body) {
        Ok(value) if value.is_object() => {
            let message = first_string(&value, MESSAGE_KEYS).unwrap_or_else(|| fallback.to_string());
            let detail = first_string(&value, DETAIL_KEYS).unwrap_or_else(|| body.to_string());
            (message, detail)
        }
        _ => {
            let message = if body.trim().is_empty() {
                fallback.to_string()
            } else {
                body.to_string()
            };
            (message, body.to_string())
        }
    };

    ProviderFailure {
        kind,
        status,
        message,
        detail,
    }
}

fn first_string(value: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| value.get(*key))
        .filter_map(Value::as_str)
        .find(|s| !s.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_key_precedence() {
        let body = r#"{"title": "Bad Request", "error": "uid taken", "message": "Agent exists"}"#;
        let failure = normalize_failure(400, body, "Failed to create agent");
        assert_eq!(failure.kind, FailureKind::Upstream);
        assert_eq!(failure.message, "Agent exists");
        assert_eq!(failure.detail, body);
    }

    #[test]
    fn test_problem_details_shape() {
        let body = r#"{"type": "about:blank", "title": "Validation failed", "detail": "name is too long"}"#;
        let failure = normalize_failure(422, body, "Failed to update agent");
        assert_eq!(failure.message, "Validation failed");
        assert_eq!(failure.detail, "name is too long");
    }

    #[test]
    fn test_details_plural() {
        let failure = normalize_failure(409, r#"{"error": "conflict", "details": "slug in use"}"#, "x");
        assert_eq!(failure.message, "conflict");
        assert_eq!(failure.detail, "slug in use");
    }

    #[test]
    fn test_json_without_known_keys_uses_fallback() {
        let failure = normalize_failure(500, r#"{"code": 17}"#, "Failed to update agent");
        assert_eq!(failure.message, "Failed to update agent");
        assert_eq!(failure.detail, r#"{"code": 17}"#);
    }

    #[test]
    fn test_non_string_error_field_is_skipped() {
        let failure = normalize_failure(400, r#"{"error": {"code": 1}, "title": "Bad"}"#, "x");
        assert_eq!(failure.message, "Bad");
    }

    #[test]
    fn test_plain_text_body() {
        let failure = normalize_failure(502, "Bad Gateway", "Failed to get agents");
        assert_eq!(failure.message, "Bad Gateway");
        assert_eq!(failure.detail, "Bad Gateway");
    }

    #[test]
    fn test_empty_body() {
        let failure = normalize_failure(404, "", "Agent not found");
        assert_eq!(failure.kind, FailureKind::NotFound);
        assert_eq!(failure.message, "Agent not found");
        assert_eq!(failure.detail, "");
    }
}
