//! Wire types exchanged with the provider API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Provider user upsert body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserPayload {
    pub uid: String,
    pub name: String,
    pub email: String,
    pub picture: Option<String>,
}

/// Claims posted to the provider's token endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenClaims {
    pub sub: String,
    pub name: String,
    pub email: String,
    pub picture: Option<String>,
    pub iss: String,
    pub aud: String,
    pub exp: i64,
    pub iat: i64,
}

/// Provider token endpoint response.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub expires_in: Option<i64>,
}

/// Outgoing agent body for create and update.
///
/// Optional text fields are skipped when absent so the provider never
/// receives blank strings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgentPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub knowledge_base_id: Option<u64>,
}

/// An agent as returned to the browser.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    pub id: u64,
    pub uid: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub knowledge_base_id: Option<u64>,
    #[serde(default)]
    pub provider: String,
    #[serde(default)]
    pub model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Provider list envelope. Both fields may be missing on an empty tenant.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AgentPage {
    #[serde(default)]
    pub data: Option<Vec<Agent>>,
    #[serde(default)]
    pub count: Option<u64>,
}

/// Knowledge base creation body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KnowledgeBasePayload {
    pub uid: String,
    #[serde(rename = "type")]
    pub kind: String,
}

/// A knowledge base container as created by the provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeBase {
    pub id: u64,
    #[serde(default)]
    pub uid: Option<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

/// Provider user records are passed through untouched.
pub type User = Value;
