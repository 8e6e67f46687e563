//! Provider API abstraction.
//!
//! This module provides:
//! - [`ProviderApi`] trait covering every provider call the service makes
//! - [`ProviderClient`], the reqwest implementation
//! - Wire types and error-body normalization shared by both

mod client;
mod failure;
mod types;

#[cfg(test)]
pub mod fake;

use async_trait::async_trait;

use crate::error::Error;
use crate::Result;

pub use client::ProviderClient;
pub use failure::{normalize_failure, FailureKind, ProviderFailure};
pub use types::*;

/// Provider API, swappable so workflows can be tested without HTTP.
#[async_trait]
pub trait ProviderApi: Send + Sync {
    /// Create or update the user keyed by `user.uid`.
    async fn upsert_user(&self, user: &UserPayload) -> Result<User>;

    /// Fetch a user by uid (the user's email).
    async fn get_user(&self, uid: &str) -> Result<User>;

    /// Exchange identity claims for a chat access token.
    async fn mint_token(&self, uid: &str, claims: &TokenClaims) -> Result<TokenResponse>;

    async fn list_agents(&self) -> Result<AgentPage>;

    async fn get_agent(&self, uid: &str) -> Result<Agent>;

    async fn create_agent(&self, payload: &AgentPayload) -> Result<Agent>;

    /// Full-record replace of the agent at `uid`.
    async fn update_agent(&self, uid: &str, payload: &AgentPayload) -> Result<Agent>;

    async fn delete_agent(&self, uid: &str) -> Result<()>;

    async fn create_knowledge_base(&self, payload: &KnowledgeBasePayload) -> Result<KnowledgeBase>;

    async fn delete_knowledge_base(&self, id: u64) -> Result<()>;
}

/// Turn a normalized failure into a crate error.
///
/// With `resource` set, a 404 becomes [`Error::NotFound`] for that resource;
/// without it every failure stays an upstream error carrying its status.
pub fn failure_to_error(failure: ProviderFailure, resource: Option<&str>) -> Error {
    match (failure.kind, resource) {
        (FailureKind::NotFound, Some(resource)) => Error::NotFound(resource.to_string()),
        _ => Error::Upstream(failure),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_mapping() {
        let failure = normalize_failure(404, "", "Agent not found");
        assert!(matches!(
            failure_to_error(failure.clone(), Some("Agent")),
            Error::NotFound(ref r) if r == "Agent"
        ));
        assert!(matches!(
            failure_to_error(failure, None),
            Error::Upstream(ProviderFailure { status: 404, .. })
        ));
    }
}
