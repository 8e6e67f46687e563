//! reqwest implementation of [`ProviderApi`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use url::Url;

use super::failure::normalize_failure;
use super::types::*;
use super::{failure_to_error, ProviderApi};
use crate::config::Config;
use crate::error::Error;
use crate::Result;

/// HTTP client for the provider API
#[derive(Clone)]
pub struct ProviderClient {
    base: Url,
    api_key: String,
    client: Client,
}

impl ProviderClient {
    pub fn new(base_url: &str, api_key: &str) -> Result<Self> {
        Self::with_client(base_url, api_key, Client::new())
    }

    /// Build a client from validated configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder.build()?;
        Self::with_client(config.provider_base(), &config.api_key, client)
    }

    fn with_client(base_url: &str, api_key: &str, client: Client) -> Result<Self> {
        let base = Url::parse(base_url)
            .map_err(|e| Error::Config(format!("Invalid provider URL {:?}: {}", base_url, e)))?;
        if base.cannot_be_a_base() {
            return Err(Error::Config(format!("Provider URL {:?} cannot be a base", base_url)));
        }
        Ok(Self {
            base,
            api_key: api_key.to_string(),
            client,
        })
    }

    /// Append path segments to the base URL, percent-encoding each one
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.client
            .request(method, url)
            .bearer_auth(&self.api_key)
            .header(header::CONTENT_TYPE, "application/json")
    }

    /// Send a request and decode a JSON success body.
    ///
    /// `resource` names what a 404 means; `None` keeps 404 as an upstream error.
    async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        fallback: &str,
        resource: Option<&str>,
    ) -> Result<T> {
        let body = self.send(request, fallback, resource).await?;
        serde_json::from_str(&body).map_err(|e| {
            tracing::error!("Failed to parse provider response: {} (body: {})", e, body);
            Error::Parse(e.to_string())
        })
    }

    async fn send(
        &self,
        request: RequestBuilder,
        fallback: &str,
        resource: Option<&str>,
    ) -> Result<String> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let failure = normalize_failure(status.as_u16(), &body, fallback);
            tracing::error!(
                status = failure.status,
                detail = %failure.detail,
                "{}: {}",
                fallback,
                failure.message
            );
            return Err(failure_to_error(failure, resource));
        }

        tracing::debug!(status = status.as_u16(), "Provider response: {}", body);
        Ok(body)
    }
}

#[async_trait]
impl ProviderApi for ProviderClient {
    async fn upsert_user(&self, user: &UserPayload) -> Result<User> {
        let url = self.endpoint(&["api", "users", &user.uid]);
        let request = self.request(Method::PUT, url).json(user);
        self.send_json(request, "Failed to upsert user", None).await
    }

    async fn get_user(&self, uid: &str) -> Result<User> {
        let url = self.endpoint(&["api", "users", uid]);
        let request = self.request(Method::GET, url);
        self.send_json(request, "Failed to get user", Some("User")).await
    }

    async fn mint_token(&self, uid: &str, claims: &TokenClaims) -> Result<TokenResponse> {
        let url = self.endpoint(&["api", "users", uid, "tokens"]);
        let request = self.request(Method::POST, url).json(claims);
        self.send_json(request, "Failed to generate token", None).await
    }

    async fn list_agents(&self) -> Result<AgentPage> {
        let url = self.endpoint(&["api", "agents"]);
        let request = self.request(Method::GET, url);
        self.send_json(request, "Failed to get agents", None).await
    }

    async fn get_agent(&self, uid: &str) -> Result<Agent> {
        let url = self.endpoint(&["api", "agents", uid]);
        let request = self.request(Method::GET, url);
        self.send_json(request, "Failed to get agent", Some("Agent")).await
    }

    async fn create_agent(&self, payload: &AgentPayload) -> Result<Agent> {
        let url = self.endpoint(&["api", "agents"]);
        let request = self.request(Method::POST, url).json(payload);
        self.send_json(request, "Failed to create agent", None).await
    }

    async fn update_agent(&self, uid: &str, payload: &AgentPayload) -> Result<Agent> {
        let url = self.endpoint(&["api", "agents", uid]);
        let request = self.request(Method::PUT, url).json(payload);
        self.send_json(request, "Failed to update agent", Some("Agent")).await
    }

    async fn delete_agent(&self, uid: &str) -> Result<()> {
        let url = self.endpoint(&["api", "agents", uid]);
        let request = self.request(Method::DELETE, url);
        self.send(request, "Failed to delete agent", Some("Agent")).await?;
        Ok(())
    }

    async fn create_knowledge_base(&self, payload: &KnowledgeBasePayload) -> Result<KnowledgeBase> {
        let url = self.endpoint(&["api", "apps"]);
        let request = self.request(Method::POST, url).json(payload);
        self.send_json(request, "Failed to create knowledge base", None).await
    }

    async fn delete_knowledge_base(&self, id: u64) -> Result<()> {
        let id = id.to_string();
        let url = self.endpoint(&["api", "apps", &id]);
        let request = self.request(Method::DELETE, url);
        self.send(request, "Failed to delete knowledge base", Some("Knowledge base")).await?;
        Ok(())
    }
}
