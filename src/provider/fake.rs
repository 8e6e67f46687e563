//! Fake provider for testing.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::json;

use super::*;

/// In-memory provider that records every call in order.
#[derive(Default)]
pub struct FakeProvider {
    calls: Mutex<Vec<&'static str>>,
    failures: Mutex<HashMap<&'static str, ProviderFailure>>,
    agents: Mutex<HashMap<String, Agent>>,
    agent_payloads: Mutex<Vec<AgentPayload>>,
    claims: Mutex<Vec<TokenClaims>>,
    next_id: AtomicU64,
}

impl FakeProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every later call to `op` fail with the given status and body.
    pub fn fail(&self, op: &'static str, status: u16, body: &str) {
        let failure = normalize_failure(status, body, "fake failure");
        self.failures.lock().unwrap().insert(op, failure);
    }

    /// Seed an existing agent.
    pub fn insert_agent(&self, agent: Agent) {
        self.agents.lock().unwrap().insert(agent.uid.clone(), agent);
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    pub fn agent_payloads(&self) -> Vec<AgentPayload> {
        self.agent_payloads.lock().unwrap().clone()
    }

    pub fn claims(&self) -> Vec<TokenClaims> {
        self.claims.lock().unwrap().clone()
    }

    fn record(&self, op: &'static str, resource: Option<&str>) -> Result<()> {
        self.calls.lock().unwrap().push(op);
        match self.failures.lock().unwrap().get(op) {
            Some(failure) => Err(failure_to_error(failure.clone(), resource)),
            None => Ok(()),
        }
    }

    fn next_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn missing(resource: &str) -> crate::error::Error {
        failure_to_error(normalize_failure(404, "", "not found"), Some(resource))
    }
}

fn agent_from_payload(id: u64, uid: String, payload: &AgentPayload) -> Agent {
    Agent {
        id,
        uid,
        name: payload.name.clone(),
        picture: None,
        comment: payload.comment.clone(),
        instructions: payload.instructions.clone(),
        knowledge_base_id: payload.knowledge_base_id,
        provider: payload.provider.clone().unwrap_or_default(),
        model: payload.model.clone().unwrap_or_default(),
        created_at: Some(chrono::Utc::now()),
        updated_at: Some(chrono::Utc::now()),
    }
}

#[async_trait]
impl ProviderApi for FakeProvider {
    async fn upsert_user(&self, user: &UserPayload) -> Result<User> {
        self.record("upsert_user", None)?;
        Ok(json!({"id": 1, "uid": user.uid, "name": user.name, "email": user.email}))
    }

    async fn get_user(&self, uid: &str) -> Result<User> {
        self.record("get_user", Some("User"))?;
        Ok(json!({"id": 1, "uid": uid}))
    }

    async fn mint_token(&self, _uid: &str, claims: &TokenClaims) -> Result<TokenResponse> {
        self.record("mint_token", None)?;
        self.claims.lock().unwrap().push(claims.clone());
        Ok(TokenResponse {
            access_token: format!("wyu_{}", claims.sub),
            expires_in: Some(claims.exp - claims.iat),
        })
    }

    async fn list_agents(&self) -> Result<AgentPage> {
        self.record("list_agents", None)?;
        let agents: Vec<Agent> = self.agents.lock().unwrap().values().cloned().collect();
        Ok(AgentPage {
            count: Some(agents.len() as u64),
            data: Some(agents),
        })
    }

    async fn get_agent(&self, uid: &str) -> Result<Agent> {
        self.record("get_agent", Some("Agent"))?;
        self.agents
            .lock()
            .unwrap()
            .get(uid)
            .cloned()
            .ok_or_else(|| Self::missing("Agent"))
    }

    async fn create_agent(&self, payload: &AgentPayload) -> Result<Agent> {
        self.record("create_agent", None)?;
        self.agent_payloads.lock().unwrap().push(payload.clone());
        let uid = payload.uid.clone().unwrap_or_default();
        let agent = agent_from_payload(self.next_id(), uid.clone(), payload);
        self.agents.lock().unwrap().insert(uid, agent.clone());
        Ok(agent)
    }

    async fn update_agent(&self, uid: &str, payload: &AgentPayload) -> Result<Agent> {
        self.record("update_agent", Some("Agent"))?;
        self.agent_payloads.lock().unwrap().push(payload.clone());
        let mut agents = self.agents.lock().unwrap();
        let existing = agents.get(uid).cloned().ok_or_else(|| Self::missing("Agent"))?;
        let mut updated = agent_from_payload(existing.id, uid.to_string(), payload);
        updated.provider = existing.provider;
        updated.model = existing.model;
        updated.knowledge_base_id = existing.knowledge_base_id;
        updated.created_at = existing.created_at;
        agents.insert(uid.to_string(), updated.clone());
        Ok(updated)
    }

    async fn delete_agent(&self, uid: &str) -> Result<()> {
        self.record("delete_agent", Some("Agent"))?;
        self.agents
            .lock()
            .unwrap()
            .remove(uid)
            .map(|_| ())
            .ok_or_else(|| Self::missing("Agent"))
    }

    async fn create_knowledge_base(&self, payload: &KnowledgeBasePayload) -> Result<KnowledgeBase> {
        self.record("create_knowledge_base", None)?;
        Ok(KnowledgeBase {
            id: 1000 + self.next_id(),
            uid: Some(payload.uid.clone()),
            kind: Some(payload.kind.clone()),
        })
    }

    async fn delete_knowledge_base(&self, _id: u64) -> Result<()> {
        self.record("delete_knowledge_base", Some("Knowledge base"))
    }
}
