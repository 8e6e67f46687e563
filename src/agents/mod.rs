//! Agent provisioning workflow.
//!
//! Create is the only multi-step operation: when a knowledge base is wanted
//! it is created first, and the agent is created afterwards referencing the
//! container id the provider assigned. Read, update and delete are single
//! passthrough calls.

mod draft;
mod slug;

use serde::Serialize;

use crate::config::Config;
use crate::error::Error;
use crate::provider::{Agent, KnowledgeBase, KnowledgeBasePayload, ProviderApi};
use crate::Result;

pub use draft::{AgentDraft, AgentForm};
pub use slug::{generate_slug, knowledge_base_slug, slug_at};

/// Provisioning knobs taken from configuration
#[derive(Debug, Clone)]
pub struct ProvisioningSettings {
    pub provider_tag: String,
    pub model_tag: String,
    pub knowledge_base_type: String,
    pub knowledge_base_by_default: bool,
    pub compensate_orphans: bool,
}

impl From<&Config> for ProvisioningSettings {
    fn from(config: &Config) -> Self {
        Self {
            provider_tag: config.agent_provider.clone(),
            model_tag: config.agent_model.clone(),
            knowledge_base_type: config.knowledge_base_type.clone(),
            knowledge_base_by_default: config.knowledge_base_by_default,
            compensate_orphans: config.compensate_orphaned_knowledge_base,
        }
    }
}

impl Default for ProvisioningSettings {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

/// Result of a successful create
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedAgent {
    pub agent: Agent,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub knowledge_base: Option<KnowledgeBase>,
}

/// Agent listing as returned to the browser
#[derive(Debug, Clone, Serialize)]
pub struct AgentList {
    pub agents: Vec<Agent>,
    pub count: u64,
}

/// Runs agent operations against a provider
pub struct Provisioner<'a> {
    provider: &'a dyn ProviderApi,
    settings: &'a ProvisioningSettings,
}

impl<'a> Provisioner<'a> {
    pub fn new(provider: &'a dyn ProviderApi, settings: &'a ProvisioningSettings) -> Self {
        Self { provider, settings }
    }

    /// Create an agent, provisioning its knowledge base first when wanted
    pub async fn create(&self, form: &AgentForm) -> Result<CreatedAgent> {
        let draft = AgentDraft::from_form(form)?;
        let slug = generate_slug(&draft.name);
        let wants_knowledge_base = form
            .knowledge_base
            .unwrap_or(self.settings.knowledge_base_by_default);

        let knowledge_base = if wants_knowledge_base {
            Some(self.create_knowledge_base(&slug).await?)
        } else {
            None
        };

        let payload = draft.create_payload(
            &slug,
            &self.settings.provider_tag,
            &self.settings.model_tag,
            knowledge_base.as_ref().map(|kb| kb.id),
        );
        tracing::debug!(uid = %slug, "Creating agent: {:?}", payload);

        match self.provider.create_agent(&payload).await {
            Ok(agent) => {
                tracing::info!(uid = %agent.uid, id = agent.id, "Created agent");
                Ok(CreatedAgent {
                    agent,
                    knowledge_base,
                })
            }
            Err(err) => match knowledge_base {
                Some(kb) => Err(self.orphaned(kb, err).await),
                None => Err(err),
            },
        }
    }

    pub async fn get(&self, slug: &str) -> Result<Agent> {
        let slug = require_slug(slug)?;
        self.provider.get_agent(slug).await
    }

    pub async fn list(&self) -> Result<AgentList> {
        let page = self.provider.list_agents().await?;
        Ok(AgentList {
            agents: page.data.unwrap_or_default(),
            count: page.count.unwrap_or(0),
        })
    }

    /// Replace the editable fields. Returns the provider's copy of the record.
    pub async fn update(&self, slug: &str, form: &AgentForm) -> Result<Agent> {
        let slug = require_slug(slug)?;
        let draft = AgentDraft::from_form(form)?;
        let payload = draft.update_payload();
        tracing::debug!(uid = %slug, "Updating agent: {:?}", payload);

        let agent = self.provider.update_agent(slug, &payload).await?;
        tracing::info!(uid = %slug, "Updated agent");
        Ok(agent)
    }

    pub async fn delete(&self, slug: &str) -> Result<()> {
        let slug = require_slug(slug)?;
        self.provider.delete_agent(slug).await?;
        tracing::info!(uid = %slug, "Deleted agent");
        Ok(())
    }

    async fn create_knowledge_base(&self, agent_slug: &str) -> Result<KnowledgeBase> {
        let payload = KnowledgeBasePayload {
            uid: knowledge_base_slug(agent_slug),
            kind: self.settings.knowledge_base_type.clone(),
        };
        let kb = self.provider.create_knowledge_base(&payload).await?;
        tracing::info!(uid = %payload.uid, id = kb.id, "Created knowledge base");
        Ok(kb)
    }

    /// Handle an agent create that failed after its knowledge base was created
    async fn orphaned(&self, kb: KnowledgeBase, err: Error) -> Error {
        tracing::warn!(
            knowledge_base_id = kb.id,
            "Agent creation failed after knowledge base was created: {}",
            err
        );

        if self.settings.compensate_orphans {
            match self.provider.delete_knowledge_base(kb.id).await {
                Ok(()) => {
                    tracing::info!(knowledge_base_id = kb.id, "Deleted orphaned knowledge base");
                    return err;
                }
                Err(cleanup) => {
                    tracing::error!(
                        knowledge_base_id = kb.id,
                        "Failed to delete orphaned knowledge base: {}",
                        cleanup
                    );
                }
            }
        }

        Error::Orphaned {
            knowledge_base_id: kb.id,
            source: Box::new(err),
        }
    }
}

fn require_slug(slug: &str) -> Result<&str> {
    let slug = slug.trim();
    if slug.is_empty() {
        return Err(Error::validation("Agent UID is required"));
    }
    Ok(slug)
}
