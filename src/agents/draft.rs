//! Validation and payload assembly for agent create and update.

use serde::Deserialize;

use crate::error::Error;
use crate::provider::AgentPayload;
use crate::Result;

/// Agent fields as submitted by the browser
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentForm {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub instructions: Option<String>,
    /// Whether to provision a knowledge base. Only read on create.
    #[serde(default)]
    pub knowledge_base: Option<bool>,
}

/// Validated, trimmed agent fields. Empty optionals are `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentDraft {
    pub name: String,
    pub comment: Option<String>,
    pub instructions: Option<String>,
}

impl AgentDraft {
    pub fn from_form(form: &AgentForm) -> Result<Self> {
        let name = trimmed(form.name.as_deref()).ok_or_else(|| Error::validation("Name is required"))?;
        Ok(Self {
            name,
            comment: trimmed(form.description.as_deref()),
            instructions: trimmed(form.instructions.as_deref()),
        })
    }

    /// Payload for an update: only the editable fields
    pub fn update_payload(&self) -> AgentPayload {
        AgentPayload {
            uid: None,
            name: self.name.clone(),
            comment: self.comment.clone(),
            instructions: self.instructions.clone(),
            provider: None,
            model: None,
            knowledge_base_id: None,
        }
    }

    /// Payload for a create under `uid`
    pub fn create_payload(
        &self,
        uid: &str,
        provider: &str,
        model: &str,
        knowledge_base_id: Option<u64>,
    ) -> AgentPayload {
        AgentPayload {
            uid: Some(uid.to_string()),
            provider: Some(provider.to_string()),
            model: Some(model.to_string()),
            knowledge_base_id,
            ..self.update_payload()
        }
    }
}

fn trimmed(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
