//! Route handlers. Each one resolves its inputs, calls into the bridge or
//! provisioner, and shapes the JSON reply.

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use crate::agents::{AgentForm, Provisioner};
use crate::bridge::TokenBridge;
use crate::session::{IdentityFields, RequestContext};
use crate::Result;

use super::extract::{JsonBody, OptionalJsonBody};
use super::AppState;

#[derive(Debug, Deserialize)]
pub struct UserQuery {
    pub email: Option<String>,
}

fn bridge(state: &AppState) -> TokenBridge<'_> {
    TokenBridge::new(
        state.provider.as_ref(),
        state.config.provider_base(),
        state.config.token_ttl_secs,
    )
}

fn provisioner(state: &AppState) -> Provisioner<'_> {
    Provisioner::new(state.provider.as_ref(), &state.provisioning)
}

pub async fn issue_token(
    State(state): State<AppState>,
    ctx: RequestContext,
    OptionalJsonBody(body): OptionalJsonBody<IdentityFields>,
) -> Result<Json<Value>> {
    let identity = ctx.identity(&body)?;
    info!(request_id = %ctx.request_id, uid = %identity.email(), "Token requested");

    let access_token = bridge(&state).issue(&identity).await?;
    Ok(Json(json!({ "access_token": access_token })))
}

pub async fn upsert_user(
    State(state): State<AppState>,
    ctx: RequestContext,
    OptionalJsonBody(body): OptionalJsonBody<IdentityFields>,
) -> Result<Json<Value>> {
    let identity = ctx.identity(&body)?;
    let user = bridge(&state).upsert_user(&identity).await?;
    Ok(Json(json!({
        "success": true,
        "user": user,
        "action": "upserted",
    })))
}

pub async fn get_user(
    State(state): State<AppState>,
    ctx: RequestContext,
    Query(query): Query<UserQuery>,
) -> Result<Json<Value>> {
    let lookup = IdentityFields {
        email: query.email,
        ..Default::default()
    };
    let identity = ctx.identity(&lookup)?;
    let user = state.provider.get_user(identity.email()).await?;
    Ok(Json(json!({ "success": true, "user": user })))
}

pub async fn list_agents(State(state): State<AppState>) -> Result<Json<Value>> {
    let list = provisioner(&state).list().await?;
    Ok(Json(json!({
        "success": true,
        "agents": list.agents,
        "count": list.count,
    })))
}

pub async fn get_agent(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<Value>> {
    let agent = provisioner(&state).get(&slug).await?;
    Ok(Json(json!({ "success": true, "agent": agent })))
}

pub async fn create_agent(
    State(state): State<AppState>,
    ctx: RequestContext,
    JsonBody(form): JsonBody<AgentForm>,
) -> Result<Json<Value>> {
    info!(request_id = %ctx.request_id, "Creating agent {:?}", form.name);
    let created = provisioner(&state).create(&form).await?;

    let mut body = json!({ "success": true, "agent": created.agent });
    if let Some(kb) = created.knowledge_base {
        body["knowledgeBase"] = json!(kb);
    }
    Ok(Json(body))
}

pub async fn update_agent(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(slug): Path<String>,
    JsonBody(form): JsonBody<AgentForm>,
) -> Result<Json<Value>> {
    info!(request_id = %ctx.request_id, uid = %slug, "Updating agent");
    let agent = provisioner(&state).update(&slug, &form).await?;
    Ok(Json(json!({ "success": true, "agent": agent })))
}

pub async fn delete_agent(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(slug): Path<String>,
) -> Result<Json<Value>> {
    info!(request_id = %ctx.request_id, uid = %slug, "Deleting agent");
    provisioner(&state).delete(&slug).await?;
    Ok(Json(json!({
        "success": true,
        "message": "Agent deleted successfully",
    })))
}

/// Configuration presence report. Secrets are never echoed.
pub async fn debug(State(state): State<AppState>) -> Json<Value> {
    let set = |value: &str| if value.trim().is_empty() { "NOT SET" } else { "SET" };
    Json(json!({
        "version": env!("CARGO_PKG_VERSION"),
        "provider_url": state.config.provider_base(),
        "api_key": set(&state.config.api_key),
        "knowledge_base_by_default": state.config.knowledge_base_by_default,
        "compensate_orphaned_knowledge_base": state.config.compensate_orphaned_knowledge_base,
    }))
}
