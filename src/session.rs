//! Per-request session context.
//!
//! Identity is never kept in process state. Each request builds a
//! [`RequestContext`] from its own headers, and handlers pass the verified
//! [`SessionIdentity`] explicitly to the code that needs it.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use std::convert::Infallible;
use uuid::Uuid;

use crate::error::Error;
use crate::Result;

/// Headers set by the fronting auth proxy for a signed-in user
pub const EMAIL_HEADER: &str = "x-session-email";
pub const NAME_HEADER: &str = "x-session-name";
pub const AVATAR_HEADER: &str = "x-session-avatar";

/// A verified user identity. The email is the provider-side user key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionIdentity {
    email: String,
    name: Option<String>,
    avatar: Option<String>,
}

impl SessionIdentity {
    /// Verify raw identity fields. Blank values count as absent.
    pub fn verify(
        email: Option<&str>,
        name: Option<&str>,
        avatar: Option<&str>,
    ) -> Result<Self> {
        let email = non_blank(email).ok_or_else(|| Error::validation("email is required"))?;
        Ok(Self {
            email,
            name: non_blank(name),
            avatar: non_blank(avatar),
        })
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn avatar(&self) -> Option<&str> {
        self.avatar.as_deref()
    }

    /// The user's name, or the local part of the email when no name is known
    pub fn display_name(&self) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => self
                .email
                .split('@')
                .next()
                .unwrap_or(&self.email)
                .to_string(),
        }
    }
}

/// Identity fields as they arrive in a request body
#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct IdentityFields {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
}

/// Correlation id stamped on each request by the logging middleware
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestId(pub Uuid);

/// Context extracted for every request
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub request_id: Uuid,
    identity: IdentityFields,
}

impl RequestContext {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        Self::with_request_id(Uuid::new_v4(), headers)
    }

    pub fn with_request_id(request_id: Uuid, headers: &HeaderMap) -> Self {
        let header = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };
        Self {
            request_id,
            identity: IdentityFields {
                email: header(EMAIL_HEADER),
                name: header(NAME_HEADER),
                avatar: header(AVATAR_HEADER),
            },
        }
    }

    /// Resolve the identity for this request. A body carrying an email is
    /// used as a whole; otherwise the session headers are.
    pub fn identity(&self, body: &IdentityFields) -> Result<SessionIdentity> {
        let source = if non_blank(body.email.as_deref()).is_some() {
            body
        } else {
            &self.identity
        };
        SessionIdentity::verify(
            source.email.as_deref(),
            source.name.as_deref(),
            source.avatar.as_deref(),
        )
    }
}

#[async_trait::async_trait]
impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> std::result::Result<Self, Self::Rejection> {
        let request_id = parts
            .extensions
            .get::<RequestId>()
            .map(|id| id.0)
            .unwrap_or_else(Uuid::new_v4);
        Ok(Self::with_request_id(request_id, &parts.headers))
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
