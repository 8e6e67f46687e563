//! Token bridge: exchanges a verified session for a provider chat token.

use chrono::{DateTime, Duration, Utc};

use crate::provider::{ProviderApi, TokenClaims, User, UserPayload};
use crate::error::Error;
use crate::session::SessionIdentity;
use crate::Result;

/// Upserts users and mints short-lived chat tokens
pub struct TokenBridge<'a> {
    provider: &'a dyn ProviderApi,
    issuer: String,
    ttl_secs: i64,
}

impl<'a> TokenBridge<'a> {
    pub fn new(provider: &'a dyn ProviderApi, issuer: &str, ttl_secs: i64) -> Self {
        Self {
            provider,
            issuer: issuer.trim_end_matches('/').to_string(),
            ttl_secs,
        }
    }

    /// Create or refresh the provider user for this identity
    pub async fn upsert_user(&self, identity: &SessionIdentity) -> Result<User> {
        let payload = user_payload(identity);
        tracing::debug!(uid = %payload.uid, "Upserting provider user");
        self.provider.upsert_user(&payload).await
    }

    /// Upsert the user, then mint a token for it. Returns the opaque token.
    pub async fn issue(&self, identity: &SessionIdentity) -> Result<String> {
        self.upsert_user(identity).await?;

        let claims = self.claims(identity, Utc::now())?;
        let token = self.provider.mint_token(identity.email(), &claims).await?;
        tracing::info!(uid = %identity.email(), expires_in = ?token.expires_in, "Issued chat token");
        Ok(token.access_token)
    }

    fn claims(&self, identity: &SessionIdentity, now: DateTime<Utc>) -> Result<TokenClaims> {
        let exp = Duration::try_seconds(self.ttl_secs)
            .and_then(|ttl| now.checked_add_signed(ttl))
            .ok_or_else(|| Error::Config(format!("token_ttl_secs {} is out of range", self.ttl_secs)))?;

        Ok(TokenClaims {
            sub: identity.email().to_string(),
            name: identity.display_name(),
            email: identity.email().to_string(),
            picture: identity.avatar().map(str::to_string),
            iss: self.issuer.clone(),
            aud: self.issuer.clone(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
        })
    }
}

fn user_payload(identity: &SessionIdentity) -> UserPayload {
    UserPayload {
        uid: identity.email().to_string(),
        name: identity.display_name(),
        email: identity.email().to_string(),
        picture: identity.avatar().map(str::to_string),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::fake::FakeProvider;

    fn jane() -> SessionIdentity {
        SessionIdentity::verify(Some("jane@example.com"), None, Some("https://img/jane.png")).unwrap()
    }

    #[test]
    fn test_claims() {
        let provider = FakeProvider::new();
        let bridge = TokenBridge::new(&provider, "https://acme.example.io/", 3600);
        let now = DateTime::parse_from_rfc3339("2024-04-05T10:00:00Z").unwrap().with_timezone(&Utc);

        let claims = bridge.claims(&jane(), now).unwrap();
        assert_eq!(claims.sub, "jane@example.com");
        assert_eq!(claims.name, "jane");
        assert_eq!(claims.picture.as_deref(), Some("https://img/jane.png"));
        assert_eq!(claims.iss, "https://acme.example.io");
        assert_eq!(claims.aud, claims.iss);
        assert_eq!(claims.exp - claims.iat, 3600);
        assert_eq!(claims.iat, now.timestamp());
    }

    #[tokio::test]
    async fn test_issue_upserts_then_mints() {
        let provider = FakeProvider::new();
        let bridge = TokenBridge::new(&provider, "https://acme.example.io", 3600);

        let token = bridge.issue(&jane()).await.unwrap();
        assert_eq!(token, "wyu_jane@example.com");
        assert_eq!(provider.calls(), vec!["upsert_user", "mint_token"]);

        let minted = provider.claims();
        assert_eq!(minted.len(), 1);
        assert_eq!(minted[0].sub, "jane@example.com");
        assert_eq!(minted[0].exp - minted[0].iat, 3600);
    }

    #[tokio::test]
    async fn test_out_of_range_ttl_is_config_error() {
        let provider = FakeProvider::new();
        let bridge = TokenBridge::new(&provider, "https://acme.example.io", 9_223_372_036_854_775);

        let err = bridge.issue(&jane()).await.unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert!(provider.claims().is_empty());
    }

    #[tokio::test]
    async fn test_upsert_failure_stops_minting() {
        let provider = FakeProvider::new();
        provider.fail("upsert_user", 403, r#"{"title": "Forbidden"}"#);
        let bridge = TokenBridge::new(&provider, "https://acme.example.io", 3600);

        let err = bridge.issue(&jane()).await.unwrap_err();
        assert!(matches!(err, Error::Upstream(ref f) if f.status == 403));
        assert_eq!(provider.calls(), vec!["upsert_user"]);
    }

    #[tokio::test]
    async fn test_mint_404_stays_upstream() {
        let provider = FakeProvider::new();
        provider.fail("mint_token", 404, "");
        let bridge = TokenBridge::new(&provider, "https://acme.example.io", 3600);

        let err = bridge.issue(&jane()).await.unwrap_err();
        assert!(matches!(err, Error::Upstream(ref f) if f.status == 404));
    }
}
