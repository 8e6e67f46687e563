//! Request body extractors that reject with the crate [`Error`].
//!
//! axum's own `Json` rejects with plain-text bodies and 415/422 statuses.
//! These wrappers turn every body problem into `Error::Validation`, so the
//! reply goes through the same JSON error mapping as everything else.

use async_trait::async_trait;
use axum::body::Bytes;
use axum::extract::{FromRequest, Json, Request};
use serde::de::DeserializeOwned;

use crate::error::Error;

/// A required JSON body.
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| invalid_body(rejection.body_text()))?;
        Ok(Self(value))
    }
}

/// A JSON body that may be absent. An empty body yields `T::default()`.
///
/// Content type is not checked, so a bodiless POST carrying only session
/// headers still reaches the handler.
pub struct OptionalJsonBody<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for OptionalJsonBody<T>
where
    T: DeserializeOwned + Default,
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|rejection| invalid_body(rejection.body_text()))?;

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self(T::default()));
        }
        serde_json::from_slice(&bytes)
            .map(Self)
            .map_err(|e| invalid_body(e.to_string()))
    }
}

fn invalid_body(reason: String) -> Error {
    Error::validation(format!("Invalid request body: {}", reason))
}
