//! Error types for agentdesk

use thiserror::Error;

use crate::provider::ProviderFailure;

/// Result type alias for agentdesk operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while proxying to the provider
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    /// A required field was missing or blank. Always generated locally.
    #[error("{0}")]
    Validation(String),

    /// The provider answered 404 for the requested resource.
    #[error("{0} not found")]
    NotFound(String),

    /// The provider answered with a non-success status.
    #[error("Provider error {0}")]
    Upstream(ProviderFailure),

    /// The provider answered 2xx but the body was not the JSON we expected.
    #[error("Invalid response from provider: {0}")]
    Parse(String),

    #[error("Internal error: {0}")]
    Internal(String),

    /// Agent creation failed after its knowledge base was already created.
    #[error("{source} (orphaned knowledge base {knowledge_base_id})")]
    Orphaned {
        knowledge_base_id: u64,
        #[source]
        source: Box<Error>,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl Error {
    /// Shorthand for a validation failure.
    pub fn validation(message: impl Into<String>) -> Self {
        Error::Validation(message.into())
    }

    /// Whether this error (or the error it wraps) is a provider 404.
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::NotFound(_) => true,
            Error::Orphaned { source, .. } => source.is_not_found(),
            _ => false,
        }
    }
}
