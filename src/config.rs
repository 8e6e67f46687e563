//! Configuration management

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;
use crate::Result;
use crate::error::Error;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the provider environment, e.g. `https://acme.example.io`
    #[serde(default)]
    pub provider_url: String,

    /// Provider API key, forwarded as a bearer token
    #[serde(default)]
    pub api_key: String,

    /// Address the HTTP server binds to
    #[serde(default = "default_bind")]
    pub bind: String,

    /// Port the HTTP server listens on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Provider tag stamped on every created agent
    #[serde(default = "default_agent_tag")]
    pub agent_provider: String,

    /// Model tag stamped on every created agent
    #[serde(default = "default_agent_tag")]
    pub agent_model: String,

    /// Container type used for knowledge bases
    #[serde(default = "default_knowledge_base_type")]
    pub knowledge_base_type: String,

    /// Create a knowledge base when the request does not say otherwise
    #[serde(default = "default_true")]
    pub knowledge_base_by_default: bool,

    /// Delete the knowledge base again when the agent create that follows it fails
    #[serde(default)]
    pub compensate_orphaned_knowledge_base: bool,

    /// Lifetime of minted chat tokens
    #[serde(default = "default_token_ttl_secs")]
    pub token_ttl_secs: i64,

    /// Outbound request timeout. Unset keeps the HTTP client default.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

fn default_bind() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_agent_tag() -> String {
    "weavy".to_string()
}

fn default_knowledge_base_type() -> String {
    "files".to_string()
}

fn default_true() -> bool {
    true
}

/// Longest chat token lifetime accepted from config (one day)
pub const MAX_TOKEN_TTL_SECS: i64 = 86_400;

fn default_token_ttl_secs() -> i64 {
    3600
}

impl Default for Config {
    fn default() -> Self {
        Self {
            provider_url: String::new(),
            api_key: String::new(),
            bind: default_bind(),
            port: default_port(),
            agent_provider: default_agent_tag(),
            agent_model: default_agent_tag(),
            knowledge_base_type: default_knowledge_base_type(),
            knowledge_base_by_default: default_true(),
            compensate_orphaned_knowledge_base: false,
            token_ttl_secs: default_token_ttl_secs(),
            request_timeout_secs: None,
        }
    }
}

impl Config {
    /// Apply overrides from a variable lookup. `load` passes `std::env::var`.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("PROVIDER_URL") {
            self.provider_url = url;
        }
        if let Some(key) = lookup("PROVIDER_API_KEY") {
            self.api_key = key;
        }
        if let Some(bind) = lookup("AGENTDESK_BIND") {
            self.bind = bind;
        }
        if let Some(port) = lookup("AGENTDESK_PORT") {
            self.port = port
                .parse()
                .map_err(|e| Error::Config(format!("Invalid AGENTDESK_PORT {:?}: {}", port, e)))?;
        }
        Ok(())
    }

    /// Check that the provider can actually be reached with this config
    pub fn validate(&self) -> Result<()> {
        if self.provider_url.trim().is_empty() {
            return Err(Error::Config(
                "provider_url is not set (config file or PROVIDER_URL)".to_string(),
            ));
        }
        Url::parse(&self.provider_url)
            .map_err(|e| Error::Config(format!("Invalid provider_url {:?}: {}", self.provider_url, e)))?;
        if self.api_key.trim().is_empty() {
            return Err(Error::Config(
                "api_key is not set (config file or PROVIDER_API_KEY)".to_string(),
            ));
        }
        if self.token_ttl_secs <= 0 || self.token_ttl_secs > MAX_TOKEN_TTL_SECS {
            return Err(Error::Config(format!(
                "token_ttl_secs must be between 1 and {}",
                MAX_TOKEN_TTL_SECS
            )));
        }
        Ok(())
    }

    /// Provider base URL without a trailing slash. Used as token issuer and audience.
    pub fn provider_base(&self) -> &str {
        self.provider_url.trim_end_matches('/')
    }
}

/// Get the config directory path
pub fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".agentdesk")
}

/// Get the config file path
pub fn config_path() -> PathBuf {
    config_dir().join("config.json")
}

/// Read a config file. A missing file yields the defaults.
pub fn load_from(path: &Path) -> Result<Config> {
    if !path.exists() {
        tracing::debug!("No config file at {:?}, using defaults", path);
        return Ok(Config::default());
    }

    let content = std::fs::read_to_string(path)?;
    let config: Config = serde_json::from_str(&content)?;
    Ok(config)
}

/// Load configuration from file and environment, then validate it
pub fn load(path: Option<&Path>) -> Result<Config> {
    let default_path = config_path();
    let mut config = load_from(path.unwrap_or(&default_path))?;
    config.apply_overrides(|key| std::env::var(key).ok())?;
    config.validate()?;
    Ok(config)
}

/// Save configuration to file
pub fn save(config: &Config, path: &Path) -> Result<()> {
    // Create parent directory
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let content = serde_json::to_string_pretty(config)?;
    std::fs::write(path, content)?;

    // The file holds the API key
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(0o600);
        std::fs::set_permissions(path, perms)?;
    }

    Ok(())
}

/// Write a default config file unless one already exists
pub fn init(path: &Path) -> Result<bool> {
    if path.exists() {
        return Ok(false);
    }
    save(&Config::default(), path)?;
    Ok(true)
}
