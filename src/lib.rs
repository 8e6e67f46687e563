//! agentdesk - token bridge and agent provisioning proxy
//!
//! This library provides the HTTP service that mints chat tokens for signed-in
//! users and manages agent records (with optional knowledge bases) at the
//! hosted chat provider.

pub mod agents;
pub mod bridge;
pub mod config;
pub mod error;
pub mod provider;
pub mod server;
pub mod session;
pub mod ui;

pub use error::{Error, Result};
