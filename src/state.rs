//! Shared application state
//!
//! Read-only after startup: the configuration plus the agent session
//! gateway constructed from it. Cloned handles are cheap (`Arc`).

use std::sync::Arc;

use crate::config::ServerConfig;
use crate::core::agent::AgentSessionGateway;

/// Process-wide state handed to every handler
#[derive(Debug)]
pub struct AppState {
    pub config: ServerConfig,
    pub agents: AgentSessionGateway,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Arc<Self> {
        let agents = AgentSessionGateway::new(&config);
        Arc::new(AppState { config, agents })
    }
}
