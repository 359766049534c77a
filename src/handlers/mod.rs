//! HTTP request handlers
//!
//! - `api` - Health check endpoint
//! - `agent` - Channel description and agent session start/stop

pub mod agent;
pub mod api;
