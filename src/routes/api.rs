use axum::{
    Router,
    routing::{delete, get, post},
};
use tower_http::trace::TraceLayer;

use crate::handlers::agent;
use crate::state::AppState;
use std::sync::Arc;

/// Create the API router with protected routes
///
/// Note: Basic-auth middleware is applied in main.rs after state is available
pub fn create_api_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/agora/channel-info", get(agent::channel_info))
        .route("/api/agora/start", post(agent::start_agent))
        .route("/api/agora/stop/{agent_id}", delete(agent::stop_agent))
        .layer(TraceLayer::new_for_http())
}
