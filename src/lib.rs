pub mod config;
pub mod core;
pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod state;

// Re-export commonly used items for convenience
pub use config::ServerConfig;
pub use self::core::agent::{AgentSessionGateway, StartOutcome, StopOutcome};
pub use self::core::token::{AccessToken, MintedToken, ServiceGrant, UserId, build_token};
pub use errors::app_error::{AppError, AppResult};
pub use errors::auth_error::{AuthError, AuthResult};
pub use state::AppState;
