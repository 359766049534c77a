pub mod auth;

// Re-export middleware functions
pub use auth::basic_auth_middleware;
