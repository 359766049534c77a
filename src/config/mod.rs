//! Configuration module for the convo-gateway server
//!
//! Configuration is read once at startup from a YAML file and/or environment
//! variables (priority: YAML > ENV vars > .env values > defaults) and passed
//! into the gateway and token builder as an explicit struct. Handlers never
//! read the process environment.
//!
//! # Example
//! ```rust,no_run
//! use convo_gateway::config::ServerConfig;
//! use std::path::PathBuf;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Load from environment variables only
//! let config = ServerConfig::from_env()?;
//!
//! // Load from YAML file with environment variable fallback
//! let config = ServerConfig::from_file(&PathBuf::from("config.yaml"))?;
//!
//! println!("Server listening on {}", config.address());
//! # Ok(())
//! # }
//! ```

use std::path::PathBuf;

mod env;
mod yaml;

pub use yaml::YamlConfig;

use crate::core::agent::DEFAULT_AGENT_API_BASE;
use crate::errors::{AppError, AppResult};

/// TLS configuration for HTTPS
#[derive(Debug, Clone)]
pub struct TlsConfig {
    /// Path to the TLS certificate file (PEM format)
    pub cert_path: PathBuf,
    /// Path to the TLS private key file (PEM format)
    pub key_path: PathBuf,
}

/// Server configuration
///
/// Contains everything needed to run the gateway:
/// - Server settings (host, port, TLS)
/// - Platform application identity and signing certificate
/// - Agent REST API credentials and base URL
/// - LLM and TTS passthrough settings for agent sessions
/// - The basic-auth credential pair gating all non-health routes
/// - Security settings (CORS, rate limiting, static frontend)
#[derive(Debug, Clone)]
pub struct ServerConfig {
    // Server settings
    pub host: String,
    pub port: u16,

    // TLS configuration (optional)
    pub tls: Option<TlsConfig>,

    // Platform application identity
    pub app_id: Option<String>,
    /// Token-signing certificate; sensitive, never logged, never sent to
    /// the client
    pub app_certificate: Option<String>,

    // Agent-hosting REST API (credential pair distinct from the certificate)
    pub rest_api_key: Option<String>,
    pub rest_api_secret: Option<String>,
    pub agent_api_base: String,

    // LLM passthrough settings for agent sessions
    pub llm_url: Option<String>,
    pub llm_api_key: Option<String>,
    pub llm_model: String,
    pub llm_system_prompt: Option<String>,

    // MiniMax TTS passthrough settings
    pub minimax_api_key: Option<String>,
    pub minimax_group_id: Option<String>,
    pub minimax_voice_id: Option<String>,

    // Basic-auth gate (both must be set for the gate to be active)
    pub auth_username: Option<String>,
    pub auth_password: Option<String>,

    // Static frontend directory served behind the gate (optional)
    pub frontend_dir: Option<PathBuf>,

    // Security configuration
    /// CORS allowed origins (comma-separated list or "*" for all)
    /// Default: None (CORS disabled, same-origin only)
    pub cors_allowed_origins: Option<String>,
    /// Maximum requests per second per IP address
    pub rate_limit_requests_per_second: u32,
    /// Maximum burst size for rate limiting
    pub rate_limit_burst_size: u32,
}

/// Zeroize all secret fields when the config is dropped so sensitive data
/// does not linger in memory.
impl Drop for ServerConfig {
    fn drop(&mut self) {
        use zeroize::Zeroize;

        if let Some(ref mut certificate) = self.app_certificate {
            certificate.zeroize();
        }
        if let Some(ref mut key) = self.rest_api_key {
            key.zeroize();
        }
        if let Some(ref mut secret) = self.rest_api_secret {
            secret.zeroize();
        }
        if let Some(ref mut key) = self.llm_api_key {
            key.zeroize();
        }
        if let Some(ref mut key) = self.minimax_api_key {
            key.zeroize();
        }
        if let Some(ref mut password) = self.auth_password {
            password.zeroize();
        }
    }
}

impl ServerConfig {
    /// Socket address string the server binds to
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn is_tls_enabled(&self) -> bool {
        self.tls.is_some()
    }

    /// True when the username/password gate is active
    pub fn has_basic_auth(&self) -> bool {
        self.auth_username.is_some() && self.auth_password.is_some()
    }

    /// True when tokens can be signed
    pub fn has_signing_certificate(&self) -> bool {
        self.app_id.is_some() && self.app_certificate.is_some()
    }

    /// Load configuration from environment variables (plus any `.env` values
    /// already loaded into the environment by `dotenvy`)
    pub fn from_env() -> AppResult<Self> {
        let config = env::load_from_env();
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a YAML file, with environment variables
    /// filling in anything the file leaves unset
    pub fn from_file(path: &PathBuf) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::InvalidArgument(format!("cannot read config file {}: {e}", path.display()))
        })?;
        let yaml: YamlConfig = serde_yaml::from_str(&contents).map_err(|e| {
            AppError::InvalidArgument(format!("invalid YAML in {}: {e}", path.display()))
        })?;
        let config = yaml.overlay(env::load_from_env());
        config.validate()?;
        Ok(config)
    }

    /// Cross-field validation, run once after loading
    pub fn validate(&self) -> AppResult<()> {
        if self.host.is_empty() {
            return Err(AppError::InvalidArgument("host must not be empty".to_string()));
        }
        if self.rest_api_key.is_some() != self.rest_api_secret.is_some() {
            return Err(AppError::InvalidArgument(
                "AGORA_API_KEY and AGORA_API_SECRET must be configured together".to_string(),
            ));
        }
        if self.app_certificate.is_some() && self.app_id.is_none() {
            return Err(AppError::InvalidArgument(
                "AGORA_APP_CERTIFICATE requires AGORA_APP_ID".to_string(),
            ));
        }
        if self.auth_username.is_some() != self.auth_password.is_some() {
            return Err(AppError::InvalidArgument(
                "AUTH_USERNAME and AUTH_PASSWORD must be configured together".to_string(),
            ));
        }
        if self.rate_limit_requests_per_second == 0 {
            return Err(AppError::InvalidArgument(
                "rate limit must be at least 1 request per second".to_string(),
            ));
        }
        Ok(())
    }

    /// Minimal configuration for tests: no credentials, no gate, default
    /// limits
    pub fn for_tests() -> Self {
        ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            tls: None,
            app_id: None,
            app_certificate: None,
            rest_api_key: None,
            rest_api_secret: None,
            agent_api_base: DEFAULT_AGENT_API_BASE.to_string(),
            llm_url: None,
            llm_api_key: None,
            llm_model: "gpt-4o-mini".to_string(),
            llm_system_prompt: None,
            minimax_api_key: None,
            minimax_group_id: None,
            minimax_voice_id: None,
            auth_username: None,
            auth_password: None,
            frontend_dir: None,
            cors_allowed_origins: None,
            rate_limit_requests_per_second: 60,
            rate_limit_burst_size: 10,
        }
    }
}
