//! YAML configuration file loading
//!
//! All fields are optional to allow partial configuration; anything the file
//! leaves unset falls back to the environment-derived value.
//!
//! # Example YAML structure
//! ```yaml
//! server:
//!   host: "0.0.0.0"
//!   port: 3000
//!
//! agora:
//!   app_id: "your-app-id"
//!   app_certificate: "your-signing-certificate"
//!   api_key: "your-rest-key"
//!   api_secret: "your-rest-secret"
//!
//! agent:
//!   llm_url: "https://api.openai.com/v1/chat/completions"
//!   llm_api_key: "sk-..."
//!   llm_model: "gpt-4o-mini"
//!   system_prompt: "You are a helpful voice assistant."
//!
//! tts:
//!   minimax_api_key: "key"
//!   minimax_group_id: "group"
//!   minimax_voice_id: "voice"
//!
//! auth:
//!   username: "operator"
//!   password: "change-me"
//!
//! security:
//!   cors_allowed_origins: "*"
//!   rate_limit_requests_per_second: 60
//!   rate_limit_burst_size: 10
//! ```

use std::path::PathBuf;

use serde::Deserialize;

use super::{ServerConfig, TlsConfig};

/// Complete YAML configuration structure
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct YamlConfig {
    pub server: Option<ServerYaml>,
    pub agora: Option<AgoraYaml>,
    pub agent: Option<AgentYaml>,
    pub tts: Option<TtsYaml>,
    pub auth: Option<AuthYaml>,
    pub security: Option<SecurityYaml>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ServerYaml {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub tls: Option<TlsYaml>,
    pub frontend_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct TlsYaml {
    pub cert_path: Option<PathBuf>,
    pub key_path: Option<PathBuf>,
}

/// Platform application identity and REST credentials
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AgoraYaml {
    pub app_id: Option<String>,
    pub app_certificate: Option<String>,
    pub api_key: Option<String>,
    pub api_secret: Option<String>,
    pub convo_api_base: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AgentYaml {
    pub llm_url: Option<String>,
    pub llm_api_key: Option<String>,
    pub llm_model: Option<String>,
    pub system_prompt: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct TtsYaml {
    pub minimax_api_key: Option<String>,
    pub minimax_group_id: Option<String>,
    pub minimax_voice_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AuthYaml {
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct SecurityYaml {
    pub cors_allowed_origins: Option<String>,
    pub rate_limit_requests_per_second: Option<u32>,
    pub rate_limit_burst_size: Option<u32>,
}

impl YamlConfig {
    /// Overlays this file's values on top of an environment-derived base
    /// (YAML wins wherever it specifies a value)
    pub fn overlay(self, mut base: ServerConfig) -> ServerConfig {
        if let Some(server) = self.server {
            if let Some(host) = server.host {
                base.host = host;
            }
            if let Some(port) = server.port {
                base.port = port;
            }
            if let Some(tls) = server.tls
                && let (Some(cert_path), Some(key_path)) = (tls.cert_path, tls.key_path)
            {
                base.tls = Some(TlsConfig { cert_path, key_path });
            }
            if server.frontend_dir.is_some() {
                base.frontend_dir = server.frontend_dir;
            }
        }
        if let Some(agora) = self.agora {
            if agora.app_id.is_some() {
                base.app_id = agora.app_id;
            }
            if agora.app_certificate.is_some() {
                base.app_certificate = agora.app_certificate;
            }
            if agora.api_key.is_some() {
                base.rest_api_key = agora.api_key;
            }
            if agora.api_secret.is_some() {
                base.rest_api_secret = agora.api_secret;
            }
            if let Some(api_base) = agora.convo_api_base {
                base.agent_api_base = api_base;
            }
        }
        if let Some(agent) = self.agent {
            if agent.llm_url.is_some() {
                base.llm_url = agent.llm_url;
            }
            if agent.llm_api_key.is_some() {
                base.llm_api_key = agent.llm_api_key;
            }
            if let Some(model) = agent.llm_model {
                base.llm_model = model;
            }
            if agent.system_prompt.is_some() {
                base.llm_system_prompt = agent.system_prompt;
            }
        }
        if let Some(tts) = self.tts {
            if tts.minimax_api_key.is_some() {
                base.minimax_api_key = tts.minimax_api_key;
            }
            if tts.minimax_group_id.is_some() {
                base.minimax_group_id = tts.minimax_group_id;
            }
            if tts.minimax_voice_id.is_some() {
                base.minimax_voice_id = tts.minimax_voice_id;
            }
        }
        if let Some(auth) = self.auth {
            if auth.username.is_some() {
                base.auth_username = auth.username;
            }
            if auth.password.is_some() {
                base.auth_password = auth.password;
            }
        }
        if let Some(security) = self.security {
            if security.cors_allowed_origins.is_some() {
                base.cors_allowed_origins = security.cors_allowed_origins;
            }
            if let Some(rps) = security.rate_limit_requests_per_second {
                base.rate_limit_requests_per_second = rps;
            }
            if let Some(burst) = security.rate_limit_burst_size {
                base.rate_limit_burst_size = burst;
            }
        }
        base
    }
}
