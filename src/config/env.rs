//! Environment variable loading

use std::path::PathBuf;

use super::{ServerConfig, TlsConfig};
use crate::core::agent::DEFAULT_AGENT_API_BASE;

/// Reads a variable, treating empty values as unset
fn opt(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn parse_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    opt(name).and_then(|v| v.parse().ok()).unwrap_or(default)
}

/// Builds a `ServerConfig` purely from the process environment.
/// Validation happens in the caller.
pub(super) fn load_from_env() -> ServerConfig {
    let tls = match (opt("TLS_CERT_PATH"), opt("TLS_KEY_PATH")) {
        (Some(cert), Some(key)) => Some(TlsConfig {
            cert_path: PathBuf::from(cert),
            key_path: PathBuf::from(key),
        }),
        _ => None,
    };

    ServerConfig {
        host: opt("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
        port: parse_or("PORT", 3000),
        tls,
        app_id: opt("AGORA_APP_ID"),
        app_certificate: opt("AGORA_APP_CERTIFICATE"),
        rest_api_key: opt("AGORA_API_KEY"),
        rest_api_secret: opt("AGORA_API_SECRET"),
        agent_api_base: opt("AGORA_CONVO_API_BASE")
            .unwrap_or_else(|| DEFAULT_AGENT_API_BASE.to_string()),
        llm_url: opt("LLM_URL"),
        llm_api_key: opt("LLM_API_KEY"),
        llm_model: opt("LLM_MODEL").unwrap_or_else(|| "gpt-4o-mini".to_string()),
        llm_system_prompt: opt("LLM_SYSTEM_PROMPT"),
        minimax_api_key: opt("TTS_MINIMAX_API_KEY"),
        minimax_group_id: opt("TTS_MINIMAX_GROUP_ID"),
        minimax_voice_id: opt("TTS_MINIMAX_VOICE_ID"),
        auth_username: opt("AUTH_USERNAME"),
        auth_password: opt("AUTH_PASSWORD"),
        frontend_dir: opt("FRONTEND_DIR").map(PathBuf::from),
        cors_allowed_origins: opt("CORS_ALLOWED_ORIGINS"),
        rate_limit_requests_per_second: parse_or("RATE_LIMIT_RPS", 60),
        rate_limit_burst_size: parse_or("RATE_LIMIT_BURST", 10),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_vars() {
        for name in [
            "HOST",
            "PORT",
            "AGORA_APP_ID",
            "AGORA_APP_CERTIFICATE",
            "AGORA_API_KEY",
            "AGORA_API_SECRET",
            "AGORA_CONVO_API_BASE",
            "LLM_MODEL",
            "AUTH_USERNAME",
            "AUTH_PASSWORD",
        ] {
            unsafe { std::env::remove_var(name) };
        }
    }

    #[test]
    #[serial]
    fn defaults_apply_when_environment_is_empty() {
        clear_vars();
        let config = load_from_env();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3000);
        assert_eq!(config.agent_api_base, DEFAULT_AGENT_API_BASE);
        assert_eq!(config.llm_model, "gpt-4o-mini");
        assert!(config.app_id.is_none());
        assert!(!config.has_basic_auth());
    }

    #[test]
    #[serial]
    fn environment_values_override_defaults() {
        clear_vars();
        unsafe {
            std::env::set_var("PORT", "8080");
            std::env::set_var("AGORA_APP_ID", "app123");
            std::env::set_var("AGORA_APP_CERTIFICATE", "secretXYZ");
        }
        let config = load_from_env();
        assert_eq!(config.port, 8080);
        assert!(config.has_signing_certificate());
        clear_vars();
    }

    #[test]
    #[serial]
    fn empty_values_count_as_unset() {
        clear_vars();
        unsafe { std::env::set_var("AGORA_APP_ID", "  ") };
        let config = load_from_env();
        assert!(config.app_id.is_none());
        clear_vars();
    }
}
