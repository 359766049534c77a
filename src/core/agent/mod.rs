//! Agent session gateway
//!
//! Bridges browser-issued intents (describe a channel, start an agent, stop
//! an agent) to the remote agent-hosting REST API, minting unified tokens
//! where a signing certificate is configured. When REST credentials are
//! absent the gateway degrades to an explicit demo fallback instead of
//! calling out.

pub mod client;
pub mod payload;

use std::time::{SystemTime, UNIX_EPOCH};

use rand::Rng;

pub use client::{AgentRestClient, DEFAULT_AGENT_API_BASE};
use payload::{
    AGENT_FAILURE_MESSAGE, AdvancedFeatures, AsrConfig, AudioSetting, JoinSessionRequest,
    LlmConfig, LlmParams, MinimaxTtsParams, SessionParameters, SessionProperties, SystemMessage,
    TtsConfig, VoiceSetting,
};

use crate::config::ServerConfig;
use crate::core::token::{DEFAULT_TOKEN_VALIDITY_SECS, UserId, build_token};
use crate::errors::AppResult;

/// System prompt used when neither the request nor the configuration
/// provides one
pub const FALLBACK_SYSTEM_PROMPT: &str = "You are a friendly AI companion";

/// MiniMax websocket TTS endpoint
const MINIMAX_TTS_URL: &str = "wss://api-uw.minimax.io/ws/v1/t2a_v2";
const MINIMAX_TTS_MODEL: &str = "speech-2.6-turbo";

/// Channel description handed to the browser client
#[derive(Debug, Clone)]
pub struct ChannelInfo {
    pub app_id: Option<String>,
    pub channel: String,
    pub uid: UserId,
    pub token: Option<String>,
    pub expires_in: u32,
}

/// Validated inputs for starting an agent session
#[derive(Debug, Clone)]
pub struct StartAgentParams {
    pub channel: String,
    pub agent_name: String,
    pub remote_uid: UserId,
    pub voice_id: Option<String>,
    pub system_prompt: Option<String>,
}

/// Outcome of a start request: a real remote session, or the deliberate
/// degraded mode used when REST credentials are not configured
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartOutcome {
    Started { agent_id: String, agent_uid: u32 },
    DemoFallback { agent_id: String, agent_uid: u32 },
}

/// Outcome of a stop request. Remote failures are absorbed: `stopped` is
/// false and `detail` carries the underlying error, but the caller-facing
/// response is still a success.
#[derive(Debug, Clone)]
pub struct StopOutcome {
    pub stopped: bool,
    pub detail: Option<String>,
}

/// Agent-facing settings snapshot taken from the configuration at startup
#[derive(Debug, Clone)]
struct AgentSettings {
    app_id: Option<String>,
    app_certificate: Option<String>,
    llm_url: Option<String>,
    llm_api_key: Option<String>,
    llm_model: String,
    llm_system_prompt: Option<String>,
    minimax_api_key: Option<String>,
    minimax_group_id: Option<String>,
    minimax_voice_id: Option<String>,
}

/// Gateway from browser intents to the agent-hosting REST API
#[derive(Debug, Clone)]
pub struct AgentSessionGateway {
    rest: Option<AgentRestClient>,
    settings: AgentSettings,
}

impl AgentSessionGateway {
    pub fn new(config: &ServerConfig) -> Self {
        let rest = match (
            config.app_id.as_deref(),
            config.rest_api_key.as_deref(),
            config.rest_api_secret.as_deref(),
        ) {
            (Some(app_id), Some(key), Some(secret)) => Some(AgentRestClient::new(
                &config.agent_api_base,
                app_id,
                key,
                secret,
            )),
            _ => {
                tracing::warn!(
                    "agent REST credentials not configured, start/stop will use demo fallback"
                );
                None
            }
        };

        AgentSessionGateway {
            rest,
            settings: AgentSettings {
                app_id: config.app_id.clone(),
                app_certificate: config.app_certificate.clone(),
                llm_url: config.llm_url.clone(),
                llm_api_key: config.llm_api_key.clone(),
                llm_model: config.llm_model.clone(),
                llm_system_prompt: config.llm_system_prompt.clone(),
                minimax_api_key: config.minimax_api_key.clone(),
                minimax_group_id: config.minimax_group_id.clone(),
                minimax_voice_id: config.minimax_voice_id.clone(),
            },
        }
    }

    /// True when start/stop calls will reach the remote API
    pub fn has_rest_credentials(&self) -> bool {
        self.rest.is_some()
    }

    /// Describes a channel, minting a fresh user token when a signing
    /// certificate is configured. Token-build failures degrade to an
    /// unsigned description; this operation never fails.
    pub fn describe_channel(&self, channel: &str, uid: &UserId) -> ChannelInfo {
        let mut info = ChannelInfo {
            app_id: self.settings.app_id.clone(),
            channel: channel.to_string(),
            uid: uid.clone(),
            token: None,
            expires_in: 0,
        };

        if let (Some(app_id), Some(certificate)) = (
            self.settings.app_id.as_deref(),
            self.settings.app_certificate.as_deref(),
        ) {
            match build_token(app_id, certificate, channel, uid, DEFAULT_TOKEN_VALIDITY_SECS) {
                Ok(minted) => {
                    info.token = Some(minted.token);
                    info.expires_in = minted.expires_in;
                }
                Err(e) => {
                    tracing::warn!(channel, %uid, error = %e, "token mint failed, returning unsigned channel info");
                }
            }
        }

        info
    }

    /// Starts an agent session bound to `params.channel`, or returns the
    /// demo fallback when REST credentials are absent.
    pub async fn start_agent(&self, params: StartAgentParams) -> AppResult<StartOutcome> {
        // Agent identity is random and distinct from the user's uid range
        let agent_uid = rand::rng().random_range(1000..101_000u32);

        let Some(rest) = &self.rest else {
            let agent_id = format!("DEMO_AGENT_{}", unix_now_millis());
            tracing::info!(channel = %params.channel, agent_id, "demo fallback for start request");
            return Ok(StartOutcome::DemoFallback { agent_id, agent_uid });
        };

        let request = self.build_join_request(&params, agent_uid)?;
        let response = rest.join(&request).await?;
        tracing::info!(
            channel = %params.channel,
            agent_id = %response.agent_id,
            agent_uid,
            "agent session started"
        );

        Ok(StartOutcome::Started {
            agent_id: response.agent_id,
            agent_uid,
        })
    }

    /// Stops an agent session. The remote failure path is absorbed so the
    /// client's teardown is never blocked on a flaky remote call.
    pub async fn stop_agent(&self, agent_id: &str) -> StopOutcome {
        let Some(rest) = &self.rest else {
            tracing::info!(agent_id, "demo fallback for stop request");
            return StopOutcome {
                stopped: false,
                detail: None,
            };
        };

        match rest.leave(agent_id).await {
            Ok(response) => StopOutcome {
                stopped: true,
                detail: response.message,
            },
            Err(e) => {
                tracing::error!(agent_id, error = %e, "agent leave failed, reporting success anyway");
                StopOutcome {
                    stopped: false,
                    detail: Some(e.to_string()),
                }
            }
        }
    }

    /// Resolution order: request override, configured default, hard-coded
    /// fallback. The same prompt feeds the system message and the greeting.
    fn effective_system_prompt(&self, request_override: Option<&str>) -> String {
        request_override
            .filter(|p| !p.is_empty())
            .map(str::to_string)
            .or_else(|| self.settings.llm_system_prompt.clone())
            .unwrap_or_else(|| FALLBACK_SYSTEM_PROMPT.to_string())
    }

    fn build_join_request(
        &self,
        params: &StartAgentParams,
        agent_uid: u32,
    ) -> AppResult<JoinSessionRequest> {
        // Agent-scoped token when signing is configured, else unsigned join
        let token = match (
            self.settings.app_id.as_deref(),
            self.settings.app_certificate.as_deref(),
        ) {
            (Some(app_id), Some(certificate)) => build_token(
                app_id,
                certificate,
                &params.channel,
                &UserId::Numeric(agent_uid),
                DEFAULT_TOKEN_VALIDITY_SECS,
            )?
            .token,
            _ => String::new(),
        };

        let prompt = self.effective_system_prompt(params.system_prompt.as_deref());
        let voice_id = params
            .voice_id
            .clone()
            .or_else(|| self.settings.minimax_voice_id.clone());

        Ok(JoinSessionRequest {
            name: params.agent_name.clone(),
            properties: SessionProperties {
                channel: params.channel.clone(),
                token,
                agent_rtc_uid: agent_uid.to_string(),
                remote_rtc_uids: vec![params.remote_uid.rtm_user_id()],
                enable_string_uid: false,
                idle_timeout: 30,
                asr: AsrConfig::default(),
                llm: LlmConfig {
                    url: self.settings.llm_url.clone(),
                    api_key: self.settings.llm_api_key.clone(),
                    system_messages: vec![SystemMessage {
                        role: "system".to_string(),
                        content: prompt.clone(),
                    }],
                    greeting_message: prompt,
                    failure_message: AGENT_FAILURE_MESSAGE.to_string(),
                    params: LlmParams {
                        model: self.settings.llm_model.clone(),
                    },
                    input_modalities: vec!["text".to_string(), "image".to_string()],
                    output_modalities: vec!["text".to_string()],
                },
                tts: TtsConfig {
                    vendor: "minimax".to_string(),
                    params: MinimaxTtsParams {
                        url: MINIMAX_TTS_URL.to_string(),
                        key: self.settings.minimax_api_key.clone(),
                        group_id: self.settings.minimax_group_id.clone(),
                        model: MINIMAX_TTS_MODEL.to_string(),
                        voice_setting: VoiceSetting { voice_id },
                        audio_setting: AudioSetting { sample_rate: 16_000 },
                    },
                },
                advanced_features: AdvancedFeatures::default(),
                parameters: SessionParameters::default(),
            },
        })
    }
}

fn unix_now_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServerConfig;

    fn bare_config() -> ServerConfig {
        ServerConfig::for_tests()
    }

    fn params() -> StartAgentParams {
        StartAgentParams {
            channel: "room-42".to_string(),
            agent_name: "companion".to_string(),
            remote_uid: UserId::Numeric(555),
            voice_id: None,
            system_prompt: None,
        }
    }

    #[test]
    fn describe_channel_without_certificate_is_unsigned() {
        let gateway = AgentSessionGateway::new(&bare_config());
        let info = gateway.describe_channel("room-42", &UserId::Numeric(555));
        assert_eq!(info.channel, "room-42");
        assert!(info.token.is_none());
        assert_eq!(info.expires_in, 0);
    }

    #[test]
    fn describe_channel_with_certificate_mints_a_token() {
        let mut config = bare_config();
        config.app_id = Some("app123".to_string());
        config.app_certificate = Some("secretXYZ".to_string());
        let gateway = AgentSessionGateway::new(&config);

        let info = gateway.describe_channel("room-42", &UserId::Numeric(555));
        assert!(info.token.as_deref().unwrap().starts_with("007"));
        assert_eq!(info.expires_in, DEFAULT_TOKEN_VALIDITY_SECS);
    }

    #[test]
    fn describe_channel_swallows_token_failures() {
        let mut config = bare_config();
        config.app_id = Some("app123".to_string());
        config.app_certificate = Some("secretXYZ".to_string());
        let gateway = AgentSessionGateway::new(&config);

        // Non-numeric uid cannot be coerced for the RTC grant
        let info = gateway.describe_channel("room-42", &UserId::Text("alice".to_string()));
        assert!(info.token.is_none());
        assert_eq!(info.expires_in, 0);
    }

    #[tokio::test]
    async fn start_agent_without_credentials_is_demo_fallback() {
        let gateway = AgentSessionGateway::new(&bare_config());
        let outcome = gateway.start_agent(params()).await.unwrap();
        match outcome {
            StartOutcome::DemoFallback { agent_id, agent_uid } => {
                assert!(agent_id.starts_with("DEMO_AGENT_"));
                assert!((1000..101_000).contains(&agent_uid));
            }
            other => panic!("expected demo fallback, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn stop_agent_without_credentials_reports_not_stopped() {
        let gateway = AgentSessionGateway::new(&bare_config());
        let outcome = gateway.stop_agent("agent-1").await;
        assert!(!outcome.stopped);
        assert!(outcome.detail.is_none());
    }

    #[test]
    fn system_prompt_resolution_order() {
        let mut config = bare_config();
        let gateway = AgentSessionGateway::new(&config);
        assert_eq!(
            gateway.effective_system_prompt(None),
            FALLBACK_SYSTEM_PROMPT
        );

        config.llm_system_prompt = Some("configured prompt".to_string());
        let gateway = AgentSessionGateway::new(&config);
        assert_eq!(gateway.effective_system_prompt(None), "configured prompt");
        assert_eq!(
            gateway.effective_system_prompt(Some("request prompt")),
            "request prompt"
        );
        // Empty override falls through to the configured default
        assert_eq!(gateway.effective_system_prompt(Some("")), "configured prompt");
    }

    #[test]
    fn join_request_carries_channel_binding_and_voice_override() {
        let mut config = bare_config();
        config.app_id = Some("app123".to_string());
        config.app_certificate = Some("secretXYZ".to_string());
        config.minimax_voice_id = Some("default-voice".to_string());
        let gateway = AgentSessionGateway::new(&config);

        let mut p = params();
        let request = gateway.build_join_request(&p, 4242).unwrap();
        assert_eq!(request.properties.channel, "room-42");
        assert_eq!(request.properties.agent_rtc_uid, "4242");
        assert_eq!(request.properties.remote_rtc_uids, vec!["555".to_string()]);
        assert!(request.properties.token.starts_with("007"));
        assert_eq!(
            request.properties.tts.params.voice_setting.voice_id.as_deref(),
            Some("default-voice")
        );

        p.voice_id = Some("requested-voice".to_string());
        let request = gateway.build_join_request(&p, 4242).unwrap();
        assert_eq!(
            request.properties.tts.params.voice_setting.voice_id.as_deref(),
            Some("requested-voice")
        );
    }

    #[test]
    fn join_request_without_certificate_uses_empty_token() {
        let mut config = bare_config();
        config.app_id = Some("app123".to_string());
        let gateway = AgentSessionGateway::new(&config);
        let request = gateway.build_join_request(&params(), 4242).unwrap();
        assert!(request.properties.token.is_empty());
    }
}
