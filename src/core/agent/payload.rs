//! Session-configuration payload for the conversational-agent REST API
//!
//! These types mirror the platform's `join` request body. Most fields are
//! opaque passthrough configuration (speech vendor, silence policy); the
//! gateway only decides the channel binding, the agent token and the
//! effective system prompt.

use serde::{Deserialize, Serialize};

/// Failure message spoken by the agent when a turn cannot be completed
pub const AGENT_FAILURE_MESSAGE: &str =
    "Sorry, I'm having some trouble right now. Let me try again!";

/// Prompt sent to the agent after prolonged user silence
pub const SILENCE_NUDGE_CONTENT: &str =
    "User hasn't spoken for a while. Engage the user with a question or prompt.";

/// Body of `POST /projects/{app_id}/join`
#[derive(Debug, Clone, Serialize)]
pub struct JoinSessionRequest {
    /// Agent session name, unique per channel on the platform side
    pub name: String,
    pub properties: SessionProperties,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionProperties {
    pub channel: String,
    /// Agent-scoped unified token; empty string when no certificate is
    /// configured (the platform accepts unsigned joins for open projects)
    pub token: String,
    pub agent_rtc_uid: String,
    pub remote_rtc_uids: Vec<String>,
    pub enable_string_uid: bool,
    /// Seconds the agent stays in the channel with no remote users
    pub idle_timeout: u32,
    pub asr: AsrConfig,
    pub llm: LlmConfig,
    pub tts: TtsConfig,
    pub advanced_features: AdvancedFeatures,
    pub parameters: SessionParameters,
}

#[derive(Debug, Clone, Serialize)]
pub struct AsrConfig {
    pub vendor: String,
    pub language: String,
}

impl Default for AsrConfig {
    fn default() -> Self {
        AsrConfig {
            vendor: "ares".to_string(),
            language: "en-US".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LlmConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    pub system_messages: Vec<SystemMessage>,
    pub greeting_message: String,
    pub failure_message: String,
    pub params: LlmParams,
    pub input_modalities: Vec<String>,
    pub output_modalities: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SystemMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LlmParams {
    pub model: String,
}

/// MiniMax websocket TTS vendor block
#[derive(Debug, Clone, Serialize)]
pub struct TtsConfig {
    pub vendor: String,
    pub params: MinimaxTtsParams,
}

#[derive(Debug, Clone, Serialize)]
pub struct MinimaxTtsParams {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
    pub model: String,
    pub voice_setting: VoiceSetting,
    pub audio_setting: AudioSetting,
}

#[derive(Debug, Clone, Serialize)]
pub struct VoiceSetting {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voice_id: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AudioSetting {
    pub sample_rate: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct AdvancedFeatures {
    pub enable_aivad: bool,
    pub enable_bhvs: bool,
    pub enable_rtm: bool,
}

impl Default for AdvancedFeatures {
    fn default() -> Self {
        AdvancedFeatures {
            enable_aivad: true,
            enable_bhvs: true,
            enable_rtm: true,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionParameters {
    pub data_channel: String,
    pub transcript: TranscriptConfig,
    pub silence_config: SilenceConfig,
}

impl Default for SessionParameters {
    fn default() -> Self {
        SessionParameters {
            data_channel: "rtm".to_string(),
            transcript: TranscriptConfig { redundant: false },
            silence_config: SilenceConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TranscriptConfig {
    pub redundant: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct SilenceConfig {
    pub timeout_ms: u32,
    /// What the agent does after the timeout ("think" makes it respond)
    pub action: String,
    pub content: String,
}

impl Default for SilenceConfig {
    fn default() -> Self {
        SilenceConfig {
            timeout_ms: 30_000,
            action: "think".to_string(),
            content: SILENCE_NUDGE_CONTENT.to_string(),
        }
    }
}

/// Response of `POST /projects/{app_id}/join`
#[derive(Debug, Clone, Deserialize)]
pub struct JoinSessionResponse {
    pub agent_id: String,
}

/// Response of `POST /projects/{app_id}/agents/{agent_id}/leave`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LeaveSessionResponse {
    #[serde(default)]
    pub message: Option<String>,
}
