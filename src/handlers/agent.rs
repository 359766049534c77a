//! Channel-info and agent start/stop handlers
//!
//! Thin request/response plumbing over [`AgentSessionGateway`]: validate the
//! request shape, call the gateway, and map outcomes to the JSON contracts
//! the browser client expects (camelCase fields).

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use serde::{Deserialize, Serialize};

use crate::core::agent::{StartAgentParams, StartOutcome};
use crate::core::token::UserId;
use crate::errors::{AppError, AppResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ChannelInfoQuery {
    #[serde(default)]
    pub channel: Option<String>,
    #[serde(default)]
    pub uid: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelInfoResponse {
    pub app_id: Option<String>,
    pub channel: String,
    pub uid: UserId,
    pub token: Option<String>,
    pub expires_in: u32,
}

/// `GET /api/agora/channel-info?channel=&uid=`
///
/// Returns the channel description with a freshly minted token when signing
/// is configured; degrades to `token: null` otherwise.
pub async fn channel_info(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ChannelInfoQuery>,
) -> AppResult<Json<ChannelInfoResponse>> {
    let (Some(channel), Some(uid)) = (
        query.channel.filter(|c| !c.is_empty()),
        query.uid.filter(|u| !u.is_empty()),
    ) else {
        return Err(AppError::InvalidArgument(
            "Channel and uid are required".to_string(),
        ));
    };

    let uid = UserId::from_request(&uid);
    let info = state.agents.describe_channel(&channel, &uid);
    Ok(Json(ChannelInfoResponse {
        app_id: info.app_id,
        channel: info.channel,
        uid: info.uid,
        token: info.token,
        expires_in: info.expires_in,
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartRequest {
    #[serde(default)]
    pub channel: Option<String>,
    #[serde(default)]
    pub agent_name: Option<String>,
    #[serde(default)]
    pub remote_uid: Option<UserId>,
    #[serde(default)]
    pub voice_id: Option<String>,
    #[serde(default)]
    pub system_prompt: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StartResponse {
    pub success: bool,
    pub agent_id: String,
    pub agent_uid: u32,
    pub channel: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub demo: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// `POST /api/agora/start`
pub async fn start_agent(
    State(state): State<Arc<AppState>>,
    Json(request): Json<StartRequest>,
) -> AppResult<Json<StartResponse>> {
    let (Some(channel), Some(agent_name), Some(remote_uid)) = (
        request.channel.filter(|c| !c.is_empty()),
        request.agent_name.filter(|n| !n.is_empty()),
        request.remote_uid,
    ) else {
        return Err(AppError::InvalidArgument(
            "Channel, agentName, and remoteUid are required".to_string(),
        ));
    };

    let outcome = state
        .agents
        .start_agent(StartAgentParams {
            channel: channel.clone(),
            agent_name,
            remote_uid,
            voice_id: request.voice_id,
            system_prompt: request.system_prompt,
        })
        .await?;

    let response = match outcome {
        StartOutcome::Started { agent_id, agent_uid } => StartResponse {
            success: true,
            agent_id,
            agent_uid,
            channel,
            demo: None,
            message: None,
        },
        StartOutcome::DemoFallback { agent_id, agent_uid } => StartResponse {
            success: true,
            agent_id,
            agent_uid,
            channel,
            demo: Some(true),
            message: Some(
                "Demo mode - configure API credentials for full functionality".to_string(),
            ),
        },
    };
    Ok(Json(response))
}

#[derive(Debug, Serialize)]
pub struct StopResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub demo: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// `DELETE /api/agora/stop/{agentId}`
///
/// Always reports success: the client's teardown must never be blocked by a
/// flaky remote call. Remote errors surface as a `demo` marker with detail.
pub async fn stop_agent(
    State(state): State<Arc<AppState>>,
    Path(agent_id): Path<String>,
) -> Json<StopResponse> {
    let outcome = state.agents.stop_agent(&agent_id).await;

    let response = if !state.agents.has_rest_credentials() {
        StopResponse {
            success: true,
            message: "Conversation stopped (demo mode - no API credentials)".to_string(),
            demo: Some(true),
            error: None,
        }
    } else if outcome.stopped {
        StopResponse {
            success: true,
            message: format!(
                "Conversation stopped {}",
                outcome.detail.unwrap_or_default()
            ),
            demo: None,
            error: None,
        }
    } else {
        StopResponse {
            success: true,
            message: "Conversation stopped (demo mode - API error handled)".to_string(),
            demo: Some(true),
            error: outcome.detail,
        }
    };
    Json(response)
}
