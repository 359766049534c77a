//! REST client for the conversational-agent hosting API
//!
//! One authenticated round-trip per call, no retries. Credentials are the
//! API key/secret pair, distinct from the token-signing certificate, sent
//! as HTTP Basic auth on every request.

use reqwest::StatusCode;

use super::payload::{JoinSessionRequest, JoinSessionResponse, LeaveSessionResponse};
use crate::errors::{AppError, AppResult};

/// Default base URL of the agent-hosting REST API
pub const DEFAULT_AGENT_API_BASE: &str = "https://api.agora.io/api/conversational-ai-agent/v2";

/// Authenticated client bound to one application's project path
#[derive(Debug, Clone)]
pub struct AgentRestClient {
    http: reqwest::Client,
    base_url: String,
    app_id: String,
    api_key: String,
    api_secret: String,
}

impl AgentRestClient {
    pub fn new(base_url: &str, app_id: &str, api_key: &str, api_secret: &str) -> Self {
        AgentRestClient {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            app_id: app_id.to_string(),
            api_key: api_key.to_string(),
            api_secret: api_secret.to_string(),
        }
    }

    /// Creates an agent session, returning the remote agent identifier
    pub async fn join(&self, request: &JoinSessionRequest) -> AppResult<JoinSessionResponse> {
        let url = format!("{}/projects/{}/join", self.base_url, self.app_id);
        let response = self
            .http
            .post(&url)
            .basic_auth(&self.api_key, Some(&self.api_secret))
            .json(request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "agent join request failed to send");
                AppError::remote_transport(&e)
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "agent join rejected");
            return Err(AppError::remote_rejected(status, body));
        }

        response.json::<JoinSessionResponse>().await.map_err(|e| {
            tracing::error!(error = %e, "agent join response was not valid JSON");
            AppError::remote_transport(&e)
        })
    }

    /// Terminates an agent session by its remote identifier
    pub async fn leave(&self, agent_id: &str) -> AppResult<LeaveSessionResponse> {
        let url = format!(
            "{}/projects/{}/agents/{}/leave",
            self.base_url, self.app_id, agent_id
        );
        let response = self
            .http
            .post(&url)
            .basic_auth(&self.api_key, Some(&self.api_secret))
            .json(&serde_json::json!({}))
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, agent_id, "agent leave request failed to send");
                AppError::remote_transport(&e)
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, agent_id, "agent leave rejected");
            return Err(AppError::remote_rejected(status, body));
        }

        // Some deployments return an empty body on success
        if status == StatusCode::NO_CONTENT {
            return Ok(LeaveSessionResponse::default());
        }
        Ok(response
            .json::<LeaveSessionResponse>()
            .await
            .unwrap_or_default())
    }
}
