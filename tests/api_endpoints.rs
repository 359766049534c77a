//! API Endpoint Tests
//!
//! Exercises the HTTP surface with in-process `oneshot` requests: the
//! channel-info contract, demo-mode start/stop, and the basic-auth gate.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use axum::{Router, middleware};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::util::ServiceExt;

use convo_gateway::middleware::basic_auth_middleware;
use convo_gateway::{AppState, ServerConfig, routes};

fn app_for(config: ServerConfig) -> Router {
    let state = AppState::new(config);
    routes::api::create_api_router().with_state(state)
}

fn gated_app_for(config: ServerConfig) -> Router {
    let state = AppState::new(config);
    routes::api::create_api_router()
        .layer(middleware::from_fn_with_state(
            state.clone(),
            basic_auth_middleware,
        ))
        .with_state(state)
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn channel_info_without_certificate_returns_null_token() {
    let mut config = ServerConfig::for_tests();
    config.app_id = Some("app123".to_string());
    let app = app_for(config);

    let request = Request::builder()
        .uri("/api/agora/channel-info?channel=room-42&uid=555")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["appId"], "app123");
    assert_eq!(body["channel"], "room-42");
    assert_eq!(body["uid"], 555);
    assert_eq!(body["token"], Value::Null);
    assert_eq!(body["expiresIn"], 0);
}

#[tokio::test]
async fn channel_info_with_certificate_returns_signed_token() {
    let mut config = ServerConfig::for_tests();
    config.app_id = Some("app123".to_string());
    config.app_certificate = Some("secretXYZ".to_string());
    let app = app_for(config);

    let request = Request::builder()
        .uri("/api/agora/channel-info?channel=room-42&uid=555")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert!(body["token"].as_str().unwrap().starts_with("007"));
    assert_eq!(body["expiresIn"], 3600);
}

#[tokio::test]
async fn channel_info_requires_channel_and_uid() {
    for uri in [
        "/api/agora/channel-info",
        "/api/agora/channel-info?channel=room-42",
        "/api/agora/channel-info?uid=555",
        "/api/agora/channel-info?channel=&uid=555",
    ] {
        let app = app_for(ServerConfig::for_tests());
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "uri: {uri}");
        let body = body_json(response).await;
        assert!(body["error"].as_str().unwrap().contains("required"));
    }
}

#[tokio::test]
async fn start_without_credentials_returns_demo_response() {
    let app = app_for(ServerConfig::for_tests());
    let request = Request::builder()
        .method("POST")
        .uri("/api/agora/start")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            r#"{"channel":"room-42","agentName":"companion","remoteUid":555}"#,
        ))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert!(body["agentId"].as_str().unwrap().starts_with("DEMO_AGENT_"));
    assert_eq!(body["demo"], true);
    assert_eq!(body["channel"], "room-42");
    let agent_uid = body["agentUid"].as_u64().unwrap();
    assert!((1000..101_000).contains(&agent_uid));
}

#[tokio::test]
async fn start_accepts_string_remote_uid() {
    let app = app_for(ServerConfig::for_tests());
    let request = Request::builder()
        .method("POST")
        .uri("/api/agora/start")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            r#"{"channel":"room-42","agentName":"companion","remoteUid":"555"}"#,
        ))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn start_rejects_missing_fields() {
    let app = app_for(ServerConfig::for_tests());
    let request = Request::builder()
        .method("POST")
        .uri("/api/agora/start")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"channel":"room-42"}"#))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert!(
        body["error"]
            .as_str()
            .unwrap()
            .contains("Channel, agentName, and remoteUid")
    );
}

#[tokio::test]
async fn stop_without_credentials_reports_demo_success() {
    let app = app_for(ServerConfig::for_tests());
    let request = Request::builder()
        .method("DELETE")
        .uri("/api/agora/stop/agent-123")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["demo"], true);
    assert!(body["message"].as_str().unwrap().contains("stopped"));
}

#[tokio::test]
async fn gate_disabled_when_no_credentials_configured() {
    let app = gated_app_for(ServerConfig::for_tests());
    let request = Request::builder()
        .uri("/api/agora/channel-info?channel=room-42&uid=555")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn gate_challenges_missing_and_wrong_credentials() {
    let mut config = ServerConfig::for_tests();
    config.auth_username = Some("operator".to_string());
    config.auth_password = Some("hunter2".to_string());

    // Missing header
    let app = gated_app_for(config.clone());
    let request = Request::builder()
        .uri("/api/agora/channel-info?channel=room-42&uid=555")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let challenge = response.headers().get(header::WWW_AUTHENTICATE).unwrap();
    assert!(challenge.to_str().unwrap().starts_with("Basic realm="));

    // Wrong password
    let app = gated_app_for(config);
    let request = Request::builder()
        .uri("/api/agora/channel-info?channel=room-42&uid=555")
        .header(
            header::AUTHORIZATION,
            format!("Basic {}", BASE64.encode("operator:wrong")),
        )
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn gate_passes_correct_credentials() {
    let mut config = ServerConfig::for_tests();
    config.auth_username = Some("operator".to_string());
    config.auth_password = Some("hunter2".to_string());
    let app = gated_app_for(config);

    let request = Request::builder()
        .uri("/api/agora/channel-info?channel=room-42&uid=555")
        .header(
            header::AUTHORIZATION,
            format!("Basic {}", BASE64.encode("operator:hunter2")),
        )
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
