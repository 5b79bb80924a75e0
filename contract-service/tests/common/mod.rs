//! Shared helpers for driving the router against a stubbed provider.
#![allow(dead_code)]

use axum::{
    body::Body,
    http::{HeaderMap, Method, Request, StatusCode},
    Router,
};
use contract_service::config::{CredentialStore, ProviderSettings};
use contract_service::{build_router, AppState};
use serde_json::{json, Value};
use std::time::Duration;
use tower::util::ServiceExt;
use wiremock::MockServer;

pub const OPENAI_PATH: &str = "/v1/chat/completions";
pub const OPENROUTER_PATH: &str = "/api/v1/chat/completions";

/// Settings pointing both adapters at the mock server.
pub fn settings_for(server: &MockServer) -> ProviderSettings {
    ProviderSettings {
        openai_url: format!("{}{}", server.uri(), OPENAI_PATH),
        openrouter_url: format!("{}{}", server.uri(), OPENROUTER_PATH),
        timeout: Duration::from_secs(5),
        ..ProviderSettings::default()
    }
}

pub fn app(settings: &ProviderSettings, credentials: CredentialStore) -> Router {
    let state = AppState::new(settings, credentials).expect("Failed to build app state");
    build_router(state)
}

pub fn openai_key() -> CredentialStore {
    CredentialStore::from_pairs([("OPENAI_API_KEY", "sk-test")])
}

/// A chat-completions success body with the given message content.
pub fn completion(content: &str) -> Value {
    json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "model": "gpt-4o-mini",
        "choices": [
            {
                "index": 0,
                "message": { "role": "assistant", "content": content },
                "finish_reason": "stop"
            }
        ]
    })
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
    pub text: String,
}

pub async fn send(app: Router, method: Method, uri: &str, body: &str) -> TestResponse {
    send_with_headers(app, method, uri, body, &[]).await
}

pub async fn send_with_headers(
    app: Router,
    method: Method,
    uri: &str,
    body: &str,
    headers: &[(&str, &str)],
) -> TestResponse {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }

    let response = app
        .oneshot(builder.body(Body::from(body.to_string())).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    let text = String::from_utf8_lossy(&bytes).into_owned();

    TestResponse {
        status,
        headers,
        body,
        text,
    }
}

/// JSON bodies of every request the mock server received.
pub async fn received_bodies(server: &MockServer) -> Vec<Value> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .map(|request| serde_json::from_slice(&request.body).unwrap())
        .collect()
}
