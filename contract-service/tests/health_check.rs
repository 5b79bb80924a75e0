mod common;

use axum::http::{Method, StatusCode};
use common::*;
use contract_service::config::CredentialStore;
use contract_service::services::metrics::init_metrics;
use wiremock::MockServer;

#[tokio::test]
async fn health_check_returns_ok() {
    let server = MockServer::start().await;
    let response = send(
        app(&settings_for(&server), CredentialStore::default()),
        Method::GET,
        "/health",
        "",
    )
    .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "ok");
    assert_eq!(response.body["service"], "contract-service");
    assert!(response.headers.contains_key("x-request-id"));
    assert_eq!(response.headers["x-content-type-options"], "nosniff");
}

#[tokio::test]
async fn metrics_endpoint_exposes_http_and_contract_metrics() {
    init_metrics();

    let server = MockServer::start().await;
    let settings = settings_for(&server);

    let rejected = send(
        app(&settings, CredentialStore::default()),
        Method::GET,
        "/api/contrato",
        "",
    )
    .await;
    assert_eq!(rejected.status, StatusCode::METHOD_NOT_ALLOWED);

    let health = send(
        app(&settings, CredentialStore::default()),
        Method::GET,
        "/health",
        "",
    )
    .await;
    assert_eq!(health.status, StatusCode::OK);

    let response = send(
        app(&settings, CredentialStore::default()),
        Method::GET,
        "/metrics",
        "",
    )
    .await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(
        response.text.contains("http_requests_total"),
        "http_requests_total missing from /metrics:\n{}",
        response.text
    );
    assert!(response.text.contains("http_request_duration_seconds"));
    assert!(response.text.contains("path=\"/api/contrato\""));
    assert!(response.text.contains("contract_requests_total"));
}
