//! The contract pipeline: method gate, parse, credential, prompt, upstream
//! call, response mapping. Each stage returns early on failure.

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, Path, State},
    http::{HeaderMap, Method, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use std::any::Any;
use std::sync::Arc;

use crate::error::ContractError;
use crate::models::{CompletionResult, IntakeForm};
use crate::services::metrics;
use crate::services::{InboundContext, PromptPair, ProviderAdapter};
use crate::startup::AppState;

/// `/api/contrato` with the configured default provider.
#[tracing::instrument(skip_all)]
pub async fn create_contract(
    State(state): State<AppState>,
    method: Method,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let label = state.providers.default_kind().as_str();
    let result = match state.providers.default_adapter() {
        Ok(adapter) => run_pipeline(&state, adapter, &method, &headers, body).await,
        Err(e) => Err(e),
    };

    respond(label, result)
}

/// `/api/contrato/:provider` with an explicitly named provider.
#[tracing::instrument(skip_all)]
pub async fn create_contract_with_provider(
    State(state): State<AppState>,
    Path(provider): Path<String>,
    method: Method,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let adapter = state.providers.lookup(&provider);
    let label = adapter
        .as_ref()
        .map(|adapter| adapter.kind().as_str())
        .unwrap_or("unknown");

    let result = match ensure_post(&method).and(adapter) {
        Ok(adapter) => run_pipeline(&state, adapter, &method, &headers, body).await,
        Err(e) => Err(e),
    };

    respond(label, result)
}

async fn run_pipeline(
    state: &AppState,
    adapter: Arc<dyn ProviderAdapter>,
    method: &Method,
    headers: &HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Result<CompletionResult, ContractError> {
    ensure_post(method)?;

    let body = body?;
    let form = IntakeForm::from_json(&body)?;
    let api_key = adapter.resolve_credential(&state.credentials)?;
    let prompt = PromptPair::from_intake(&form);
    let inbound = InboundContext::from_headers(headers);

    tracing::info!(
        provider = %adapter.kind(),
        provided_fields = form.provided_fields(),
        host = inbound.host.as_deref().unwrap_or("-"),
        "Requesting contract"
    );

    let reply = state
        .chat
        .complete(adapter.as_ref(), api_key, &prompt, &inbound)
        .await?;

    reply.into_completion(adapter.display_name())
}

fn ensure_post(method: &Method) -> Result<(), ContractError> {
    if method == Method::POST {
        Ok(())
    } else {
        Err(ContractError::MethodNotAllowed)
    }
}

fn respond(provider: &str, result: Result<CompletionResult, ContractError>) -> Response {
    match result {
        Ok(contract) => {
            metrics::record_contract_request(provider, "success");
            tracing::info!(
                full_len = contract.full.len(),
                preview_lines = contract.preview.lines().count(),
                "Contract generated"
            );
            (StatusCode::OK, Json(contract)).into_response()
        }
        Err(e) => {
            metrics::record_contract_request(provider, e.outcome());
            if e.is_client_error() {
                tracing::info!(outcome = e.outcome(), "Rejected contract request: {}", e);
            } else {
                tracing::error!(
                    outcome = e.outcome(),
                    status = e.status_code().as_u16(),
                    "Contract request failed: {}",
                    e
                );
            }
            e.into_response()
        }
    }
}

/// Turn a handler panic into the "unexpected error" response.
pub fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let message = panic
        .downcast_ref::<String>()
        .cloned()
        .or_else(|| panic.downcast_ref::<&str>().map(|s| s.to_string()))
        .unwrap_or_else(|| "handler panicked".to_string());

    tracing::error!(panic = %message, "Contract handler panicked");
    ContractError::Unexpected(anyhow::anyhow!(message)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_post_passes_the_gate() {
        assert!(ensure_post(&Method::POST).is_ok());
        for method in [Method::GET, Method::PUT, Method::DELETE, Method::PATCH, Method::OPTIONS] {
            assert!(matches!(
                ensure_post(&method),
                Err(ContractError::MethodNotAllowed)
            ));
        }
    }

    #[tokio::test]
    async fn panics_render_as_unexpected_error() {
        let response = panic_response(Box::new("index out of bounds"));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], "Unexpected error");
        assert_eq!(json["detail"], "index out of bounds");
    }
}
