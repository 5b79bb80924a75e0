//! Error taxonomy of the contract pipeline and its JSON rendering.

use axum::{
    extract::rejection::BytesRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// Every way a contract request can end without a contract.
///
/// Each variant is terminal: the handler renders it and stops.
#[derive(Debug, Error)]
pub enum ContractError {
    #[error("Method Not Allowed")]
    MethodNotAllowed,

    #[error("Unreadable request body: {0}")]
    Body(#[from] BytesRejection),

    #[error("Invalid JSON: {0}")]
    InvalidJson(#[source] serde_json::Error),

    #[error("Unknown provider: {0}")]
    UnknownProvider(String),

    #[error("{}", missing_credential_message(.expected))]
    MissingCredential { expected: &'static [&'static str] },

    #[error("Failed to reach {provider}: {source}")]
    Transport {
        provider: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("Invalid JSON from {provider}: {detail}")]
    InvalidUpstreamJson {
        provider: &'static str,
        detail: String,
        raw: String,
    },

    #[error("{provider} error ({status})")]
    Upstream {
        provider: &'static str,
        status: StatusCode,
        detail: Value,
    },

    #[error("Unexpected error: {0:#}")]
    Unexpected(#[from] anyhow::Error),
}

fn missing_credential_message(expected: &[&str]) -> String {
    match expected {
        [single] => format!("Missing {}", single),
        [init @ .., last] => format!("Missing API key (set {} or {})", init.join(", "), last),
        [] => "Missing API key".to_string(),
    }
}

impl ContractError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ContractError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ContractError::Body(rejection) => rejection.status(),
            ContractError::InvalidJson(_) => StatusCode::BAD_REQUEST,
            ContractError::UnknownProvider(_) => StatusCode::NOT_FOUND,
            ContractError::MissingCredential { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            ContractError::Transport { .. } => StatusCode::BAD_GATEWAY,
            ContractError::InvalidUpstreamJson { .. } => StatusCode::BAD_GATEWAY,
            ContractError::Upstream { status, .. } => *status,
            ContractError::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short label used for metrics and logs.
    pub fn outcome(&self) -> &'static str {
        match self {
            ContractError::MethodNotAllowed => "method_not_allowed",
            ContractError::Body(_) => "unreadable_body",
            ContractError::InvalidJson(_) => "invalid_json",
            ContractError::UnknownProvider(_) => "unknown_provider",
            ContractError::MissingCredential { .. } => "missing_credential",
            ContractError::Transport { .. } => "transport_error",
            ContractError::InvalidUpstreamJson { .. } => "invalid_upstream_json",
            ContractError::Upstream { .. } => "upstream_error",
            ContractError::Unexpected(_) => "unexpected_error",
        }
    }

    /// Whether the failure originated on the caller's side.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ContractError::MethodNotAllowed
                | ContractError::Body(_)
                | ContractError::InvalidJson(_)
                | ContractError::UnknownProvider(_)
        )
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    raw: Option<String>,
}

impl ErrorBody {
    fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            status: None,
            detail: None,
            raw: None,
        }
    }

    fn detail(mut self, detail: impl Into<Value>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

impl IntoResponse for ContractError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let body = match self {
            ContractError::MethodNotAllowed => ErrorBody::new("Method Not Allowed"),
            ContractError::Body(rejection) => ErrorBody::new(
                status
                    .canonical_reason()
                    .unwrap_or("Unreadable request body"),
            )
            .detail(rejection.body_text()),
            ContractError::InvalidJson(_) => ErrorBody::new("Invalid JSON"),
            ContractError::UnknownProvider(name) => ErrorBody::new("Unknown provider").detail(name),
            err @ ContractError::MissingCredential { .. } => ErrorBody::new(err.to_string()),
            ContractError::Transport { provider, source } => {
                ErrorBody::new(format!("Failed to reach {}", provider)).detail(source.to_string())
            }
            ContractError::InvalidUpstreamJson {
                provider,
                detail,
                raw,
            } => ErrorBody {
                raw: Some(raw),
                ..ErrorBody::new(format!("Invalid JSON from {}", provider)).detail(detail)
            },
            ContractError::Upstream {
                provider,
                status,
                detail,
            } => ErrorBody {
                status: Some(status.as_u16()),
                ..ErrorBody::new(format!("{} error", provider)).detail(detail)
            },
            ContractError::Unexpected(err) => {
                ErrorBody::new("Unexpected error").detail(format!("{:#}", err))
            }
        };

        (status, Json(body)).into_response()
    }
}
