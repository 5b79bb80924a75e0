//! The single outbound chat-completion call and the mapping of its reply.

use crate::config::ProviderSettings;
use crate::error::ContractError;
use crate::models::CompletionResult;
use crate::services::metrics;
use crate::services::prompt::PromptPair;
use crate::services::providers::{InboundContext, ProviderAdapter};
use axum::http::StatusCode;
use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use serde::Serialize;
use serde_json::Value;
use service_core::error::AppError;
use std::time::Instant;

/// HTTP client shared by every request; holds the connection pool.
#[derive(Clone)]
pub struct ChatClient {
    client: Client,
    temperature: f64,
    model_override: Option<String>,
}

/// Raw upstream reply: status plus the undecoded body text.
#[derive(Debug, Clone)]
pub struct UpstreamReply {
    pub status: StatusCode,
    pub body: String,
}

impl ChatClient {
    pub fn new(settings: &ProviderSettings) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(|e| {
                AppError::InternalError(anyhow::anyhow!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            temperature: settings.temperature,
            model_override: settings.model_override.clone(),
        })
    }

    pub fn model_for<'a>(&'a self, adapter: &'a dyn ProviderAdapter) -> &'a str {
        self.model_override
            .as_deref()
            .unwrap_or_else(|| adapter.default_model())
    }

    /// POST the prompt pair once. No retries.
    ///
    /// Only transport failures are errors here; any HTTP status is returned
    /// as an [`UpstreamReply`] for [`UpstreamReply::into_completion`] to judge.
    pub async fn complete(
        &self,
        adapter: &dyn ProviderAdapter,
        api_key: &Secret<String>,
        prompt: &PromptPair,
        inbound: &InboundContext,
    ) -> Result<UpstreamReply, ContractError> {
        let provider = adapter.display_name();
        let model = self.model_for(adapter);

        let request = ChatCompletionRequest {
            model,
            temperature: self.temperature,
            max_tokens: adapter.max_tokens(),
            messages: [
                ChatMessage {
                    role: "system",
                    content: &prompt.system,
                },
                ChatMessage {
                    role: "user",
                    content: &prompt.user,
                },
            ],
        };

        tracing::debug!(
            provider = %adapter.kind(),
            model = %model,
            endpoint = %adapter.endpoint(),
            prompt_len = prompt.user.len(),
            "Sending chat completion request"
        );

        let start = Instant::now();

        let response = self
            .client
            .post(adapter.endpoint())
            .bearer_auth(api_key.expose_secret())
            .headers(adapter.build_headers(inbound))
            .json(&request)
            .send()
            .await
            .map_err(|source| ContractError::Transport { provider, source })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|source| ContractError::Transport { provider, source })?;

        metrics::record_upstream_latency(adapter.kind().as_str(), start.elapsed().as_secs_f64());

        tracing::debug!(
            provider = %adapter.kind(),
            status = status.as_u16(),
            body_len = body.len(),
            "Received chat completion response"
        );

        Ok(UpstreamReply { status, body })
    }
}

impl UpstreamReply {
    /// Decode the reply into a contract, or the matching error.
    ///
    /// JSON validity is checked before the status so that a non-JSON error
    /// page still surfaces as "invalid JSON" with its raw text.
    pub fn into_completion(self, provider: &'static str) -> Result<CompletionResult, ContractError> {
        let json: Value = match serde_json::from_str(&self.body) {
            Ok(json) => json,
            Err(e) => {
                return Err(ContractError::InvalidUpstreamJson {
                    provider,
                    detail: e.to_string(),
                    raw: self.body,
                })
            }
        };

        if !self.status.is_success() {
            return Err(ContractError::Upstream {
                provider,
                status: self.status,
                detail: json,
            });
        }

        let content = json
            .pointer("/choices/0/message/content")
            .and_then(Value::as_str)
            .unwrap_or_default();

        Ok(CompletionResult::from_content(content))
    }
}

// ============================================================================
// Chat Completions Wire Types
// ============================================================================

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    temperature: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    messages: [ChatMessage<'a>; 2],
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::providers::{OpenAiAdapter, OpenRouterAdapter};
    use serde_json::json;

    fn reply(status: u16, body: &str) -> UpstreamReply {
        UpstreamReply {
            status: StatusCode::from_u16(status).unwrap(),
            body: body.to_string(),
        }
    }

    #[test]
    fn success_extracts_first_choice() {
        let body = json!({
            "choices": [
                { "message": { "role": "assistant", "content": "  Linha1\nLinha2\n\nLinha3\nLinha4  " } },
                { "message": { "role": "assistant", "content": "ignored" } }
            ]
        })
        .to_string();

        let result = reply(200, &body).into_completion("OpenAI").unwrap();
        assert_eq!(result.preview, "Linha1\nLinha2\nLinha3");
        assert_eq!(result.full, "Linha1\nLinha2\n\nLinha3\nLinha4");
    }

    #[test]
    fn success_without_choices_yields_empty_contract() {
        let result = reply(200, r#"{"choices":[]}"#).into_completion("OpenAI").unwrap();
        assert_eq!(result.full, "");
        assert_eq!(result.preview, "");

        let result = reply(200, r#"{"choices":[{"message":{"content":null}}]}"#)
            .into_completion("OpenAI")
            .unwrap();
        assert_eq!(result.full, "");
    }

    #[test]
    fn non_json_body_is_invalid_upstream_json_even_on_error_status() {
        for status in [200, 503] {
            match reply(status, "<html>Bad Gateway</html>").into_completion("OpenRouter") {
                Err(ContractError::InvalidUpstreamJson { provider, raw, .. }) => {
                    assert_eq!(provider, "OpenRouter");
                    assert_eq!(raw, "<html>Bad Gateway</html>");
                }
                other => panic!("unexpected result: {:?}", other),
            }
        }
    }

    #[test]
    fn error_status_carries_decoded_detail() {
        let body = r#"{"error":{"message":"Incorrect API key provided","code":"invalid_api_key"}}"#;

        match reply(401, body).into_completion("OpenAI") {
            Err(ContractError::Upstream {
                status, detail, ..
            }) => {
                assert_eq!(status, StatusCode::UNAUTHORIZED);
                assert_eq!(detail["error"]["code"], "invalid_api_key");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn request_body_matches_wire_format() {
        let request = ChatCompletionRequest {
            model: "gpt-4o-mini",
            temperature: 0.7,
            max_tokens: Some(600),
            messages: [
                ChatMessage {
                    role: "system",
                    content: "sys",
                },
                ChatMessage {
                    role: "user",
                    content: "usr",
                },
            ],
        };

        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "model": "gpt-4o-mini",
                "temperature": 0.7,
                "max_tokens": 600,
                "messages": [
                    { "role": "system", "content": "sys" },
                    { "role": "user", "content": "usr" }
                ]
            })
        );

        let request = ChatCompletionRequest {
            max_tokens: None,
            ..request
        };
        assert!(serde_json::to_value(&request).unwrap().get("max_tokens").is_none());
    }

    #[test]
    fn model_override_wins_over_adapter_default() {
        let client = ChatClient::new(&ProviderSettings::default()).unwrap();
        assert_eq!(client.model_for(&OpenAiAdapter::default()), "gpt-4o-mini");
        assert_eq!(
            client.model_for(&OpenRouterAdapter::default()),
            "openai/gpt-4o-mini"
        );

        let client = ChatClient::new(&ProviderSettings {
            model_override: Some("gpt-4.1-mini".into()),
            ..ProviderSettings::default()
        })
        .unwrap();
        assert_eq!(client.model_for(&OpenRouterAdapter::default()), "gpt-4.1-mini");
    }
}
