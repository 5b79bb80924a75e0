//! OpenRouter chat-completions adapter.
//!
//! OpenRouter asks callers to identify their app through `HTTP-Referer` and
//! `X-Title`; the referer is built from the host the end user reached.

use super::{InboundContext, ProviderAdapter, ProviderKind};
use axum::http::{HeaderMap, HeaderName, HeaderValue};

/// Official OpenRouter chat-completions endpoint.
pub const OPENROUTER_CHAT_URL: &str = "https://openrouter.ai/api/v1/chat/completions";

/// Default value of the `X-Title` attribution header.
pub const DEFAULT_APP_TITLE: &str = "Contrato de 30 dias";

const DEFAULT_MODEL: &str = "openai/gpt-4o-mini";
const CREDENTIALS: &[&str] = &["OPENROUTER_API_KEY", "OPENAI_API_KEY", "LLM_API_KEY"];

const HTTP_REFERER: HeaderName = HeaderName::from_static("http-referer");
const X_TITLE: HeaderName = HeaderName::from_static("x-title");

pub struct OpenRouterAdapter {
    endpoint: String,
    app_title: String,
}

impl OpenRouterAdapter {
    pub fn new(endpoint: impl Into<String>, app_title: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            app_title: app_title.into(),
        }
    }
}

impl Default for OpenRouterAdapter {
    fn default() -> Self {
        Self::new(OPENROUTER_CHAT_URL, DEFAULT_APP_TITLE)
    }
}

impl ProviderAdapter for OpenRouterAdapter {
    fn kind(&self) -> ProviderKind {
        ProviderKind::OpenRouter
    }

    fn display_name(&self) -> &'static str {
        "OpenRouter"
    }

    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn default_model(&self) -> &'static str {
        DEFAULT_MODEL
    }

    fn credential_names(&self) -> &'static [&'static str] {
        CREDENTIALS
    }

    fn build_headers(&self, inbound: &InboundContext) -> HeaderMap {
        let mut headers = HeaderMap::new();

        if let Some(host) = &inbound.host {
            match HeaderValue::from_str(&format!("https://{}", host)) {
                Ok(value) => {
                    headers.insert(HTTP_REFERER, value);
                }
                Err(e) => tracing::debug!(host = %host, error = %e, "Skipping unusable referer"),
            }
        }

        match HeaderValue::from_str(&self.app_title) {
            Ok(value) => {
                headers.insert(X_TITLE, value);
            }
            Err(e) => tracing::warn!(error = %e, "Configured app title is not a valid header"),
        }

        headers
    }
}
