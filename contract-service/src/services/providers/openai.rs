//! OpenAI chat-completions adapter.

use super::{ProviderAdapter, ProviderKind};

/// Official OpenAI chat-completions endpoint.
pub const OPENAI_CHAT_URL: &str = "https://api.openai.com/v1/chat/completions";

const DEFAULT_MODEL: &str = "gpt-4o-mini";
const CREDENTIALS: &[&str] = &["OPENAI_API_KEY"];
const MAX_TOKENS: u32 = 600;

pub struct OpenAiAdapter {
    endpoint: String,
}

impl OpenAiAdapter {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
        }
    }
}

impl Default for OpenAiAdapter {
    fn default() -> Self {
        Self::new(OPENAI_CHAT_URL)
    }
}

impl ProviderAdapter for OpenAiAdapter {
    fn kind(&self) -> ProviderKind {
        ProviderKind::OpenAi
    }

    fn display_name(&self) -> &'static str {
        "OpenAI"
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

    fn max_tokens(&self) -> Option<u32> {
        Some(MAX_TOKENS)
    }
}
