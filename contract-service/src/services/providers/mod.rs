//! Chat-completion provider abstractions.
//!
//! Every provider speaks the same OpenAI-style chat-completions wire format and
//! differs only in endpoint, credential names, default model and a few extra
//! headers. Those differences live behind [`ProviderAdapter`], so a single
//! handler serves all of them.

pub mod openai;
pub mod openrouter;

use crate::config::{CredentialStore, ProviderSettings};
use crate::error::ContractError;
use axum::http::HeaderMap;
use secrecy::Secret;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

pub use openai::OpenAiAdapter;
pub use openrouter::OpenRouterAdapter;

/// Identifies a provider in configuration and in route paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    OpenAi,
    OpenRouter,
}

impl ProviderKind {
    pub const ALL: [ProviderKind; 2] = [ProviderKind::OpenAi, ProviderKind::OpenRouter];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "openai",
            ProviderKind::OpenRouter => "openrouter",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(ProviderKind::OpenAi),
            "openrouter" => Ok(ProviderKind::OpenRouter),
            other => Err(format!(
                "unknown provider '{}' (expected one of: openai, openrouter)",
                other
            )),
        }
    }
}

/// Request-scoped facts about the inbound call that an adapter may forward.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InboundContext {
    /// Public host the caller reached, from `x-forwarded-host` or `host`.
    pub host: Option<String>,
}

impl InboundContext {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let header = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.split(',').next())
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };

        Self {
            host: header("x-forwarded-host").or_else(|| header("host")),
        }
    }
}

/// Capability set of one chat-completion provider.
pub trait ProviderAdapter: Send + Sync {
    fn kind(&self) -> ProviderKind;

    /// Human-readable name used in error messages, e.g. `OpenAI`.
    fn display_name(&self) -> &'static str;

    /// Full chat-completions URL.
    fn endpoint(&self) -> &str;

    fn default_model(&self) -> &'static str;

    /// Credential variable names, in lookup order.
    fn credential_names(&self) -> &'static [&'static str];

    fn max_tokens(&self) -> Option<u32> {
        None
    }

    /// Provider-specific headers besides `Authorization` and `Content-Type`.
    fn build_headers(&self, _inbound: &InboundContext) -> HeaderMap {
        HeaderMap::new()
    }

    /// First non-empty credential from [`Self::credential_names`].
    fn resolve_credential<'a>(
        &self,
        store: &'a CredentialStore,
    ) -> Result<&'a Secret<String>, ContractError> {
        store
            .first_of(self.credential_names())
            .ok_or(ContractError::MissingCredential {
                expected: self.credential_names(),
            })
    }
}

/// The adapters a running service can dispatch to, plus the default one.
#[derive(Clone)]
pub struct ProviderRegistry {
    default: ProviderKind,
    adapters: HashMap<ProviderKind, Arc<dyn ProviderAdapter>>,
}

impl ProviderRegistry {
    pub fn new(default: ProviderKind) -> Self {
        Self {
            default,
            adapters: HashMap::new(),
        }
    }

    /// Registry with every built-in adapter, pointed at the configured endpoints.
    pub fn from_settings(settings: &ProviderSettings) -> Self {
        Self::new(settings.default_provider)
            .register(Arc::new(OpenAiAdapter::new(settings.openai_url.clone())))
            .register(Arc::new(OpenRouterAdapter::new(
                settings.openrouter_url.clone(),
                settings.app_title.clone(),
            )))
    }

    pub fn register(mut self, adapter: Arc<dyn ProviderAdapter>) -> Self {
        self.adapters.insert(adapter.kind(), adapter);
        self
    }

    pub fn default_kind(&self) -> ProviderKind {
        self.default
    }

    pub fn get(&self, kind: ProviderKind) -> Option<Arc<dyn ProviderAdapter>> {
        self.adapters.get(&kind).cloned()
    }

    pub fn default_adapter(&self) -> Result<Arc<dyn ProviderAdapter>, ContractError> {
        self.get(self.default).ok_or_else(|| {
            ContractError::Unexpected(anyhow::anyhow!(
                "default provider '{}' is not registered",
                self.default
            ))
        })
    }

    /// Resolve a provider named in a route path.
    pub fn lookup(&self, name: &str) -> Result<Arc<dyn ProviderAdapter>, ContractError> {
        name.parse::<ProviderKind>()
            .ok()
            .and_then(|kind| self.get(kind))
            .ok_or_else(|| ContractError::UnknownProvider(name.to_string()))
    }
}
