use crate::services::providers::openai::OPENAI_CHAT_URL;
use crate::services::providers::openrouter::{DEFAULT_APP_TITLE, OPENROUTER_CHAT_URL};
use crate::services::providers::ProviderKind;
use secrecy::Secret;
use service_core::config as core_config;
use service_core::error::AppError;
use std::collections::HashMap;
use std::env;
use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;

/// Every credential variable any adapter may look up.
pub const CREDENTIAL_VARS: [&str; 3] = ["OPENROUTER_API_KEY", "OPENAI_API_KEY", "LLM_API_KEY"];

const DEFAULT_TEMPERATURE: f64 = 0.7;
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Process-wide settings, read once at startup and injected into the app.
#[derive(Debug, Clone)]
pub struct ContractConfig {
    pub common: core_config::Config,
    pub provider: ProviderSettings,
    pub credentials: CredentialStore,
    pub otlp_endpoint: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ProviderSettings {
    /// Provider used by `/api/contrato`.
    pub default_provider: ProviderKind,
    /// `MODEL_NAME`; replaces every adapter's default model when set.
    pub model_override: Option<String>,
    pub openai_url: String,
    pub openrouter_url: String,
    pub temperature: f64,
    /// Upper bound on the whole outbound call.
    pub timeout: Duration,
    pub app_title: String,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            default_provider: ProviderKind::OpenAi,
            model_override: None,
            openai_url: OPENAI_CHAT_URL.to_string(),
            openrouter_url: OPENROUTER_CHAT_URL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            app_title: DEFAULT_APP_TITLE.to_string(),
        }
    }
}

impl ContractConfig {
    pub fn load() -> Result<Self, AppError> {
        // Also loads `.env`, so everything below sees it.
        let common = core_config::Config::load()?;

        let provider = ProviderSettings {
            default_provider: parse_setting(
                "LLM_PROVIDER",
                optional_env("LLM_PROVIDER"),
                ProviderKind::OpenAi,
            )?,
            model_override: optional_env("MODEL_NAME"),
            openai_url: optional_env("OPENAI_API_URL")
                .unwrap_or_else(|| OPENAI_CHAT_URL.to_string()),
            openrouter_url: optional_env("OPENROUTER_API_URL")
                .unwrap_or_else(|| OPENROUTER_CHAT_URL.to_string()),
            temperature: parse_setting(
                "LLM_TEMPERATURE",
                optional_env("LLM_TEMPERATURE"),
                DEFAULT_TEMPERATURE,
            )?,
            timeout: Duration::from_secs(parse_setting(
                "LLM_TIMEOUT_SECS",
                optional_env("LLM_TIMEOUT_SECS"),
                DEFAULT_TIMEOUT_SECS,
            )?),
            app_title: optional_env("OPENROUTER_APP_TITLE")
                .unwrap_or_else(|| DEFAULT_APP_TITLE.to_string()),
        };

        Ok(ContractConfig {
            common,
            provider,
            credentials: CredentialStore::from_env(),
            otlp_endpoint: optional_env("OTLP_ENDPOINT"),
        })
    }
}

/// Snapshot of the credential variables taken at startup.
///
/// Blank values are dropped so that lookups fall through to the next name.
#[derive(Debug, Clone, Default)]
pub struct CredentialStore {
    values: HashMap<String, Secret<String>>,
}

impl CredentialStore {
    pub fn from_env() -> Self {
        Self::from_pairs(
            CREDENTIAL_VARS
                .iter()
                .filter_map(|name| env::var(name).ok().map(|value| (*name, value))),
        )
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let values = pairs
            .into_iter()
            .filter_map(|(name, value)| {
                let value = value.into().trim().to_string();
                (!value.is_empty()).then(|| (name.into(), Secret::new(value)))
            })
            .collect();

        Self { values }
    }

    pub fn get(&self, name: &str) -> Option<&Secret<String>> {
        self.values.get(name)
    }

    /// First credential present among `names`, in order.
    pub fn first_of(&self, names: &[&str]) -> Option<&Secret<String>> {
        names.iter().find_map(|name| self.get(name))
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Names of the credentials that are set; never the values.
    pub fn configured_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.values.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

fn optional_env(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_setting<T>(key: &str, raw: Option<String>, default: T) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: Display,
{
    match raw {
        Some(value) => value.parse().map_err(|e| {
            AppError::ConfigError(anyhow::anyhow!("{} has invalid value '{}': {}", key, value, e))
        }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn blank_credentials_are_dropped_and_trimmed() {
        let store = CredentialStore::from_pairs([
            ("OPENROUTER_API_KEY", "   "),
            ("OPENAI_API_KEY", " sk-test\n"),
        ]);

        assert!(store.get("OPENROUTER_API_KEY").is_none());
        assert_eq!(store.get("OPENAI_API_KEY").unwrap().expose_secret(), "sk-test");
        assert_eq!(
            store
                .first_of(&["OPENROUTER_API_KEY", "OPENAI_API_KEY"])
                .unwrap()
                .expose_secret(),
            "sk-test"
        );
        assert_eq!(store.configured_names(), vec!["OPENAI_API_KEY"]);
    }

    #[test]
    fn empty_store_resolves_nothing() {
        let store = CredentialStore::default();
        assert!(store.is_empty());
        assert!(store.first_of(&CREDENTIAL_VARS).is_none());
    }

    #[test]
    fn debug_output_redacts_secrets() {
        let store = CredentialStore::from_pairs([("OPENAI_API_KEY", "sk-very-secret")]);
        assert!(!format!("{:?}", store).contains("sk-very-secret"));
    }

    #[test]
    fn settings_parse_or_fall_back() {
        assert_eq!(parse_setting("LLM_TEMPERATURE", None, 0.7).unwrap(), 0.7);
        assert_eq!(
            parse_setting("LLM_TEMPERATURE", Some("0.2".into()), 0.7).unwrap(),
            0.2
        );
        assert_eq!(
            parse_setting("LLM_PROVIDER", Some("openrouter".into()), ProviderKind::OpenAi)
                .unwrap(),
            ProviderKind::OpenRouter
        );

        let err = parse_setting("LLM_TIMEOUT_SECS", Some("soon".into()), 60u64).unwrap_err();
        assert!(err.to_string().contains("LLM_TIMEOUT_SECS"));
    }

    #[test]
    fn default_settings_target_official_endpoints() {
        let settings = ProviderSettings::default();
        assert_eq!(settings.default_provider, ProviderKind::OpenAi);
        assert_eq!(settings.openai_url, OPENAI_CHAT_URL);
        assert_eq!(settings.openrouter_url, OPENROUTER_CHAT_URL);
        assert_eq!(settings.timeout, Duration::from_secs(60));
        assert!(settings.model_override.is_none());
    }
}
