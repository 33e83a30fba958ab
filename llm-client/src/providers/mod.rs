//! LLM provider implementations

mod gemini;
pub mod mock;
mod openai_compatible;

pub use gemini::GeminiProvider;
pub use mock::{MockProvider, MockReply};
pub use openai_compatible::OpenAICompatibleProvider;

use reqwest::Client;
use std::str::FromStr;

use crate::config::{ModelPreset, ProviderConfig};
use crate::error::{LlmError, Result};
use crate::provider::LlmProvider;

/// Supported provider types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Gemini,
    OpenAi,
    OpenRouter,
    Cerebras,
}

impl FromStr for ProviderKind {
    type Err = LlmError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "gemini" | "google" => Ok(Self::Gemini),
            "openai" => Ok(Self::OpenAi),
            "openrouter" => Ok(Self::OpenRouter),
            "cerebras" => Ok(Self::Cerebras),
            _ => Err(LlmError::ConfigError(format!("Unknown provider: {}", s))),
        }
    }
}

impl ProviderKind {
    /// Environment variables checked for this provider's API key, in order
    pub fn env_vars(&self) -> &'static [&'static str] {
        match self {
            Self::Gemini => &["GOOGLE_API_KEY", "GEMINI_API_KEY"],
            Self::OpenAi => &["OPENAI_API_KEY"],
            Self::OpenRouter => &["OPENROUTER_API_KEY"],
            Self::Cerebras => &["CEREBRAS_API_KEY"],
        }
    }

    /// Display name used in error messages
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Gemini => "Gemini",
            Self::OpenAi => "OpenAI",
            Self::OpenRouter => "OpenRouter",
            Self::Cerebras => "Cerebras",
        }
    }
}

/// Create a provider instance from a preset and optional config
pub fn get_provider(
    preset: &ModelPreset,
    provider_config: Option<&ProviderConfig>,
) -> Result<Box<dyn LlmProvider>> {
    let kind: ProviderKind = preset.provider.parse()?;
    let api_key = get_api_key(provider_config, kind)?;
    let client = build_client(provider_config)?;
    let base_url = provider_config.and_then(|c| c.base_url.as_deref());

    log::debug!(
        "Initializing {} provider (model: {})",
        kind.display_name(),
        preset.model
    );

    let provider: Box<dyn LlmProvider> = match kind {
        ProviderKind::Gemini => Box::new(GeminiProvider::new(
            &preset.model,
            api_key,
            base_url,
            client,
        )),
        ProviderKind::OpenAi => Box::new(OpenAICompatibleProvider::new(
            &preset.model,
            base_url.unwrap_or(openai_compatible::OPENAI_BASE_URL),
            api_key,
            "OpenAI",
            client,
        )),
        ProviderKind::OpenRouter => Box::new(OpenAICompatibleProvider::new(
            &preset.model,
            base_url.unwrap_or(openai_compatible::OPENROUTER_BASE_URL),
            api_key,
            "OpenRouter",
            client,
        )),
        ProviderKind::Cerebras => Box::new(OpenAICompatibleProvider::new(
            &preset.model,
            base_url.unwrap_or(openai_compatible::CEREBRAS_BASE_URL),
            api_key,
            "Cerebras",
            client,
        )),
    };
    Ok(provider)
}

/// Get API key from config or environment variable
fn get_api_key(config: Option<&ProviderConfig>, kind: ProviderKind) -> Result<String> {
    // Check config first
    if let Some(key) = config.and_then(|c| c.api_key.clone()) {
        return Ok(key);
    }

    kind.env_vars()
        .iter()
        .find_map(|var| std::env::var(var).ok().filter(|v| !v.is_empty()))
        .ok_or_else(|| LlmError::MissingApiKey {
            provider: kind.display_name().to_string(),
            env_var: kind.env_vars().join(" or "),
        })
}

fn build_client(config: Option<&ProviderConfig>) -> Result<Client> {
    let mut builder = Client::builder();
    if let Some(timeout) = config.and_then(ProviderConfig::timeout) {
        builder = builder.timeout(timeout);
    }
    builder
        .build()
        .map_err(|e| LlmError::ConfigError(format!("Failed to build HTTP client: {}", e)))
}

/// Parse a `Retry-After` header given in whole seconds
fn retry_after_secs(headers: &reqwest::header::HeaderMap) -> Option<u64> {
    headers
        .get(reqwest::header::RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse()
        .ok()
}
