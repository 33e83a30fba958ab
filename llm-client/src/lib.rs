//! LLM client library for mcq-gen
//!
//! Exposes a single text-in, text-out capability ([`LlmProvider`]) behind
//! which several backends can sit:
//! - Google Gemini (generateContent API)
//! - OpenAI-compatible chat completions (OpenAI, OpenRouter, Cerebras)
//! - A scripted mock for tests

pub mod config;
pub mod error;
pub mod provider;
pub mod providers;

pub use config::{Config, ModelPreset, ProviderConfig};
pub use error::{LlmError, Result};
pub use provider::{LlmProvider, LlmRequest, LlmResponse, TokenUsage};
pub use providers::{MockProvider, MockReply, ProviderKind, get_provider};
