//! Question generation: one LLM call per chunk.

pub mod prompt;

use futures_util::stream::{self, StreamExt, TryStreamExt};
use indicatif::ProgressBar;
use llm_client::{Config, LlmProvider, LlmRequest, get_provider};

use crate::config::McqConfig;
use crate::error::{McqError, Result};
use crate::table::RequestMetadata;

/// Program name used for per-program defaults in llm.toml
const PROGRAM: &str = "mcq-gen";

/// Wraps an LLM provider with the prompt and sampling settings.
pub struct Generator {
    provider: Box<dyn LlmProvider>,
    template: String,
    max_tokens: Option<u32>,
    temperature: Option<f32>,
}

impl Generator {
    pub fn new(provider: Box<dyn LlmProvider>, config: &McqConfig) -> Self {
        Self {
            provider,
            template: config.prompt_template.clone(),
            max_tokens: config.max_output_tokens,
            temperature: config.temperature,
        }
    }

    /// Resolve the model preset and build its provider.
    ///
    /// Preset precedence: `preset_name`, then `config.model`, then the
    /// llm.toml default for this program. `config.api_key` replaces any key
    /// from llm.toml or the environment.
    pub fn from_config(
        config: &McqConfig,
        llm_config: &Config,
        preset_name: Option<&str>,
    ) -> Result<Self> {
        let preset_name = preset_name
            .or(config.model.as_deref())
            .unwrap_or_else(|| llm_config.get_default_for_program(PROGRAM));
        let preset = llm_config
            .get_preset(preset_name)
            .map_err(|e| McqError::Config(e.to_string()))?;

        let mut provider_config = llm_config
            .get_provider_config(&preset.provider)
            .cloned()
            .unwrap_or_default();
        if let Some(key) = &config.api_key {
            provider_config.api_key = Some(key.clone());
        }

        let provider = get_provider(preset, Some(&provider_config)).map_err(|e| {
            McqError::Config(format!(
                "Failed to initialize provider '{}' for preset '{}': {}",
                preset.provider, preset_name, e
            ))
        })?;

        log::info!(
            "Using LLM provider: {} (model: {})",
            provider.name(),
            preset.model
        );

        Ok(Self::new(provider, config))
    }

    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }

    /// Generate raw question text for a single chunk.
    pub async fn generate(
        &self,
        chunk: &str,
        metadata: &RequestMetadata,
    ) -> llm_client::Result<String> {
        let request = LlmRequest {
            prompt: prompt::render_prompt(&self.template, chunk, metadata),
            system_prompt: None,
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        };

        let response = self.provider.complete(request).await?;

        if let Some(usage) = &response.usage {
            log::debug!(
                "Tokens: {} in, {} out",
                usage.input_tokens,
                usage.output_tokens
            );
        }

        Ok(response.content)
    }

    /// Generate for every chunk, returning responses in chunk order.
    ///
    /// At most `concurrency` requests are in flight. The first failure
    /// aborts the batch and drops any requests still pending.
    pub async fn generate_all(
        &self,
        chunks: &[String],
        metadata: &RequestMetadata,
        concurrency: usize,
        progress: &ProgressBar,
    ) -> Result<Vec<String>> {
        stream::iter(chunks.iter().enumerate())
            .map(|(index, chunk)| async move {
                log::debug!("Generating for chunk {} ({} chars)", index, chunk.len());
                let response = self
                    .generate(chunk, metadata)
                    .await
                    .map_err(|source| McqError::Generation {
                        chunk: index,
                        source,
                    })?;
                progress.inc(1);
                Ok::<_, McqError>(response)
            })
            // `buffered` yields in submission order regardless of completion order
            .buffered(concurrency.max(1))
            .try_collect()
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use llm_client::{MockProvider, MockReply, ModelPreset};
    use std::sync::Arc;

    fn metadata() -> RequestMetadata {
        RequestMetadata::new("src", "History", "Medium")
    }

    fn generator(mock: &Arc<MockProvider>) -> Generator {
        Generator::new(Box::new(Arc::clone(mock)), &McqConfig::default())
    }

    fn chunks(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("chunk number {i}")).collect()
    }

    #[tokio::test]
    async fn test_one_call_per_chunk_in_order() {
        let mock = Arc::new(MockProvider::scripted(
            (0..3).map(|i| MockReply::content(format!("response {i}"))),
            MockReply::content("unused"),
        ));

        let responses = generator(&mock)
            .generate_all(&chunks(3), &metadata(), 1, &ProgressBar::hidden())
            .await
            .unwrap();

        assert_eq!(responses, vec!["response 0", "response 1", "response 2"]);
        assert_eq!(mock.call_count(), 3);
        let prompts = mock.prompts();
        for (i, prompt) in prompts.iter().enumerate() {
            assert!(prompt.contains(&format!("chunk number {i}")));
            assert!(prompt.contains("History"));
        }
    }

    #[tokio::test]
    async fn test_concurrent_generation_keeps_chunk_order() {
        let mock = Arc::new(MockProvider::scripted(
            (0..8).map(|i| MockReply::content(format!("response {i}"))),
            MockReply::content("unused"),
        ));

        let responses = generator(&mock)
            .generate_all(&chunks(8), &metadata(), 4, &ProgressBar::hidden())
            .await
            .unwrap();

        let expected: Vec<String> = (0..8).map(|i| format!("response {i}")).collect();
        assert_eq!(responses, expected);
    }

    #[tokio::test]
    async fn test_failure_aborts_batch_with_chunk_index() {
        let mock = Arc::new(MockProvider::scripted(
            [
                MockReply::content("ok"),
                MockReply::fail(500, "internal"),
            ],
            MockReply::content("never reached"),
        ));

        let err = generator(&mock)
            .generate_all(&chunks(4), &metadata(), 1, &ProgressBar::hidden())
            .await
            .unwrap_err();

        assert!(matches!(err, McqError::Generation { chunk: 1, .. }));
        assert_eq!(mock.call_count(), 2);
    }

    #[tokio::test]
    async fn test_no_chunks_makes_no_calls() {
        let mock = Arc::new(MockProvider::always_succeeds("x"));
        let responses = generator(&mock)
            .generate_all(&[], &metadata(), 1, &ProgressBar::hidden())
            .await
            .unwrap();
        assert!(responses.is_empty());
        assert_eq!(mock.call_count(), 0);
    }

    #[test]
    fn test_from_config_unknown_preset_is_config_error() {
        let config = McqConfig {
            model: Some("does-not-exist".into()),
            ..Default::default()
        };
        let result = Generator::from_config(&config, &Config::default(), None);
        assert!(matches!(result, Err(McqError::Config(_))));
    }

    #[test]
    fn test_from_config_uses_api_key_override() {
        let mut llm_config = Config::default();
        llm_config.presets.insert(
            "local".into(),
            ModelPreset {
                provider: "openai".into(),
                model: "gpt-4o-mini".into(),
            },
        );
        let config = McqConfig {
            api_key: Some("sk-from-mcq-config".into()),
            ..Default::default()
        };

        let generator = Generator::from_config(&config, &llm_config, Some("local")).unwrap();
        assert_eq!(generator.provider_name(), "OpenAI");
    }
}
