//! mcq-gen configuration management.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::McqError;
use crate::generate::prompt::{CHUNK_PLACEHOLDER, DEFAULT_PROMPT_TEMPLATE};
use crate::text::DEFAULT_MAX_CHUNK_SIZE;

const DEFAULT_CONCURRENCY: usize = 1;

/// Everything the pipeline needs, fixed when the pipeline is built.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McqConfig {
    /// API key for the selected provider. Overrides llm.toml and the
    /// provider's environment variable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Maximum chunk size in characters
    #[serde(default = "default_max_chunk_size")]
    pub max_chunk_size: usize,

    /// Prompt sent for each chunk. Must contain `{chunk}`; may contain
    /// `{topic}` and `{difficulty}`.
    #[serde(default = "default_prompt_template")]
    pub prompt_template: String,

    /// Model preset name from llm.toml. None means the llm.toml default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// Number of generation requests in flight at once
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

fn default_max_chunk_size() -> usize {
    DEFAULT_MAX_CHUNK_SIZE
}

fn default_prompt_template() -> String {
    DEFAULT_PROMPT_TEMPLATE.to_string()
}

fn default_concurrency() -> usize {
    DEFAULT_CONCURRENCY
}

impl Default for McqConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            max_chunk_size: default_max_chunk_size(),
            prompt_template: default_prompt_template(),
            model: None,
            concurrency: default_concurrency(),
            max_output_tokens: None,
            temperature: None,
        }
    }
}

impl McqConfig {
    /// Get the config file path: ~/.config/cli-programs/mcq-gen.toml
    pub fn config_path() -> Result<PathBuf> {
        let home = std::env::var("HOME").or_else(|_| std::env::var("USERPROFILE"))?;
        Ok(PathBuf::from(home)
            .join(".config")
            .join("cli-programs")
            .join("mcq-gen.toml"))
    }

    /// Load config from file, returning default if file doesn't exist
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let config: McqConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save config to file
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Reject values the pipeline cannot run with.
    pub fn validate(&self) -> crate::error::Result<()> {
        if self.max_chunk_size == 0 {
            return Err(McqError::Config(
                "max_chunk_size must be greater than 0".into(),
            ));
        }
        if self.concurrency == 0 {
            return Err(McqError::Config("concurrency must be at least 1".into()));
        }
        if !self.prompt_template.contains(CHUNK_PLACEHOLDER) {
            return Err(McqError::Config(format!(
                "prompt_template must contain {}",
                CHUNK_PLACEHOLDER
            )));
        }
        Ok(())
    }
}
