//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.revsynth.toml` files.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Model settings.
    #[serde(default)]
    pub model: ModelConfig,

    /// Batching settings.
    #[serde(default)]
    pub batch: BatchConfig,

    /// Extraction pipeline settings.
    #[serde(default)]
    pub extract: ExtractConfig,
}

/// Completion-service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Model identifier sent with every request.
    #[serde(default = "default_model")]
    pub name: String,

    /// Messages API endpoint URL.
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// API key. Usually supplied via the ANTHROPIC_API_KEY env var
    /// instead of the config file.
    #[serde(default)]
    pub api_key: String,

    /// Temperature for generation.
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Response-size cap for cluster analysis and synthesis calls.
    #[serde(default = "default_summary_max_tokens")]
    pub summary_max_tokens: u32,

    /// Response-size cap for field extraction calls.
    #[serde(default = "default_extraction_max_tokens")]
    pub extraction_max_tokens: u32,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Attempts per call when the service signals rate limiting.
    #[serde(default = "default_retries")]
    pub retries: usize,

    /// Base wait between rate-limited attempts; attempt N waits N times this.
    #[serde(default = "default_retry_wait")]
    pub retry_wait_secs: u64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            name: default_model(),
            api_url: default_api_url(),
            api_key: String::new(),
            temperature: default_temperature(),
            summary_max_tokens: default_summary_max_tokens(),
            extraction_max_tokens: default_extraction_max_tokens(),
            timeout_seconds: default_timeout(),
            retries: default_retries(),
            retry_wait_secs: default_retry_wait(),
        }
    }
}

fn default_model() -> String {
    "claude-sonnet-4-20250514".to_string()
}

fn default_api_url() -> String {
    "https://api.anthropic.com/v1/messages".to_string()
}

fn default_temperature() -> f32 {
    0.3
}

fn default_summary_max_tokens() -> u32 {
    8000
}

fn default_extraction_max_tokens() -> u32 {
    4000
}

fn default_timeout() -> u64 {
    600 // Large prompts against big models can take several minutes
}

fn default_retries() -> usize {
    3
}

fn default_retry_wait() -> u64 {
    30
}

/// Batching settings for the summarization pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Character budget per completion request.
    #[serde(default = "default_max_chars")]
    pub max_chars: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_chars: default_max_chars(),
        }
    }
}

fn default_max_chars() -> usize {
    100_000
}

/// Extraction pipeline settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractConfig {
    /// Wait between the quality-assessment and study-data calls.
    #[serde(default = "default_inter_call_wait")]
    pub inter_call_wait_secs: u64,

    /// Wait after the study-data call.
    #[serde(default = "default_post_call_wait")]
    pub post_call_wait_secs: u64,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            inter_call_wait_secs: default_inter_call_wait(),
            post_call_wait_secs: default_post_call_wait(),
        }
    }
}

fn default_inter_call_wait() -> u64 {
    60
}

fn default_post_call_wait() -> u64 {
    5
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(".revsynth.toml");

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        // Model settings - always override since they have defaults in CLI
        self.model.name = args.model.clone();
        self.model.api_url = args.api_url.clone();
        self.model.temperature = args.temperature;

        // Secrets and optional settings - only override if provided
        if let Some(ref key) = args.api_key {
            self.model.api_key = key.clone();
        }
        if let Some(timeout) = args.timeout {
            self.model.timeout_seconds = timeout;
        }

        // Per-command overrides
        if let Some(crate::cli::Command::Summarize {
            max_chars: Some(max),
            ..
        }) = &args.command
        {
            self.batch.max_chars = *max;
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
