//! Completion-service client seam.
//!
//! The pipelines talk to the model through the [`CompletionService`]
//! trait so they can be exercised with a stub in tests. The production
//! implementation lives in [`anthropic`].

pub mod anthropic;

pub use anthropic::AnthropicClient;

use async_trait::async_trait;
use thiserror::Error;

/// A single text-completion request.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// The full user-role prompt text.
    pub prompt: String,
    /// Response-size cap in tokens.
    pub max_tokens: u32,
    /// Sampling temperature.
    pub temperature: f32,
}

/// Errors surfaced by a completion service.
#[derive(Debug, Error)]
pub enum CompletionError {
    /// Transient overload signal; the only retried condition.
    #[error("rate limited by the completion service")]
    RateLimited,

    #[error("completion service returned HTTP {status}: {body}")]
    Api { status: u16, body: String },

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("response contained no text content")]
    EmptyResponse,

    #[error("gave up after {attempts} rate-limited attempts")]
    RetriesExhausted { attempts: usize },
}

/// A blocking-per-call text-completion service. Calls are strictly
/// sequential; no request is issued before the previous one resolved.
#[async_trait]
pub trait CompletionService: Send + Sync {
    async fn complete(&self, request: CompletionRequest) -> Result<String, CompletionError>;
}

/// Strip a fenced-code wrapper (```json ... ``` or ``` ... ```) from a
/// response so the payload can be parsed as structured data. Text
/// without a leading fence is returned trimmed and otherwise untouched.
pub fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();

    let inner = if let Some(rest) = trimmed.strip_prefix("```json") {
        rest.split("```").next().unwrap_or(rest)
    } else if let Some(rest) = trimmed.strip_prefix("```") {
        rest.split("```").next().unwrap_or(rest)
    } else {
        return trimmed;
    };

    inner.trim()
}
