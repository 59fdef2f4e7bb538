//! Anthropic Messages API client.
//!
//! Synchronous request/response over HTTPS. Transient overload (HTTP
//! 429) is retried with a linearly increasing wait; every other failure
//! surfaces immediately and the caller decides how to degrade.

use crate::client::{CompletionError, CompletionRequest, CompletionService};
use crate::config::ModelConfig;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

const ANTHROPIC_VERSION: &str = "2023-06-01";

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    messages: Vec<Message<'a>>,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: String,
}

/// Client for the Anthropic `/v1/messages` endpoint.
pub struct AnthropicClient {
    http_client: reqwest::Client,
    api_url: String,
    api_key: String,
    model: String,
    max_retries: usize,
    retry_wait: Duration,
}

impl AnthropicClient {
    /// Create a client from resolved model settings.
    pub fn new(config: &ModelConfig) -> Result<Self, CompletionError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            http_client,
            api_url: config.api_url.clone(),
            api_key: config.api_key.clone(),
            model: config.name.clone(),
            max_retries: config.retries,
            retry_wait: Duration::from_secs(config.retry_wait_secs),
        })
    }

    async fn send_once(&self, request: &CompletionRequest) -> Result<String, CompletionError> {
        let payload = MessagesRequest {
            model: &self.model,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            messages: vec![Message {
                role: "user",
                content: &request.prompt,
            }],
        };

        debug!(
            "Sending completion request ({} prompt chars, {} max tokens)",
            request.prompt.chars().count(),
            request.max_tokens
        );

        let response = self
            .http_client
            .post(&self.api_url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if status.as_u16() == 429 {
            return Err(CompletionError::RateLimited);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CompletionError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: MessagesResponse = response.json().await?;
        let text = parsed
            .content
            .into_iter()
            .next()
            .map(|block| block.text)
            .unwrap_or_default();

        if text.is_empty() {
            return Err(CompletionError::EmptyResponse);
        }
        Ok(text)
    }
}

#[async_trait]
impl CompletionService for AnthropicClient {
    async fn complete(&self, request: CompletionRequest) -> Result<String, CompletionError> {
        for attempt in 1..=self.max_retries {
            match self.send_once(&request).await {
                Err(CompletionError::RateLimited) => {
                    // Linear backoff: 30s, 60s, 90s with the default wait.
                    let wait = self.retry_wait * attempt as u32;
                    warn!(
                        "Rate limit exceeded. Waiting {}s before retry {}/{}...",
                        wait.as_secs(),
                        attempt,
                        self.max_retries
                    );
                    tokio::time::sleep(wait).await;
                }
                outcome => return outcome,
            }
        }

        Err(CompletionError::RetriesExhausted {
            attempts: self.max_retries,
        })
    }
}
