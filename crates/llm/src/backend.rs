//! LLM Backend implementations
//!
//! The chat router only needs single-prompt text completion with a per-call
//! temperature, so the Ollama backend talks to `/api/generate` with
//! streaming disabled.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

use concierge_config::LlmSettings;

use crate::LlmError;

/// LLM configuration
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Model name/ID
    pub model: String,
    /// API endpoint
    pub endpoint: String,
    /// Maximum tokens to generate (None = model default)
    pub max_tokens: Option<usize>,
    /// Request timeout
    pub timeout: Duration,
    /// Maximum retry attempts for transient network failures
    pub max_retries: u32,
    /// Initial backoff duration (doubles each retry)
    pub initial_backoff: Duration,
    /// Keep model loaded in memory between calls.
    /// Values: "5m" (5 minutes), "1h" (1 hour), "-1" (indefinite), "0" (unload immediately)
    pub keep_alive: String,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self::from(&LlmSettings::default())
    }
}

impl From<&LlmSettings> for LlmConfig {
    fn from(settings: &LlmSettings) -> Self {
        Self {
            model: settings.model.clone(),
            endpoint: settings.endpoint.trim_end_matches('/').to_string(),
            max_tokens: settings.max_tokens,
            timeout: settings.timeout(),
            max_retries: settings.max_retries,
            initial_backoff: Duration::from_millis(100),
            keep_alive: settings.keep_alive.clone(),
        }
    }
}

/// LLM generation result
#[derive(Debug, Clone)]
pub struct GenerationResult {
    /// Generated text
    pub text: String,
}

impl GenerationResult {
    pub fn from_text(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// Text-completion service.
///
/// Call sites own their fallback behaviour; a backend only reports errors.
#[async_trait]
pub trait LlmBackend: Send + Sync {
    /// Complete a single prompt at the given temperature
    async fn complete(&self, prompt: &str, temperature: f32) -> Result<GenerationResult, LlmError>;

    /// Check if model is available
    async fn is_available(&self) -> bool;

    /// Get model name
    fn model_name(&self) -> &str;
}

/// Ollama backend
#[derive(Clone)]
pub struct OllamaBackend {
    client: Client,
    config: LlmConfig,
}

impl OllamaBackend {
    /// Create a new Ollama backend
    pub fn new(config: LlmConfig) -> Result<Self, LlmError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| LlmError::Configuration(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &LlmConfig {
        &self.config
    }

    /// Build the API URL
    fn api_url(&self, path: &str) -> String {
        format!("{}/api{}", self.config.endpoint, path)
    }

    fn build_request<'a>(&'a self, prompt: &'a str, temperature: f32) -> OllamaGenerateRequest<'a> {
        OllamaGenerateRequest {
            model: &self.config.model,
            prompt,
            stream: false,
            options: OllamaOptions {
                temperature,
                num_predict: self.config.max_tokens.map(|n| n as i32),
            },
            keep_alive: Some(&self.config.keep_alive),
            think: Some(false), // Disable extended thinking for faster responses
        }
    }

    /// Execute a single request (used by retry logic)
    async fn execute_request(
        &self,
        request: &OllamaGenerateRequest<'_>,
    ) -> Result<OllamaGenerateResponse, LlmError> {
        let response = self
            .client
            .post(self.api_url("/generate"))
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error = response.text().await.unwrap_or_default();
            if status == StatusCode::NOT_FOUND {
                return Err(LlmError::ModelNotFound(self.config.model.clone()));
            }
            // 5xx errors are retryable, 4xx are not
            if status.is_server_error() {
                return Err(LlmError::Network(format!("Server error {}: {}", status, error)));
            }
            return Err(LlmError::Api(format!("HTTP {}: {}", status, error)));
        }

        response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))
    }

    /// Check if an error is retryable
    fn is_retryable(error: &LlmError) -> bool {
        matches!(error, LlmError::Network(_) | LlmError::Timeout)
    }
}

#[async_trait]
impl LlmBackend for OllamaBackend {
    async fn complete(&self, prompt: &str, temperature: f32) -> Result<GenerationResult, LlmError> {
        let start = Instant::now();
        let request = self.build_request(prompt, temperature);

        let mut last_error = None;
        let mut backoff = self.config.initial_backoff;

        for attempt in 0..=self.config.max_retries {
            if attempt > 0 {
                tracing::warn!(
                    "LLM request failed, retrying in {:?} (attempt {}/{})",
                    backoff,
                    attempt,
                    self.config.max_retries
                );
                tokio::time::sleep(backoff).await;
                backoff *= 2;
            }

            match self.execute_request(&request).await {
                Ok(result) => {
                    tracing::debug!(
                        model = %self.config.model,
                        temperature,
                        total_time_ms = start.elapsed().as_millis() as u64,
                        tokens = result.eval_count.unwrap_or(0),
                        done_reason = result.done_reason.as_deref().unwrap_or("stop"),
                        "LLM completion finished"
                    );
                    return Ok(GenerationResult::from_text(result.response));
                }
                Err(e) if Self::is_retryable(&e) => {
                    last_error = Some(e);
                }
                Err(e) => {
                    return Err(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| LlmError::Network("Max retries exceeded".to_string())))
    }

    async fn is_available(&self) -> bool {
        self.client
            .get(self.api_url("/tags"))
            .timeout(Duration::from_secs(5))
            .send()
            .await
            .map(|r| r.status().is_success())
            .unwrap_or(false)
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}

// Ollama API types
#[derive(Debug, Serialize)]
struct OllamaGenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: OllamaOptions,
    #[serde(skip_serializing_if = "Option::is_none")]
    keep_alive: Option<&'a str>,
    /// Disable extended thinking for models like qwen3/deepseek-r1
    #[serde(skip_serializing_if = "Option::is_none")]
    think: Option<bool>,
}

#[derive(Debug, Serialize)]
struct OllamaOptions {
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    num_predict: Option<i32>,
}

#[derive(Debug, Deserialize)]
struct OllamaGenerateResponse {
    response: String,
    #[serde(default)]
    done_reason: Option<String>,
    #[serde(default)]
    eval_count: Option<u64>,
}
