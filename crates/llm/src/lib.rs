//! Local LLM integration
//!
//! Features:
//! - Ollama text-completion backend with per-call temperature
//! - Prompt templates for classification, extraction and answering
//! - Scripted backend for tests (`mock` feature)

pub mod backend;
pub mod prompt;
#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use backend::{GenerationResult, LlmBackend, LlmConfig, OllamaBackend};

use thiserror::Error;

/// LLM errors
#[derive(Error, Debug)]
pub enum LlmError {
    #[error("Generation error: {0}")]
    Generation(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Timeout")]
    Timeout,

    #[error("Model not found: {0}")]
    ModelNotFound(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            LlmError::Timeout
        } else {
            LlmError::Network(err.to_string())
        }
    }
}

impl From<LlmError> for concierge_core::Error {
    fn from(err: LlmError) -> Self {
        concierge_core::Error::Llm(err.to_string())
    }
}
