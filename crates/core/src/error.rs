//! Workspace-wide error type

use thiserror::Error;

/// Core error type
///
/// Crate-specific errors (`LlmError`, `AgentError`, `ConfigError`, ...)
/// convert into this at crate boundaries.
#[derive(Error, Debug)]
pub enum Error {
    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result alias using the core error
pub type Result<T> = std::result::Result<T, Error>;
