//! Conversational routing for the concierge chat router
//!
//! Features:
//! - Per-message intent classification (document Q&A vs. appointment booking)
//! - Document question answering over session-uploaded text
//! - Slot-filling appointment collection (name, phone, email, date)
//! - Field validators and relative date resolution
//! - Turn orchestration over a mutable session

pub mod booking;
pub mod date;
pub mod documents;
pub mod intent;
pub mod orchestrator;
pub mod validators;

pub use booking::{BookingEngine, BookingOutcome, ExtractionOutcome, NextAction};
pub use date::{DateResolver, ResolvedDate};
pub use documents::{decode_document, load_document, DocumentQueryBridge};
pub use intent::IntentClassifier;
pub use orchestrator::{TurnOrchestrator, TurnResult};
pub use validators::{validate_email_address, validate_name, validate_phone};

use thiserror::Error;

/// Agent errors
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("LLM error: {0}")]
    Llm(String),
}

impl From<concierge_llm::LlmError> for AgentError {
    fn from(err: concierge_llm::LlmError) -> Self {
        AgentError::Llm(err.to_string())
    }
}

impl From<AgentError> for concierge_core::Error {
    fn from(err: AgentError) -> Self {
        match err {
            AgentError::Llm(msg) => concierge_core::Error::Llm(msg),
            other => concierge_core::Error::Internal(other.to_string()),
        }
    }
}
