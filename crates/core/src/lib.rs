//! Core traits and types for the concierge chat router
//!
//! This crate provides foundational types used across all other crates:
//! - Session state (appointment slots, conversation history, document text)
//! - Intent labels for per-message routing
//! - Field validation errors
//! - Traits for pluggable collaborators (session storage, clock)
//! - Error types

pub mod error;
pub mod intent;
pub mod session;
pub mod traits;
pub mod validation;

pub use error::{Error, Result};
pub use intent::Intent;
pub use session::{AppointmentData, AppointmentField, ConversationTurn, Session};
pub use validation::{ValidationError, ValidationResult};

pub use traits::{Clock, FixedClock, SessionStore, SystemClock};
