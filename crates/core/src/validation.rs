//! Field validation result types

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::session::AppointmentField;

/// A field value that failed validation.
///
/// Always recoverable: the conversation re-asks for the field.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("{message}")]
pub struct ValidationError {
    pub field: AppointmentField,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: AppointmentField, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Outcome of validating or normalizing one field value
pub type ValidationResult<T = String> = std::result::Result<T, ValidationError>;
