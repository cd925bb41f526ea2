//! Slot-filling appointment booking
//!
//! Each turn tries to fill every missing field from the utterance, in the
//! fixed order name, phone, email, date, then asks about exactly one field
//! that is still missing. A complete record is terminal: further turns only
//! repeat the confirmation until the record is cleared externally.

use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use concierge_config::constants::messages::NAME_NOT_FOUND_SENTINEL;
use concierge_config::constants::temperatures;
use concierge_core::{AppointmentData, AppointmentField, ValidationError};
use concierge_llm::{prompt, LlmBackend};

use crate::date::DateResolver;
use crate::validators::{validate_email_address, validate_name, validate_phone};

static PHONE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[+(]?[0-9][0-9\s\-()]{8,}[0-9]").expect("phone pattern"));

static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b").expect("email pattern")
});

/// What the caller should do after a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NextAction {
    /// More input is needed
    Continue,
    /// The turn finished the flow
    Complete,
}

impl NextAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            NextAction::Continue => "continue",
            NextAction::Complete => "complete",
        }
    }
}

/// Booking turn output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingOutcome {
    pub response: String,
    pub action: NextAction,
}

/// Result of trying to pull one field out of an utterance.
///
/// Only `Found` changes the conversation. The other variants exist so the
/// cause of a miss shows up in logs.
#[derive(Debug, Clone, PartialEq)]
pub enum ExtractionOutcome<T = String> {
    Found(T),
    /// Nothing field-shaped in the utterance
    NotFound,
    /// A candidate was found but failed validation
    Rejected(ValidationError),
    /// The extraction service failed
    ServiceError(String),
}

impl<T> ExtractionOutcome<T> {
    /// Collapse to the found value, logging why there is none
    pub fn into_found(self, field: AppointmentField) -> Option<T> {
        match self {
            ExtractionOutcome::Found(value) => Some(value),
            ExtractionOutcome::NotFound => {
                tracing::trace!(%field, "Field not present in utterance");
                None
            }
            ExtractionOutcome::Rejected(err) => {
                tracing::debug!(%field, reason = %err, "Extracted value failed validation");
                None
            }
            ExtractionOutcome::ServiceError(err) => {
                tracing::warn!(%field, error = %err, "Field extraction service failed");
                None
            }
        }
    }
}

impl<T> From<Result<T, ValidationError>> for ExtractionOutcome<T> {
    fn from(result: Result<T, ValidationError>) -> Self {
        match result {
            Ok(value) => ExtractionOutcome::Found(value),
            Err(err) => ExtractionOutcome::Rejected(err),
        }
    }
}

/// Appointment slot-filling engine
pub struct BookingEngine {
    llm: Arc<dyn LlmBackend>,
    dates: DateResolver,
    temperature: f32,
}

impl BookingEngine {
    pub fn new(llm: Arc<dyn LlmBackend>, dates: DateResolver) -> Self {
        Self {
            llm,
            dates,
            temperature: temperatures::EXTRACTION,
        }
    }

    /// Temperature for the name extraction call
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Run one booking turn against the partially collected record
    pub async fn handle(&self, utterance: &str, data: &mut AppointmentData) -> BookingOutcome {
        if data.is_complete() {
            return BookingOutcome {
                response: already_booked_summary(data),
                action: NextAction::Complete,
            };
        }

        let mut acknowledgments = Vec::new();
        for field in data.missing_fields() {
            let recorded = match field {
                AppointmentField::Name => self
                    .extract_name(utterance)
                    .await
                    .into_found(field)
                    .map(|name| {
                        let ack = format!("Got it! I've recorded your name as {}.", name);
                        (name, ack)
                    }),
                AppointmentField::Phone => extract_phone(utterance).into_found(field).map(|phone| {
                    let ack = format!("Phone number recorded: {}", phone);
                    (phone, ack)
                }),
                AppointmentField::Email => extract_email(utterance).into_found(field).map(|email| {
                    let ack = format!("Email recorded: {}", email);
                    (email, ack)
                }),
                AppointmentField::Date => ExtractionOutcome::from(self.dates.resolve(utterance))
                    .into_found(field)
                    .map(|date| (date.iso(), format!("Date recorded: {}", date.long_form()))),
            };

            if let Some((value, ack)) = recorded {
                tracing::debug!(%field, value = %value, "Recorded appointment field");
                data.set(field, value);
                acknowledgments.push(ack);
            }
        }

        let mut response = String::new();
        if !acknowledgments.is_empty() {
            response.push_str(&acknowledgments.join("\n"));
            response.push_str("\n\n");
        }

        match data.missing_fields().first() {
            Some(next) => {
                response.push_str(question_for(*next));
                BookingOutcome {
                    response,
                    action: NextAction::Continue,
                }
            }
            None => {
                tracing::info!("Appointment booking completed");
                response.push_str(&booked_summary(data));
                BookingOutcome {
                    response,
                    action: NextAction::Complete,
                }
            }
        }
    }

    async fn extract_name(&self, utterance: &str) -> ExtractionOutcome {
        let request = prompt::name_extraction(utterance);
        match self.llm.complete(&request, self.temperature).await {
            Ok(result) => {
                let answer = result.text.trim();
                if answer.is_empty() || answer == NAME_NOT_FOUND_SENTINEL {
                    ExtractionOutcome::NotFound
                } else {
                    validate_name(answer).into()
                }
            }
            Err(e) => ExtractionOutcome::ServiceError(e.to_string()),
        }
    }
}

fn extract_phone(utterance: &str) -> ExtractionOutcome {
    match PHONE_PATTERN.find(utterance) {
        Some(m) => validate_phone(m.as_str()).into(),
        None => ExtractionOutcome::NotFound,
    }
}

fn extract_email(utterance: &str) -> ExtractionOutcome {
    match EMAIL_PATTERN.find(utterance) {
        Some(m) => validate_email_address(m.as_str()).into(),
        None => ExtractionOutcome::NotFound,
    }
}

/// The single follow-up question for a missing field
pub fn question_for(field: AppointmentField) -> &'static str {
    match field {
        AppointmentField::Name => "Could you please provide your full name?",
        AppointmentField::Phone => "Could you please provide your phone number?",
        AppointmentField::Email => "Could you please provide your email address?",
        AppointmentField::Date => {
            "When would you like to schedule your appointment? (You can say things like 'next Monday', 'tomorrow', 'in 3 days', etc.)"
        }
    }
}

fn field_lines(data: &AppointmentData) -> String {
    AppointmentField::ALL
        .iter()
        .map(|f| format!("{}: {}", f.label(), data.get(*f).unwrap_or_default()))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Summary for a turn that completed the record
fn booked_summary(data: &AppointmentData) -> String {
    format!(
        "Perfect! I have all the information needed:\n\n{}\n\nYour appointment has been successfully booked!",
        field_lines(data)
    )
}

/// Summary for turns arriving after the record was already complete
fn already_booked_summary(data: &AppointmentData) -> String {
    format!(
        "Great! I have all the information needed for your appointment:\n{}\n\nYour appointment has been successfully booked! You will receive a confirmation email shortly.",
        field_lines(data)
    )
}
