//! Per-message intent classification
//!
//! Classification is a pure function of the incoming message. Nothing is
//! remembered between turns, so a session can switch between document
//! questions and booking at any point.

use std::sync::Arc;

use concierge_config::constants::temperatures;
use concierge_core::Intent;
use concierge_llm::{prompt, LlmBackend};

/// Words in the user's message that signal a booking when the LLM verdict is unusable
const BOOKING_KEYWORDS: [&str; 5] = ["appointment", "book", "schedule", "reservation", "meeting"];

/// LLM-backed intent classifier
pub struct IntentClassifier {
    llm: Arc<dyn LlmBackend>,
    temperature: f32,
}

impl IntentClassifier {
    pub fn new(llm: Arc<dyn LlmBackend>) -> Self {
        Self {
            llm,
            temperature: temperatures::GENERATION,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Classify one message.
    ///
    /// When the LLM fails, only an explicit booking keyword in the message
    /// routes to booking; everything else resolves to
    /// [`Intent::DocumentQuery`].
    pub async fn classify(&self, input: &str) -> Intent {
        let request = prompt::intent_classification(input);
        match self.llm.complete(&request, self.temperature).await {
            Ok(result) => parse_verdict(&result.text, input),
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    "Intent classification failed, falling back to keyword scan"
                );
                keyword_scan(input)
            }
        }
    }
}

fn parse_verdict(verdict: &str, input: &str) -> Intent {
    let verdict = verdict.trim().to_lowercase();
    if verdict.contains("appointment") || verdict.contains("booking") {
        Intent::AppointmentBooking
    } else if verdict.contains("document") || verdict.contains("query") {
        Intent::DocumentQuery
    } else {
        tracing::debug!(verdict = %verdict, "Unrecognized intent verdict, scanning keywords");
        keyword_scan(input)
    }
}

fn keyword_scan(input: &str) -> Intent {
    let input = input.to_lowercase();
    if BOOKING_KEYWORDS.iter().any(|k| input.contains(k)) {
        Intent::AppointmentBooking
    } else {
        Intent::DocumentQuery
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use concierge_llm::mock::ScriptedBackend;

    fn classifier(backend: ScriptedBackend) -> IntentClassifier {
        IntentClassifier::new(Arc::new(backend))
    }

    #[tokio::test]
    async fn test_verdict_labels() {
        let c = classifier(ScriptedBackend::new().otherwise(" Appointment_Booking\n"));
        assert_eq!(c.classify("what are your hours?").await, Intent::AppointmentBooking);

        let c = classifier(ScriptedBackend::new().otherwise("document_query"));
        assert_eq!(c.classify("book me in").await, Intent::DocumentQuery);
    }

    #[test]
    fn test_booking_checked_before_document() {
        assert_eq!(parse_verdict("booking query", "x"), Intent::AppointmentBooking);
        assert_eq!(parse_verdict("query", "schedule"), Intent::DocumentQuery);
    }

    #[test]
    fn test_unusable_verdict_scans_input() {
        assert_eq!(parse_verdict("maybe?", "Can I Book a slot"), Intent::AppointmentBooking);
        assert_eq!(parse_verdict("", "Set up a MEETING"), Intent::AppointmentBooking);
        assert_eq!(parse_verdict("unsure", "what do you sell"), Intent::DocumentQuery);
    }

    #[tokio::test]
    async fn test_llm_failure_defaults_to_document_query() {
        let c = classifier(ScriptedBackend::failing());
        assert_eq!(c.classify("What services do you offer?").await, Intent::DocumentQuery);
    }

    #[tokio::test]
    async fn test_llm_failure_still_honors_booking_keywords() {
        let c = classifier(ScriptedBackend::failing());
        assert_eq!(c.classify("I need to schedule a meeting").await, Intent::AppointmentBooking);
    }

    #[tokio::test]
    async fn test_uses_generation_temperature() {
        let backend = Arc::new(ScriptedBackend::new().otherwise("document_query"));
        let c = IntentClassifier::new(backend.clone());
        c.classify("hello").await;
        assert_eq!(backend.calls()[0].temperature, temperatures::GENERATION);
    }
}
