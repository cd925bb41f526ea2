//! Turn orchestration
//!
//! One turn: classify the message, dispatch to document Q&A or booking,
//! record the exchange on the session.

use std::sync::Arc;

use concierge_config::constants::temperatures;
use concierge_config::LlmSettings;
use concierge_core::{Clock, Intent, Session};
use concierge_llm::{prompt, LlmBackend};

use crate::booking::{BookingEngine, NextAction};
use crate::date::DateResolver;
use crate::documents::DocumentQueryBridge;
use crate::intent::IntentClassifier;

/// Output of a single turn
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnResult {
    pub response: String,
    pub intent: Intent,
    pub action: NextAction,
}

/// Routes each message to the handler its intent selects
pub struct TurnOrchestrator {
    llm: Arc<dyn LlmBackend>,
    classifier: IntentClassifier,
    documents: DocumentQueryBridge,
    booking: BookingEngine,
    generation_temperature: f32,
}

impl TurnOrchestrator {
    /// Create an orchestrator with the default sampling temperatures
    pub fn new(llm: Arc<dyn LlmBackend>, clock: Arc<dyn Clock>) -> Self {
        Self {
            classifier: IntentClassifier::new(llm.clone()),
            documents: DocumentQueryBridge::new(llm.clone()),
            booking: BookingEngine::new(llm.clone(), DateResolver::new(clock)),
            generation_temperature: temperatures::GENERATION,
            llm,
        }
    }

    /// Create an orchestrator using the configured temperatures
    pub fn from_settings(
        llm: Arc<dyn LlmBackend>,
        clock: Arc<dyn Clock>,
        settings: &LlmSettings,
    ) -> Self {
        Self {
            classifier: IntentClassifier::new(llm.clone())
                .with_temperature(settings.generation_temperature),
            documents: DocumentQueryBridge::new(llm.clone())
                .with_temperature(settings.extraction_temperature),
            booking: BookingEngine::new(llm.clone(), DateResolver::new(clock))
                .with_temperature(settings.extraction_temperature),
            generation_temperature: settings.generation_temperature,
            llm,
        }
    }

    pub fn llm(&self) -> &Arc<dyn LlmBackend> {
        &self.llm
    }

    /// Process one user message against the session.
    ///
    /// The caller must not run two turns on the same session concurrently.
    pub async fn run_turn(&self, input: &str, session: &mut Session) -> TurnResult {
        let intent = self.classifier.classify(input).await;
        tracing::debug!(session_id = %session.id, %intent, "Classified message");

        let (response, action) = match intent {
            Intent::DocumentQuery => (
                self.answer_from_documents(input, &session.documents_content).await,
                NextAction::Complete,
            ),
            Intent::AppointmentBooking => {
                let outcome = self.booking.handle(input, &mut session.appointment_data).await;
                (outcome.response, outcome.action)
            }
        };

        session.record_turn(input, response.clone());

        TurnResult {
            response,
            intent,
            action,
        }
    }

    async fn answer_from_documents(&self, query: &str, documents_content: &str) -> String {
        let relevant_info = self.documents.query(query, documents_content).await;
        let request = prompt::answer_generation(&relevant_info, query);

        match self.llm.complete(&request, self.generation_temperature).await {
            Ok(result) => result.text,
            Err(e) => {
                tracing::warn!(error = %e, "Answer generation failed");
                format!("I apologize, but I encountered an error: {}", e)
            }
        }
    }
}
