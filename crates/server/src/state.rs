//! Application State
//!
//! Shared state across all handlers.

use std::sync::Arc;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusHandle;

use concierge_agent::{NextAction, TurnOrchestrator};
use concierge_config::Settings;
use concierge_core::{Clock, Intent, Session, SessionStore};
use concierge_llm::LlmBackend;

use crate::session::{InMemorySessionStore, SessionManager};
use crate::ServerError;

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Settings>,
    pub sessions: Arc<SessionManager>,
    pub orchestrator: Arc<TurnOrchestrator>,
    /// `None` when metrics are disabled or the recorder is owned elsewhere
    pub metrics: Option<PrometheusHandle>,
}

/// Outcome of one chat request
#[derive(Debug, Clone)]
pub struct ChatOutcome {
    pub session: Session,
    pub response: String,
    pub intent: Intent,
    pub action: NextAction,
}

impl AppState {
    /// Create application state with the in-memory session store
    pub fn new(config: Settings, llm: Arc<dyn LlmBackend>, clock: Arc<dyn Clock>) -> Self {
        Self::with_session_store(config, llm, clock, Arc::new(InMemorySessionStore::new()))
    }

    /// Create application state with a custom session store
    pub fn with_session_store(
        config: Settings,
        llm: Arc<dyn LlmBackend>,
        clock: Arc<dyn Clock>,
        store: Arc<dyn SessionStore>,
    ) -> Self {
        let orchestrator = TurnOrchestrator::from_settings(llm, clock, &config.llm);
        Self {
            sessions: Arc::new(SessionManager::from_config(store, &config.session)),
            orchestrator: Arc::new(orchestrator),
            config: Arc::new(config),
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }

    pub fn llm(&self) -> &Arc<dyn LlmBackend> {
        self.orchestrator.llm()
    }

    /// Run one chat turn, creating the session when `session_id` is absent or unknown
    pub async fn chat(
        &self,
        message: &str,
        session_id: Option<&str>,
    ) -> Result<ChatOutcome, ServerError> {
        let started = Instant::now();
        self.sessions.purge_expired().await?;

        let (_turn, mut session) = self.sessions.checkout(session_id).await?;
        let result = self.orchestrator.run_turn(message, &mut session).await;
        self.sessions.save(session.clone()).await?;

        crate::metrics::record_turn(result.intent, started.elapsed());
        tracing::info!(
            session_id = %session.id,
            intent = %result.intent,
            action = result.action.as_str(),
            latency_ms = started.elapsed().as_millis() as u64,
            "Chat turn completed"
        );

        Ok(ChatOutcome {
            session,
            response: result.response,
            intent: result.intent,
            action: result.action,
        })
    }

    /// Replace a session's document, creating the session when needed
    pub async fn upload_document(
        &self,
        content: String,
        session_id: Option<&str>,
    ) -> Result<String, ServerError> {
        let (_turn, mut session) = self.sessions.checkout(session_id).await?;
        let id = session.id.clone();

        tracing::info!(session_id = %id, bytes = content.len(), "Document loaded into session");
        session.set_documents(content);
        self.sessions.save(session).await?;
        Ok(id)
    }

    /// Clear the collected appointment data so a new booking can start
    pub async fn reset_appointment(&self, session_id: &str) -> Result<Session, ServerError> {
        let (_turn, mut session) = self
            .sessions
            .lock_existing(session_id)
            .await?
            .ok_or_else(|| ServerError::SessionNotFound(session_id.to_string()))?;

        session.appointment_data.clear();
        self.sessions.save(session.clone()).await?;
        tracing::info!(session_id = %session_id, "Appointment data reset");
        Ok(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::time::Duration;

    use concierge_core::FixedClock;
    use concierge_llm::mock::ScriptedBackend;
    use concierge_llm::{GenerationResult, LlmError};

    const NAME_PROMPT: &str = "Extract the person's name";

    /// Scripted backend that stalls on name extraction
    struct SlowNameBackend {
        inner: ScriptedBackend,
        delay: Duration,
    }

    #[async_trait]
    impl LlmBackend for SlowNameBackend {
        async fn complete(
            &self,
            prompt: &str,
            temperature: f32,
        ) -> Result<GenerationResult, LlmError> {
            if prompt.contains(NAME_PROMPT) {
                tokio::time::sleep(self.delay).await;
            }
            self.inner.complete(prompt, temperature).await
        }

        async fn is_available(&self) -> bool {
            true
        }

        fn model_name(&self) -> &str {
            "slow"
        }
    }

    fn state(llm: Arc<dyn LlmBackend>) -> AppState {
        let clock = Arc::new(FixedClock::ymd(2025, 1, 6).unwrap());
        AppState::new(Settings::default(), llm, clock)
    }

    #[tokio::test]
    async fn test_delete_during_turn_stays_deleted() {
        let backend = SlowNameBackend {
            inner: ScriptedBackend::new()
                .on("expert intent classifier", "appointment_booking")
                .on(NAME_PROMPT, "John Doe"),
            delay: Duration::from_millis(200),
        };
        let state = state(Arc::new(backend));
        let id = state.upload_document("Hours: 9-5".to_string(), None).await.unwrap();

        let turn = {
            let state = state.clone();
            let id = id.clone();
            tokio::spawn(async move { state.chat("My name is John Doe", Some(&id)).await })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert!(state.sessions.delete(&id).await.unwrap());
        let outcome = turn.await.unwrap().unwrap();
        assert_eq!(outcome.session.id, id);

        assert!(state.sessions.get(&id).await.unwrap().is_none());
        assert_eq!(state.sessions.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_reset_unknown_session() {
        let state = state(Arc::new(ScriptedBackend::new()));
        assert!(matches!(
            state.reset_appointment("missing").await,
            Err(ServerError::SessionNotFound(_))
        ));
        // A later chat with the same id still gets a fresh session
        let outcome = state.chat("hello", Some("missing")).await.unwrap();
        assert_ne!(outcome.session.id, "missing");
    }
}
