//! Scripted in-process backend
//!
//! Answers each prompt from the first rule whose marker the prompt contains.
//! Every call is recorded so tests can assert which prompts were sent.

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::backend::{GenerationResult, LlmBackend};
use crate::LlmError;

#[derive(Debug, Clone)]
enum Reply {
    Text(String),
    Fail(String),
}

/// Recorded call
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub prompt: String,
    pub temperature: f32,
}

/// Backend answering from a list of `(prompt marker, reply)` rules
#[derive(Debug, Default)]
pub struct ScriptedBackend {
    rules: Vec<(String, Reply)>,
    fallback: Option<Reply>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend whose every call fails
    pub fn failing() -> Self {
        Self::new().otherwise_fail("connection refused")
    }

    /// Reply with `text` when the prompt contains `marker`
    pub fn on(mut self, marker: impl Into<String>, text: impl Into<String>) -> Self {
        self.rules.push((marker.into(), Reply::Text(text.into())));
        self
    }

    /// Fail when the prompt contains `marker`
    pub fn fail_on(mut self, marker: impl Into<String>, message: impl Into<String>) -> Self {
        self.rules.push((marker.into(), Reply::Fail(message.into())));
        self
    }

    /// Reply for prompts no rule matches
    pub fn otherwise(mut self, text: impl Into<String>) -> Self {
        self.fallback = Some(Reply::Text(text.into()));
        self
    }

    /// Fail for prompts no rule matches
    pub fn otherwise_fail(mut self, message: impl Into<String>) -> Self {
        self.fallback = Some(Reply::Fail(message.into()));
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }
}

#[async_trait]
impl LlmBackend for ScriptedBackend {
    async fn complete(&self, prompt: &str, temperature: f32) -> Result<GenerationResult, LlmError> {
        self.calls.lock().push(RecordedCall {
            prompt: prompt.to_string(),
            temperature,
        });

        let reply = self
            .rules
            .iter()
            .find(|(marker, _)| prompt.contains(marker.as_str()))
            .map(|(_, reply)| reply)
            .or(self.fallback.as_ref());

        match reply {
            Some(Reply::Text(text)) => Ok(GenerationResult::from_text(text.clone())),
            Some(Reply::Fail(message)) => Err(LlmError::Network(message.clone())),
            None => Err(LlmError::Generation("no scripted reply".to_string())),
        }
    }

    async fn is_available(&self) -> bool {
        !matches!(self.fallback, Some(Reply::Fail(_)))
    }

    fn model_name(&self) -> &str {
        "scripted"
    }
}
