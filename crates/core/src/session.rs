//! Session state threaded through every turn

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Appointment fields, declared in collection order.
///
/// The declaration order is the extraction order and the question priority
/// (name > phone > email > date).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentField {
    Name,
    Phone,
    Email,
    Date,
}

impl AppointmentField {
    /// All required fields in priority order
    pub const ALL: [AppointmentField; 4] = [
        AppointmentField::Name,
        AppointmentField::Phone,
        AppointmentField::Email,
        AppointmentField::Date,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentField::Name => "name",
            AppointmentField::Phone => "phone",
            AppointmentField::Email => "email",
            AppointmentField::Date => "date",
        }
    }

    /// Capitalized label for summaries
    pub fn label(&self) -> &'static str {
        match self {
            AppointmentField::Name => "Name",
            AppointmentField::Phone => "Phone",
            AppointmentField::Email => "Email",
            AppointmentField::Date => "Date",
        }
    }
}

impl fmt::Display for AppointmentField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validated appointment values collected so far.
///
/// A field that is absent or holds an empty string counts as not yet
/// collected. Completeness is always derived from the map, never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AppointmentData {
    fields: BTreeMap<AppointmentField, String>,
}

impl AppointmentData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Value for a field, if collected
    pub fn get(&self, field: AppointmentField) -> Option<&str> {
        self.fields
            .get(&field)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    pub fn set(&mut self, field: AppointmentField, value: impl Into<String>) {
        self.fields.insert(field, value.into());
    }

    pub fn is_filled(&self, field: AppointmentField) -> bool {
        self.get(field).is_some()
    }

    /// Missing fields in priority order
    pub fn missing_fields(&self) -> Vec<AppointmentField> {
        AppointmentField::ALL
            .iter()
            .copied()
            .filter(|f| !self.is_filled(*f))
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.missing_fields().is_empty()
    }

    /// True when no field holds a value
    pub fn is_empty(&self) -> bool {
        AppointmentField::ALL.iter().all(|f| !self.is_filled(*f))
    }

    pub fn clear(&mut self) {
        self.fields.clear();
    }

    /// Collected (field, value) pairs in priority order
    pub fn iter(&self) -> impl Iterator<Item = (AppointmentField, &str)> {
        self.fields
            .iter()
            .filter(|(_, v)| !v.is_empty())
            .map(|(k, v)| (*k, v.as_str()))
    }
}

/// One exchange in the conversation history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub user: String,
    pub assistant: String,
}

/// Per-conversation state owned by the serving layer and mutated by one
/// turn at a time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub appointment_data: AppointmentData,
    /// Append-only; the core never reads it back
    pub conversation_history: Vec<ConversationTurn>,
    /// Raw document text, empty when nothing was uploaded
    pub documents_content: String,
    pub created_at: DateTime<Utc>,
    pub last_accessed: DateTime<Utc>,
}

impl Session {
    /// Create an empty session with the given id
    pub fn new(id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            appointment_data: AppointmentData::new(),
            conversation_history: Vec::new(),
            documents_content: String::new(),
            created_at: now,
            last_accessed: now,
        }
    }

    /// Create an empty session with a fresh UUID v4 id
    pub fn with_random_id() -> Self {
        Self::new(uuid::Uuid::new_v4().to_string())
    }

    pub fn touch(&mut self) {
        self.last_accessed = Utc::now();
    }

    pub fn has_documents(&self) -> bool {
        !self.documents_content.is_empty()
    }

    /// Replace the document text wholesale
    pub fn set_documents(&mut self, content: impl Into<String>) {
        self.documents_content = content.into();
    }

    pub fn record_turn(&mut self, user: impl Into<String>, assistant: impl Into<String>) {
        self.conversation_history.push(ConversationTurn {
            user: user.into(),
            assistant: assistant.into(),
        });
    }

    /// Whether the session has been idle longer than `timeout`
    pub fn is_expired(&self, timeout: std::time::Duration, now: DateTime<Utc>) -> bool {
        match chrono::Duration::from_std(timeout) {
            Ok(timeout) => now - self.last_accessed > timeout,
            Err(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_missing_fields_priority_order() {
        let mut data = AppointmentData::new();
        data.set(AppointmentField::Email, "a@b.com");
        assert_eq!(
            data.missing_fields(),
            vec![
                AppointmentField::Name,
                AppointmentField::Phone,
                AppointmentField::Date
            ]
        );
    }

    #[test]
    fn test_empty_value_counts_as_missing() {
        let mut data = AppointmentData::new();
        data.set(AppointmentField::Name, "");
        assert!(!data.is_filled(AppointmentField::Name));
        assert!(data.is_empty());
        assert_eq!(data.missing_fields().len(), 4);
    }

    #[test]
    fn test_completeness() {
        let mut data = AppointmentData::new();
        data.set(AppointmentField::Name, "Jane Roe");
        data.set(AppointmentField::Phone, "5551234567");
        data.set(AppointmentField::Email, "jane@example.com");
        assert!(!data.is_complete());
        data.set(AppointmentField::Date, "2025-01-05");
        assert!(data.is_complete());
    }

    #[test]
    fn test_appointment_data_json_shape() {
        let mut data = AppointmentData::new();
        data.set(AppointmentField::Name, "Jane Roe");
        data.set(AppointmentField::Date, "2025-01-05");
        let json = serde_json::to_value(&data).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"name": "Jane Roe", "date": "2025-01-05"})
        );
        let back: AppointmentData = serde_json::from_value(json).unwrap();
        assert_eq!(back, data);
    }

    #[test]
    fn test_session_history_and_documents() {
        let mut session = Session::new("abc");
        assert!(!session.has_documents());
        session.set_documents("Opening hours: 9-5");
        assert!(session.has_documents());
        session.record_turn("hi", "hello");
        session.record_turn("hours?", "9-5");
        assert_eq!(session.conversation_history.len(), 2);
        assert_eq!(session.conversation_history[1].assistant, "9-5");
    }

    #[test]
    fn test_session_expiry() {
        let session = Session::new("abc");
        let later = session.last_accessed + chrono::Duration::seconds(120);
        assert!(session.is_expired(Duration::from_secs(60), later));
        assert!(!session.is_expired(Duration::from_secs(600), later));
    }
}
