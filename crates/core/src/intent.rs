//! Intent labels

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Coarse task category a single user message is routed to.
///
/// Intent is recomputed for every message and never stored on the session,
/// so one session can alternate between both flows turn to turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    /// Question about the uploaded document
    #[default]
    DocumentQuery,
    /// Appointment booking or booking details
    AppointmentBooking,
}

impl Intent {
    /// Wire label (`document_query` / `appointment_booking`)
    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::DocumentQuery => "document_query",
            Intent::AppointmentBooking => "appointment_booking",
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Intent {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "document_query" => Ok(Intent::DocumentQuery),
            "appointment_booking" => Ok(Intent::AppointmentBooking),
            other => Err(format!("Unknown intent: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intent_labels() {
        assert_eq!(Intent::DocumentQuery.to_string(), "document_query");
        assert_eq!(Intent::AppointmentBooking.as_str(), "appointment_booking");
    }

    #[test]
    fn test_intent_parse() {
        assert_eq!(
            "Appointment_Booking".parse::<Intent>().unwrap(),
            Intent::AppointmentBooking
        );
        assert!("smalltalk".parse::<Intent>().is_err());
    }

    #[test]
    fn test_intent_serde() {
        let json = serde_json::to_string(&Intent::AppointmentBooking).unwrap();
        assert_eq!(json, "\"appointment_booking\"");
    }
}
