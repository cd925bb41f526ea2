//! Centralized constants
//!
//! Single source of truth for defaults, sampling temperatures and the
//! fixed user-facing messages shared across crates.

/// Service endpoints (defaults for local development)
pub mod endpoints {
    /// Ollama LLM endpoint
    pub const OLLAMA_DEFAULT: &str = "http://localhost:11434";

    /// Default Ollama model
    pub const OLLAMA_MODEL_DEFAULT: &str = "llama3.2";
}

/// Sampling temperatures per call site
pub mod temperatures {
    /// Answer generation and intent classification
    pub const GENERATION: f32 = 0.7;

    /// Field and excerpt extraction (favors precision)
    pub const EXTRACTION: f32 = 0.3;
}

/// Timeouts (seconds unless noted)
pub mod timeouts {
    /// Ollama HTTP request timeout
    pub const LLM_REQUEST_SECS: u64 = 120;

    /// Idle time before a session is expired
    pub const SESSION_IDLE_SECS: u64 = 3600;

    /// Interval of the background session cleanup task
    pub const SESSION_CLEANUP_SECS: u64 = 300;
}

/// Fixed user-facing messages
pub mod messages {
    /// Returned when a session has no document loaded
    pub const NO_DOCUMENTS: &str =
        "No documents available to query. Please upload documents first.";

    /// Returned when nothing in the document matches the query
    pub const NO_RELEVANT_INFO: &str =
        "No relevant information found in the documents for your query.";

    /// Sentinel the LLM is told to emit when the document has no answer
    pub const NO_RELEVANT_SENTINEL: &str = "No relevant information found";

    /// Sentinel the LLM is told to emit when no name is present
    pub const NAME_NOT_FOUND_SENTINEL: &str = "NOT_FOUND";
}

/// Document query limits
pub mod documents {
    /// Maximum lines returned by the keyword fallback
    pub const KEYWORD_FALLBACK_MAX_LINES: usize = 5;

    /// Replies containing the sentinel shorter than this are normalized
    pub const SENTINEL_REPLY_MAX_CHARS: usize = 100;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extraction_is_cooler_than_generation() {
        assert!(temperatures::EXTRACTION < temperatures::GENERATION);
    }

    #[test]
    fn test_sentinel_is_prefix_of_message() {
        assert!(messages::NO_RELEVANT_INFO.starts_with(messages::NO_RELEVANT_SENTINEL));
    }
}
