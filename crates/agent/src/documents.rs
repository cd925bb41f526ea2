//! Document question answering over session-uploaded text
//!
//! The whole document goes to the LLM in one extraction pass. When the LLM
//! is unreachable, a keyword line scan stands in for it.

use std::path::Path;
use std::sync::Arc;

use concierge_config::constants::documents::{
    KEYWORD_FALLBACK_MAX_LINES, SENTINEL_REPLY_MAX_CHARS,
};
use concierge_config::constants::messages::{
    NO_DOCUMENTS, NO_RELEVANT_INFO, NO_RELEVANT_SENTINEL,
};
use concierge_config::constants::temperatures;
use concierge_llm::{prompt, LlmBackend};

use crate::AgentError;

/// Bridge between a user query and the session document
pub struct DocumentQueryBridge {
    llm: Arc<dyn LlmBackend>,
    temperature: f32,
}

impl DocumentQueryBridge {
    pub fn new(llm: Arc<dyn LlmBackend>) -> Self {
        Self {
            llm,
            temperature: temperatures::EXTRACTION,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Extract the parts of `documents_content` relevant to `query`.
    ///
    /// Never fails: returns the excerpt, a fixed no-document or no-match
    /// message, or the keyword fallback when the LLM errors.
    pub async fn query(&self, query: &str, documents_content: &str) -> String {
        if documents_content.is_empty() {
            return NO_DOCUMENTS.to_string();
        }

        let request = prompt::document_extraction(documents_content, query);
        match self.llm.complete(&request, self.temperature).await {
            Ok(result) => normalize_reply(&result.text),
            Err(e) => {
                tracing::warn!(error = %e, "Document extraction failed, using keyword fallback");
                keyword_fallback(query, documents_content)
            }
        }
    }
}

/// Short replies carrying the sentinel become the fixed no-match message
fn normalize_reply(reply: &str) -> String {
    let reply = reply.trim();
    let has_sentinel = reply
        .to_lowercase()
        .contains(&NO_RELEVANT_SENTINEL.to_lowercase());

    if has_sentinel && reply.chars().count() < SENTINEL_REPLY_MAX_CHARS {
        NO_RELEVANT_INFO.to_string()
    } else {
        reply.to_string()
    }
}

/// Lines containing any word of the query, first few only
fn keyword_fallback(query: &str, documents_content: &str) -> String {
    let query = query.to_lowercase();
    let words: Vec<&str> = query.split_whitespace().collect();

    let lines: Vec<&str> = documents_content
        .split('\n')
        .filter(|line| {
            let line = line.to_lowercase();
            words.iter().any(|word| line.contains(word))
        })
        .take(KEYWORD_FALLBACK_MAX_LINES)
        .collect();

    if lines.is_empty() {
        NO_RELEVANT_INFO.to_string()
    } else {
        lines.join("\n")
    }
}

/// Decode uploaded bytes as document text
pub fn decode_document(bytes: Vec<u8>) -> Result<String, AgentError> {
    String::from_utf8(bytes).map_err(|_| {
        AgentError::InvalidDocument("File must be a text file (UTF-8 encoded)".to_string())
    })
}

/// Read a text document from disk
pub fn load_document(path: impl AsRef<Path>) -> Result<String, AgentError> {
    let bytes = std::fs::read(path.as_ref())?;
    decode_document(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use concierge_llm::mock::ScriptedBackend;

    const DOC: &str = "Business Hours: Monday to Friday, 9 AM - 6 PM
Contact: support@company.com
Web Development: from $2000";

    fn bridge(backend: ScriptedBackend) -> (DocumentQueryBridge, Arc<ScriptedBackend>) {
        let backend = Arc::new(backend);
        (DocumentQueryBridge::new(backend.clone()), backend)
    }

    #[tokio::test]
    async fn test_empty_document_skips_llm() {
        let (bridge, backend) = bridge(ScriptedBackend::new().otherwise("anything"));
        assert_eq!(bridge.query("hours?", "").await, NO_DOCUMENTS);
        assert_eq!(backend.call_count(), 0);
    }

    #[tokio::test]
    async fn test_excerpt_returned_trimmed_at_extraction_temperature() {
        let reply = "  Business Hours: Monday to Friday, 9 AM - 6 PM \n";
        let (bridge, backend) = bridge(ScriptedBackend::new().otherwise(reply));
        let answer = bridge.query("What are your hours?", DOC).await;
        assert_eq!(answer, "Business Hours: Monday to Friday, 9 AM - 6 PM");

        let calls = backend.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].temperature, temperatures::EXTRACTION);
        assert!(calls[0].prompt.contains(DOC));
    }

    #[tokio::test]
    async fn test_short_sentinel_reply_normalized() {
        let reply = "no relevant information found.";
        let (bridge, _) = bridge(ScriptedBackend::new().otherwise(reply));
        assert_eq!(bridge.query("parking?", DOC).await, NO_RELEVANT_INFO);
    }

    #[test]
    fn test_long_sentinel_reply_kept() {
        let reply = format!("{} about parking, but {}", NO_RELEVANT_SENTINEL, "x".repeat(100));
        assert_eq!(normalize_reply(&reply), reply);
    }

    #[tokio::test]
    async fn test_llm_failure_uses_keyword_fallback() {
        let (bridge, _) = bridge(ScriptedBackend::failing());
        assert_eq!(
            bridge.query("contact email", DOC).await,
            "Contact: support@company.com"
        );
        assert_eq!(bridge.query("parking garage", DOC).await, NO_RELEVANT_INFO);
    }

    #[test]
    fn test_keyword_fallback_caps_lines() {
        let doc = (0..10).map(|i| format!("price line {}", i)).collect::<Vec<_>>().join("\n");
        let result = keyword_fallback("PRICE", &doc);
        assert_eq!(result.lines().count(), KEYWORD_FALLBACK_MAX_LINES);
        assert!(result.starts_with("price line 0"));
    }

    #[test]
    fn test_decode_document() {
        assert_eq!(decode_document(b"hello".to_vec()).unwrap(), "hello");
        let err = decode_document(vec![0xff, 0xfe, 0x00]).unwrap_err();
        assert_eq!(err.to_string(), "Invalid document: File must be a text file (UTF-8 encoded)");
    }

    #[test]
    fn test_load_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.txt");
        std::fs::write(&path, DOC).unwrap();
        assert_eq!(load_document(&path).unwrap(), DOC);
        assert!(matches!(load_document(dir.path().join("missing.txt")), Err(AgentError::Io(_))));
    }
}
