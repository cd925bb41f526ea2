//! Prompt Building
//!
//! Prompt templates for every LLM call site of the chat router. Each template
//! pins the output format the caller parses (a single label, a name or
//! `NOT_FOUND`, verbatim excerpts or the no-match sentinel).

use concierge_config::constants::messages::{NAME_NOT_FOUND_SENTINEL, NO_RELEVANT_SENTINEL};

/// Forced single-word intent classification
pub fn intent_classification(user_input: &str) -> String {
    format!(
        r#"You are an expert intent classifier. Classify the user's input into one of these categories:
- "appointment_booking": If the user wants to book an appointment, schedule, make a reservation, or provide booking details
- "document_query": If the user is asking questions about documents, information, or general queries

User input: "{user_input}"

Respond with only one word: either "appointment_booking" or "document_query"."#
    )
}

/// Person-name extraction; answers the name or the not-found sentinel
pub fn name_extraction(text: &str) -> String {
    format!(
        r#"Extract the person's name from this text. If no name is present, respond with "{NAME_NOT_FOUND_SENTINEL}".
Respond with the name only, without any other words.
Text: "{text}"
Name:"#
    )
}

/// Verbatim excerpt extraction from the session document
pub fn document_extraction(documents_content: &str, query: &str) -> String {
    format!(
        r#"You are an intelligent document assistant.
Your task is to extract and return ONLY the relevant information from the document that answers the user's query.

Document Content:
{documents_content}

User Query: {query}

Instructions:
1. Carefully read and understand the user's query
2. Search through the entire document for information that is semantically related to the query
3. Extract ALL relevant sections, paragraphs, or details that answer the query
4. If multiple pieces of information are relevant, include them all
5. Preserve the original text structure and details (prices, timelines, contact info, etc.)
6. If no relevant information is found, respond with: "{NO_RELEVANT_SENTINEL}"

Return only the extracted relevant information without adding explanations or commentary."#
    )
}

/// Final answer grounded in the retrieved excerpt
pub fn answer_generation(relevant_info: &str, query: &str) -> String {
    format!(
        r#"You are a helpful assistant. Answer the user's question based on the following document information.
Document Information:
{relevant_info}

User Question: {query}

Provide a clear and concise answer. If the information is not available in the documents, say so politely."#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intent_prompt_embeds_input_and_labels() {
        let prompt = intent_classification("I want to book for Friday");
        assert!(prompt.contains("\"I want to book for Friday\""));
        assert!(prompt.contains("appointment_booking"));
        assert!(prompt.contains("document_query"));
    }

    #[test]
    fn test_name_prompt_mentions_sentinel() {
        let prompt = name_extraction("call me Ada");
        assert!(prompt.contains("NOT_FOUND"));
        assert!(prompt.ends_with("Name:"));
    }

    #[test]
    fn test_extraction_prompt_mentions_sentinel() {
        let prompt = document_extraction("Hours: 9-5", "when are you open?");
        assert!(prompt.contains("Hours: 9-5"));
        assert!(prompt.contains("when are you open?"));
        assert!(prompt.contains("\"No relevant information found\""));
    }

    #[test]
    fn test_answer_prompt() {
        let prompt = answer_generation("Hours: 9-5", "when are you open?");
        assert!(prompt.contains("Document Information:\nHours: 9-5"));
        assert!(prompt.contains("User Question: when are you open?"));
    }
}
