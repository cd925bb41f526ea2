//! Concierge Server
//!
//! HTTP endpoints for chat, document upload and session introspection,
//! backed by an in-memory session store.

pub mod http;
pub mod metrics;
pub mod session;
pub mod state;

pub use http::create_router;
pub use metrics::{init_metrics, record_sessions_active, record_turn};
pub use session::{InMemorySessionStore, SessionManager};
pub use state::AppState;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

/// Server errors
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Session not found")]
    SessionNotFound(String),

    #[error("{0}")]
    InvalidRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<ServerError> for StatusCode {
    fn from(err: ServerError) -> Self {
        match err {
            ServerError::SessionNotFound(_) => StatusCode::NOT_FOUND,
            ServerError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<concierge_core::Error> for ServerError {
    fn from(err: concierge_core::Error) -> Self {
        ServerError::Internal(err.to_string())
    }
}

impl From<concierge_agent::AgentError> for ServerError {
    fn from(err: concierge_agent::AgentError) -> Self {
        match err {
            concierge_agent::AgentError::InvalidDocument(msg) => ServerError::InvalidRequest(msg),
            other => ServerError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let detail = self.to_string();
        if let ServerError::Internal(_) = &self {
            tracing::error!(error = %detail, "Request failed");
        }
        let status = StatusCode::from(self);
        (status, Json(serde_json::json!({ "detail": detail }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            StatusCode::from(ServerError::SessionNotFound("x".into())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            StatusCode::from(ServerError::InvalidRequest("bad".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            StatusCode::from(ServerError::Internal("boom".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_upload_error_is_bad_request() {
        let err = ServerError::from(concierge_agent::AgentError::InvalidDocument(
            "File must be a text file (UTF-8 encoded)".into(),
        ));
        assert_eq!(err.to_string(), "File must be a text file (UTF-8 encoded)");
        assert_eq!(StatusCode::from(err), StatusCode::BAD_REQUEST);
    }
}
