//! HTTP Endpoints
//!
//! REST API for chat, document upload and session introspection.

use axum::{
    extract::{DefaultBodyLimit, Json, Multipart, Path, Query, State},
    http::{HeaderValue, Method},
    routing::{get, post},
    Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use concierge_agent::decode_document;
use concierge_core::{AppointmentData, Intent};

use crate::metrics::metrics_handler;
use crate::state::AppState;
use crate::ServerError;

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    let server = &state.config.server;
    let cors_layer = build_cors_layer(&server.cors_origins, server.cors_enabled);
    let max_upload = server.max_upload_bytes;

    Router::new()
        .route("/", get(root))
        .route("/chat", post(chat))
        .route("/upload-document", post(upload_document))
        .route("/sessions", get(list_sessions))
        .route("/sessions/:id", get(get_session).delete(delete_session))
        .route("/sessions/:id/reset-appointment", post(reset_appointment))
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_handler))
        .layer(DefaultBodyLimit::max(max_upload))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer)
        .with_state(state)
}

/// Build CORS layer from configured origins
///
/// - If cors_enabled is false, every origin is allowed
/// - Otherwise only the configured origins, defaulting to localhost:3000
fn build_cors_layer(origins: &[String], enabled: bool) -> CorsLayer {
    if !enabled {
        tracing::info!("CORS restrictions disabled, allowing all origins");
        return CorsLayer::permissive();
    }

    let parsed_origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| {
            origin.parse::<HeaderValue>().ok().or_else(|| {
                tracing::warn!("Invalid CORS origin: {}", origin);
                None
            })
        })
        .collect();

    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers(Any);

    if parsed_origins.is_empty() {
        tracing::info!("No valid CORS origins configured, defaulting to localhost:3000");
        return layer.allow_origin(HeaderValue::from_static("http://localhost:3000"));
    }

    tracing::info!("CORS configured with {} origins", parsed_origins.len());
    layer.allow_origin(parsed_origins)
}

/// Service info
async fn root() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "message": "Concierge Chat API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "chat": "/chat",
            "upload_document": "/upload-document",
            "sessions": "/sessions",
            "health": "/health",
            "metrics": "/metrics",
        }
    }))
}

/// Chat request
#[derive(Debug, Deserialize)]
struct ChatRequest {
    message: String,
    #[serde(default)]
    session_id: Option<String>,
}

/// Chat response
#[derive(Debug, Serialize)]
struct ChatResponse {
    response: String,
    session_id: String,
    intent: Intent,
    appointment_data: AppointmentData,
}

/// Chat endpoint; the intent is re-detected on every message
async fn chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ServerError> {
    let outcome = state
        .chat(&request.message, request.session_id.as_deref())
        .await?;

    Ok(Json(ChatResponse {
        response: outcome.response,
        session_id: outcome.session.id,
        intent: outcome.intent,
        appointment_data: outcome.session.appointment_data,
    }))
}

#[derive(Debug, Deserialize)]
struct UploadParams {
    session_id: Option<String>,
}

#[derive(Debug, Serialize)]
struct UploadResponse {
    message: String,
    session_id: String,
}

/// Upload a plain-text document into a session
async fn upload_document(
    State(state): State<AppState>,
    Query(params): Query<UploadParams>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ServerError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ServerError::InvalidRequest(format!("Malformed upload: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field.file_name().unwrap_or("document").to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ServerError::InvalidRequest(format!("Malformed upload: {}", e)))?;
        let content = decode_document(bytes.to_vec())?;

        let session_id = state
            .upload_document(content, params.session_id.as_deref())
            .await?;

        return Ok(Json(UploadResponse {
            message: format!(
                "Document '{}' uploaded successfully. You can now ask questions about it.",
                filename
            ),
            session_id,
        }));
    }

    Err(ServerError::InvalidRequest("Missing 'file' field".to_string()))
}

/// List sessions
async fn list_sessions(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, ServerError> {
    state.sessions.purge_expired().await?;
    let sessions = state.sessions.list().await?;

    let summaries: Vec<serde_json::Value> = sessions
        .iter()
        .map(|s| {
            serde_json::json!({
                "session_id": s.id,
                "created_at": s.created_at.to_rfc3339(),
                "last_accessed": s.last_accessed.to_rfc3339(),
                "has_appointment": !s.appointment_data.is_empty(),
                "has_documents": s.has_documents(),
            })
        })
        .collect();

    Ok(Json(serde_json::json!({
        "active_sessions": summaries.len(),
        "sessions": summaries,
    })))
}

/// Get session info
async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ServerError> {
    let session = state
        .sessions
        .get(&id)
        .await?
        .ok_or_else(|| ServerError::SessionNotFound(id.clone()))?;

    Ok(Json(serde_json::json!({
        "session_id": session.id,
        "appointment_data": session.appointment_data,
        "conversation_history": session.conversation_history,
        "has_documents": session.has_documents(),
        "created_at": session.created_at.to_rfc3339(),
        "last_accessed": session.last_accessed.to_rfc3339(),
    })))
}

/// Delete session
async fn delete_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ServerError> {
    if !state.sessions.delete(&id).await? {
        return Err(ServerError::SessionNotFound(id));
    }
    tracing::info!(session_id = %id, "Session deleted");
    Ok(Json(serde_json::json!({ "message": "Session deleted successfully" })))
}

/// Clear appointment data to start a new booking
async fn reset_appointment(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ServerError> {
    let session = state.reset_appointment(&id).await?;
    Ok(Json(serde_json::json!({
        "message": "Appointment data reset",
        "session_id": session.id,
        "appointment_data": session.appointment_data,
    })))
}

/// Health check with LLM backend reachability
async fn health_check(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, ServerError> {
    let active_sessions = state.sessions.count().await?;
    let llm = state.llm();
    let llm_available = llm.is_available().await;

    Ok(Json(serde_json::json!({
        "status": "healthy",
        "timestamp": Utc::now().to_rfc3339(),
        "active_sessions": active_sessions,
        "llm": {
            "model": llm.model_name(),
            "available": llm_available,
        },
    })))
}
