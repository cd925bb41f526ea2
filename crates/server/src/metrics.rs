//! Prometheus metrics
//!
//! Installs the global recorder once at startup; the handle renders the
//! exposition text for `GET /metrics`.

use std::time::Duration;

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use concierge_core::Intent;

use crate::state::AppState;

pub const TURNS_TOTAL: &str = "concierge_turns_total";
pub const TURN_LATENCY_SECONDS: &str = "concierge_turn_latency_seconds";
pub const SESSIONS_ACTIVE: &str = "concierge_sessions_active";

/// Install the Prometheus recorder.
///
/// Returns `None` when a recorder is already installed for this process.
pub fn init_metrics() -> Option<PrometheusHandle> {
    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            ::metrics::describe_counter!(TURNS_TOTAL, "Chat turns processed, by intent");
            ::metrics::describe_histogram!(TURN_LATENCY_SECONDS, "End-to-end chat turn latency");
            ::metrics::describe_gauge!(SESSIONS_ACTIVE, "Sessions currently held in memory");
            Some(handle)
        }
        Err(e) => {
            tracing::warn!(error = %e, "Failed to install Prometheus recorder");
            None
        }
    }
}

/// Record a completed chat turn
pub fn record_turn(intent: Intent, latency: Duration) {
    ::metrics::counter!(TURNS_TOTAL, "intent" => intent.as_str()).increment(1);
    ::metrics::histogram!(TURN_LATENCY_SECONDS).record(latency.as_secs_f64());
}

pub fn record_sessions_active(count: usize) {
    ::metrics::gauge!(SESSIONS_ACTIVE).set(count as f64);
}

/// `GET /metrics`
pub async fn metrics_handler(State(state): State<AppState>) -> Response {
    match state.metrics.as_ref() {
        Some(handle) => (
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            handle.render(),
        )
            .into_response(),
        None => (StatusCode::NOT_FOUND, "metrics disabled").into_response(),
    }
}
