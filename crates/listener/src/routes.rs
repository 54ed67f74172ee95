use std::sync::Arc;

use axum::body::Body;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::{get, post};
use axum::Router;
use events::{EventEngine, HandleOutcome};
use serde_json::{json, Value};

/// Largest webhook body read into memory. Larger deliveries are
/// acknowledged and dropped.
pub const MAX_WEBHOOK_BYTES: usize = 32 * 1024 * 1024;

/// Builds the ingress router around a shared engine.
pub fn router(engine: Arc<EventEngine>) -> Router {
    Router::new()
        .route("/events", post(webhook_handler))
        .route("/health", get(health))
        .with_state(engine)
}

// Takes the raw `Body` so axum's default body limit never answers 413.
async fn webhook_handler(State(engine): State<Arc<EventEngine>>, body: Body) -> StatusCode {
    let body = match axum::body::to_bytes(body, MAX_WEBHOOK_BYTES).await {
        Ok(bytes) => bytes,
        Err(error) => {
            tracing::warn!(%error, limit = MAX_WEBHOOK_BYTES, "Webhook body could not be read; acknowledging anyway");
            return StatusCode::OK;
        }
    };

    let payload: Value = match serde_json::from_slice(&body) {
        Ok(payload) => payload,
        Err(error) => {
            tracing::warn!(%error, bytes = body.len(), "Webhook body is not JSON; acknowledging anyway");
            return StatusCode::OK;
        }
    };

    match engine.handle(&payload).await {
        HandleOutcome::Processed {
            events,
            test_results_requested,
        } => {
            tracing::info!(events = events.len(), test_results_requested, "Webhook processed");
        }
        HandleOutcome::Discarded { reason } => {
            tracing::debug!(%reason, "Webhook discarded");
        }
    }
    StatusCode::OK
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
