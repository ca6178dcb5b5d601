//! HTTP ingestion surface: `POST /logs` decodes a single `RawLog` JSON
//! object per request and enqueues it onto Q1. `GET /health` is an ambient
//! operability endpoint, not part of the detection spec.

use crate::domain::RawLog;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::warn;

#[derive(Clone)]
struct HttpState {
    raw_tx: mpsc::Sender<RawLog>,
    shutdown: CancellationToken,
}

pub fn router(raw_tx: mpsc::Sender<RawLog>, shutdown: CancellationToken) -> Router {
    let state = Arc::new(HttpState { raw_tx, shutdown });
    Router::new()
        .route("/logs", post(logs_handler))
        .route("/health", get(health_handler))
        .with_state(state)
}

async fn health_handler() -> &'static str {
    "OK"
}

async fn logs_handler(State(state): State<Arc<HttpState>>, body: String) -> impl IntoResponse {
    let raw: RawLog = match serde_json::from_str(&body) {
        Ok(raw) => raw,
        Err(e) => {
            warn!("failed to decode RawLog from HTTP body: {e}");
            return (StatusCode::BAD_REQUEST, "Invalid JSON");
        }
    };

    if state.shutdown.is_cancelled() {
        return (StatusCode::SERVICE_UNAVAILABLE, "Shutting down");
    }

    tokio::select! {
        res = state.raw_tx.send(raw) => match res {
            Ok(()) => (StatusCode::OK, "Log received"),
            Err(_) => (StatusCode::SERVICE_UNAVAILABLE, "Shutting down"),
        },
        () = state.shutdown.cancelled() => {
            (StatusCode::SERVICE_UNAVAILABLE, "Shutting down")
        }
    }
}
