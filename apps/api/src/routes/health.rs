use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health
/// Returns service status along with the loaded snapshot's generation and size.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    let snapshot = state.catalog.current().await;
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "jobboard-api",
        "snapshot": {
            "generation": snapshot.generation(),
            "jobs": snapshot.len()
        },
        "sessions": state.sessions.len().await
    }))
}
