use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health
/// Liveness plus what the matcher is currently serving from.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    let catalog = state.catalog.snapshot();
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "jobarch-api",
        "matcher": state.matcher.backend(),
        "profiles": catalog.len(),
    }))
}
