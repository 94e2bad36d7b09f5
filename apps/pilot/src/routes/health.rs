use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health
/// Returns service status plus which action surfaces are currently busy.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    let pending = &state.pending;
    let busy: Vec<&str> = [
        &pending.upload,
        &pending.recommend,
        &pending.assessment,
        &pending.roadmap,
        &pending.guidance,
        &pending.role_roadmap,
    ]
    .into_iter()
    .filter(|flag| flag.is_pending())
    .map(|flag| flag.name())
    .collect();

    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "pathpilot",
        "busy": busy,
    }))
}
