use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;

use crate::errors::AppError;
use crate::roadmap::render::{render, RoadmapView};
use crate::roadmap::role::{lookup, RoleRoadmap};
use crate::roadmap::{fetch, Completion, RoadmapForm};
use crate::state::{raise, AppState};

#[derive(Debug, Deserialize)]
pub struct RoleRoadmapRequest {
    pub role: String,
}

/// GET /api/v1/roadmap/form
pub async fn handle_get_form(State(state): State<AppState>) -> Json<RoadmapForm> {
    let mut workflow = state.workflow.lock().await;
    Json(workflow.enter_roadmap().form.clone())
}

/// PUT /api/v1/roadmap/form
///
/// Edits score, career or language. Blank strings clear a field back to its default.
pub async fn handle_update_form(
    State(state): State<AppState>,
    Json(update): Json<RoadmapForm>,
) -> Json<RoadmapForm> {
    let mut workflow = state.workflow.lock().await;
    let stage = workflow.enter_roadmap();
    stage.form.apply(update);
    Json(stage.form.clone())
}

/// POST /api/v1/roadmap
///
/// Requests a roadmap for the current form values. Error replies are kept for display
/// rather than failing the request.
pub async fn handle_fetch(State(state): State<AppState>) -> Result<Json<RoadmapView>, AppError> {
    let _pending = raise(&state.pending.roadmap)?;

    let request = state.workflow.lock().await.enter_roadmap().begin_fetch();
    let outcome = fetch(state.advisor.as_ref(), request).await;

    let mut workflow = state.workflow.lock().await;
    let stage = workflow.enter_roadmap();
    stage.commit_fetch(outcome);
    Ok(Json(render(stage)))
}

/// GET /api/v1/roadmap
pub async fn handle_get(State(state): State<AppState>) -> Json<RoadmapView> {
    let mut workflow = state.workflow.lock().await;
    Json(render(workflow.enter_roadmap()))
}

/// POST /api/v1/roadmap/phases/:index/toggle
pub async fn handle_toggle_phase(
    State(state): State<AppState>,
    Path(index): Path<usize>,
) -> Result<Json<RoadmapView>, AppError> {
    let mut workflow = state.workflow.lock().await;
    let stage = workflow.enter_roadmap();
    stage
        .toggle_phase(index)
        .ok_or_else(|| AppError::NotFound(format!("Phase {index} not found")))?;
    Ok(Json(render(stage)))
}

/// POST /api/v1/roadmap/raw/toggle
pub async fn handle_toggle_raw(
    State(state): State<AppState>,
) -> Result<Json<RoadmapView>, AppError> {
    let mut workflow = state.workflow.lock().await;
    let stage = workflow.enter_roadmap();
    stage
        .toggle_raw()
        .ok_or_else(|| AppError::NotFound("No roadmap has been fetched yet".to_string()))?;
    Ok(Json(render(stage)))
}

/// POST /api/v1/roadmap/complete
pub async fn handle_complete(State(state): State<AppState>) -> Result<Json<Completion>, AppError> {
    let mut workflow = state.workflow.lock().await;
    let completion = workflow.complete_roadmap().ok_or_else(|| {
        AppError::Validation("Fetch a roadmap before completing the flow".to_string())
    })?;
    Ok(Json(completion))
}

/// POST /api/v1/roles/roadmap
pub async fn handle_role_roadmap(
    State(state): State<AppState>,
    Json(request): Json<RoleRoadmapRequest>,
) -> Result<Json<RoleRoadmap>, AppError> {
    let role = request.role.trim();
    if role.is_empty() {
        return Err(AppError::Validation("role cannot be empty".to_string()));
    }

    let _pending = raise(&state.pending.role_roadmap)?;
    let roadmap = lookup(state.advisor.as_ref(), role).await?;
    Ok(Json(roadmap))
}
