use std::collections::BTreeSet;

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;

use crate::errors::AppError;
use crate::progress::guidance::{request_guidance, GuidanceResult};
use crate::progress::{ProgressRecord, ProjectDetails, Stage, StartupStep, STARTUP_STEPS};
use crate::state::{raise, AppState};

#[derive(Debug, Serialize)]
pub struct ProgressResponse {
    pub completed: BTreeSet<u8>,
    pub completed_count: usize,
    pub stage: Stage,
    pub steps: &'static [StartupStep],
    pub project: ProjectDetails,
}

impl From<ProgressRecord> for ProgressResponse {
    fn from(record: ProgressRecord) -> Self {
        Self {
            completed_count: record.completed.len(),
            stage: record.stage(),
            completed: record.completed,
            steps: &STARTUP_STEPS,
            project: record.project,
        }
    }
}

/// GET /api/v1/progress
pub async fn handle_get_progress(
    State(state): State<AppState>,
) -> Result<Json<ProgressResponse>, AppError> {
    Ok(Json(state.progress.load()?.into()))
}

/// POST /api/v1/progress/steps/:id/toggle
pub async fn handle_toggle_step(
    State(state): State<AppState>,
    Path(id): Path<u8>,
) -> Result<Json<ProgressResponse>, AppError> {
    state.progress.toggle_step(id)?;
    Ok(Json(state.progress.load()?.into()))
}

/// PUT /api/v1/progress/project
pub async fn handle_update_project(
    State(state): State<AppState>,
    Json(project): Json<ProjectDetails>,
) -> Result<Json<ProgressResponse>, AppError> {
    state.progress.save_project(&project)?;
    Ok(Json(state.progress.load()?.into()))
}

/// POST /api/v1/progress/guidance
///
/// Requests guidance for the saved project details and checklist. Project name and
/// description must be filled in first; otherwise nothing is sent.
pub async fn handle_guidance(
    State(state): State<AppState>,
) -> Result<Json<GuidanceResult>, AppError> {
    let _pending = raise(&state.pending.guidance)?;
    let record = state.progress.load()?;
    let result = request_guidance(
        state.advisor.as_ref(),
        &record.project,
        &record.completed,
        record.stage(),
    )
    .await?;
    Ok(Json(result))
}
