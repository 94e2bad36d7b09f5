use axum::{extract::State, Json};

use crate::errors::AppError;
use crate::models::user::{load_user, save_user, sign_out, UserProfile};
use crate::state::AppState;
use crate::workflow::WorkflowSummary;

/// GET /api/v1/user
pub async fn handle_get_user(State(state): State<AppState>) -> Result<Json<UserProfile>, AppError> {
    Ok(Json(load_user(state.progress.store().as_ref())?))
}

/// PUT /api/v1/user
pub async fn handle_put_user(
    State(state): State<AppState>,
    Json(profile): Json<UserProfile>,
) -> Result<Json<UserProfile>, AppError> {
    let name = profile.name.trim();
    if name.is_empty() {
        return Err(AppError::Validation("name cannot be empty".to_string()));
    }
    let profile = UserProfile {
        name: name.to_string(),
    };
    save_user(state.progress.store().as_ref(), &profile)?;
    Ok(Json(profile))
}

/// DELETE /api/v1/user
pub async fn handle_sign_out(State(state): State<AppState>) -> Result<Json<UserProfile>, AppError> {
    sign_out(state.progress.store().as_ref())?;
    Ok(Json(UserProfile::default()))
}

/// GET /api/v1/workflow
pub async fn handle_workflow_summary(State(state): State<AppState>) -> Json<WorkflowSummary> {
    Json(state.workflow.lock().await.summary())
}
