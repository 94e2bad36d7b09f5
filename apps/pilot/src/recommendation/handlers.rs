use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use tracing::warn;

use crate::errors::AppError;
use crate::navigation::Transition;
use crate::recommendation::{submit, CareerRecommendation};
use crate::state::{raise, AppState};

#[derive(Debug, Serialize)]
pub struct RecommendationsResponse {
    pub recommendations: Vec<CareerRecommendation>,
}

#[derive(Debug, Serialize)]
pub struct SelectionResponse {
    pub selected: CareerRecommendation,
    pub transition: Transition,
}

/// POST /api/v1/recommendations
///
/// Sends the stored resume text for matching. Matches are returned in server order.
pub async fn handle_recommend(
    State(state): State<AppState>,
) -> Result<Json<RecommendationsResponse>, AppError> {
    let _pending = raise(&state.pending.recommend)?;

    let (resume_id, resume_text) = {
        let workflow = state.workflow.lock().await;
        let resume = workflow
            .resume
            .as_ref()
            .ok_or_else(|| AppError::Validation("Upload a resume first".to_string()))?;
        (resume.id, resume.text.clone())
    };

    let recommendations = submit(state.advisor.as_ref(), &resume_text).await?;

    let mut workflow = state.workflow.lock().await;
    if workflow.resume.as_ref().map(|r| r.id) == Some(resume_id) {
        workflow.recommendations = recommendations.clone();
    } else {
        warn!("Resume replaced while recommendations were in flight; discarding them");
    }

    Ok(Json(RecommendationsResponse { recommendations }))
}

/// POST /api/v1/recommendations/:index/select
pub async fn handle_select(
    State(state): State<AppState>,
    Path(index): Path<usize>,
) -> Result<Json<SelectionResponse>, AppError> {
    let mut workflow = state.workflow.lock().await;
    let selected = workflow
        .select_recommendation(index)
        .cloned()
        .ok_or_else(|| AppError::NotFound(format!("Recommendation {index} not found")))?;

    Ok(Json(SelectionResponse {
        transition: Transition::Assessment {
            career: selected.title.clone(),
        },
        selected,
    }))
}
