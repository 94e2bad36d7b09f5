use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use tracing::debug;

use crate::assessment::{load_questions, AnswerOutcome, AnswerResponse, AssessmentView};
use crate::errors::AppError;
use crate::navigation::Transition;
use crate::state::{raise, AppState};

#[derive(Debug, Serialize)]
pub struct FinishResponse {
    /// False when the call was a no-op.
    pub finished: bool,
    pub transition: Option<Transition>,
    pub assessment: AssessmentView,
}

fn no_session() -> AppError {
    AppError::NotFound("No assessment session has been started".to_string())
}

/// POST /api/v1/assessment
///
/// Opens a session for the career handed over by the recommendation stage and loads
/// its questions. Without a handed-over career no request is made.
pub async fn handle_start(
    State(state): State<AppState>,
) -> Result<Json<AssessmentView>, AppError> {
    let _pending = raise(&state.pending.assessment)?;

    let (session_id, career) = {
        let mut workflow = state.workflow.lock().await;
        let session = workflow.start_assessment();
        match session.career() {
            Some(career) => (session.id(), career.to_string()),
            None => return Ok(Json(session.view())),
        }
    };

    let result = load_questions(state.advisor.as_ref(), &career).await;

    let mut workflow = state.workflow.lock().await;
    let session = workflow
        .assessment
        .as_mut()
        .filter(|s| s.id() == session_id)
        .ok_or_else(|| AppError::Validation("Assessment was reset while loading".to_string()))?;
    session.loaded(result);
    debug!(
        "Assessment {} is {:?} with {} question(s)",
        session.id(),
        session.phase(),
        session.question_count()
    );
    Ok(Json(session.view()))
}

/// GET /api/v1/assessment
pub async fn handle_get(State(state): State<AppState>) -> Result<Json<AssessmentView>, AppError> {
    let workflow = state.workflow.lock().await;
    let session = workflow.assessment.as_ref().ok_or_else(no_session)?;
    Ok(Json(session.view()))
}

/// POST /api/v1/assessment/questions/:index/answer
pub async fn handle_answer(
    State(state): State<AppState>,
    Path(index): Path<usize>,
    Json(response): Json<AnswerResponse>,
) -> Result<Json<AnswerOutcome>, AppError> {
    let mut workflow = state.workflow.lock().await;
    let session = workflow.assessment.as_mut().ok_or_else(no_session)?;
    let outcome = session.answer(index, response)?;
    debug!(
        "Question {index} answered (repeated: {}); score {}",
        outcome.repeated,
        session.running_score()
    );
    Ok(Json(outcome))
}

/// POST /api/v1/assessment/finish
///
/// Hands `{score, career}` to the roadmap stage. Repeated calls change nothing.
pub async fn handle_finish(
    State(state): State<AppState>,
) -> Result<Json<FinishResponse>, AppError> {
    let mut guard = state.workflow.lock().await;
    let workflow = &mut *guard;
    let session = workflow.assessment.as_mut().ok_or_else(no_session)?;

    let finished = session.finish(&mut workflow.bridge);
    let transition = if finished {
        workflow.bridge.peek().cloned()
    } else {
        None
    };
    Ok(Json(FinishResponse {
        finished,
        transition,
        assessment: session.view(),
    }))
}
