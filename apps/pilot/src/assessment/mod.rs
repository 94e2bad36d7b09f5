// Adaptive skill assessment: question loading, grading, and the session state machine.

pub mod engine;
pub mod handlers;
pub mod question;

use serde_json::json;
use thiserror::Error;

use crate::advisor_client::{AdvisorService, Endpoint, ServiceError};
use engine::AssessmentPhase;
use question::{decode_questions, Question};

pub use engine::{AnswerOutcome, AssessmentSession, AssessmentView};
pub use question::AnswerResponse;

#[derive(Debug, Error)]
pub enum AssessmentError {
    #[error("assessment is not accepting answers (phase: {0:?})")]
    NotReady(AssessmentPhase),

    #[error("assessment already finished")]
    AlreadyFinished,

    #[error("question {0} not found")]
    QuestionNotFound(usize),

    #[error("response type does not match question {0}")]
    ResponseMismatch(usize),

    #[error("option {choice} does not exist on question {index}")]
    ChoiceOutOfRange { index: usize, choice: usize },
}

/// Requests the question set for `career` from the assessment service.
pub async fn load_questions(
    advisor: &dyn AdvisorService,
    career: &str,
) -> Result<Vec<Question>, ServiceError> {
    let reply = advisor
        .post(Endpoint::Assessment, json!({ "career": career }))
        .await?;
    decode_questions(&reply.into_success_json()?)
}
