//! Assessment session state machine.
//!
//! Idle → Loading → Ready → InProgress → Finished, plus NoCareerSelected straight from
//! Idle when no career was handed over. Finished is terminal.

use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::advisor_client::ServiceError;
use crate::assessment::question::{AnswerResponse, Feedback, Question, QuestionKind};
use crate::assessment::AssessmentError;
use crate::navigation::{NavigationBridge, Transition};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AssessmentPhase {
    Idle,
    Loading,
    Ready,
    InProgress,
    Finished,
    NoCareerSelected,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnswerRecord {
    pub response: AnswerResponse,
    pub points_awarded: u32,
    pub feedback: Feedback,
}

/// Reply to an `answer` call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnswerOutcome {
    pub index: usize,
    pub points_awarded: u32,
    pub feedback: Feedback,
    pub running_score: u32,
    /// True when the question had already been answered and nothing changed.
    pub repeated: bool,
}

#[derive(Debug, Clone)]
struct QuestionSlot {
    question: Question,
    answer: Option<AnswerRecord>,
}

#[derive(Debug, Clone)]
pub struct AssessmentSession {
    id: Uuid,
    career: Option<String>,
    phase: AssessmentPhase,
    slots: Vec<QuestionSlot>,
    running_score: u32,
    load_error: Option<String>,
}

impl Default for AssessmentSession {
    fn default() -> Self {
        Self {
            id: Uuid::new_v4(),
            career: None,
            phase: AssessmentPhase::Idle,
            slots: Vec::new(),
            running_score: 0,
            load_error: None,
        }
    }
}

impl AssessmentSession {
    /// Opens a session for the handed-over career.
    /// Without one the session lands in `NoCareerSelected` and nothing is loaded.
    pub fn start(career: Option<String>) -> Self {
        let career = career.filter(|c| !c.trim().is_empty());
        let phase = if career.is_some() {
            AssessmentPhase::Loading
        } else {
            AssessmentPhase::NoCareerSelected
        };
        info!("Assessment session opened: phase={phase:?} career={career:?}");
        Self {
            career,
            phase,
            ..Self::default()
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn phase(&self) -> AssessmentPhase {
        self.phase
    }

    pub fn career(&self) -> Option<&str> {
        self.career.as_deref()
    }

    pub fn running_score(&self) -> u32 {
        self.running_score
    }

    pub fn question_count(&self) -> usize {
        self.slots.len()
    }

    /// Commits the result of `load_questions`. A failure still lands in `Ready`,
    /// with no questions and the error kept for display.
    pub fn loaded(&mut self, result: Result<Vec<Question>, ServiceError>) {
        if self.phase != AssessmentPhase::Loading {
            return;
        }
        match result {
            Ok(questions) => {
                info!("Assessment loaded with {} question(s)", questions.len());
                self.slots = questions
                    .into_iter()
                    .map(|question| QuestionSlot {
                        question,
                        answer: None,
                    })
                    .collect();
            }
            Err(e) => {
                warn!("Failed to load assessment: {e}");
                self.load_error = Some(format!("Failed to load assessment: {e}"));
                self.slots.clear();
            }
        }
        self.phase = AssessmentPhase::Ready;
    }

    /// Grades the response for question `index`. Each question is answered once:
    /// later calls return the first outcome with `repeated = true` and change nothing.
    pub fn answer(
        &mut self,
        index: usize,
        response: AnswerResponse,
    ) -> Result<AnswerOutcome, AssessmentError> {
        match self.phase {
            AssessmentPhase::Ready | AssessmentPhase::InProgress => {}
            AssessmentPhase::Finished => return Err(AssessmentError::AlreadyFinished),
            phase => return Err(AssessmentError::NotReady(phase)),
        }

        let slot = self
            .slots
            .get_mut(index)
            .ok_or(AssessmentError::QuestionNotFound(index))?;

        if let Some(previous) = &slot.answer {
            return Ok(AnswerOutcome {
                index,
                points_awarded: previous.points_awarded,
                feedback: previous.feedback.clone(),
                running_score: self.running_score,
                repeated: true,
            });
        }

        let grade = slot.question.grade(index, &response)?;
        slot.answer = Some(AnswerRecord {
            response,
            points_awarded: grade.points_awarded,
            feedback: grade.feedback.clone(),
        });
        self.running_score = self.running_score.saturating_add(grade.points_awarded);
        self.phase = AssessmentPhase::InProgress;

        Ok(AnswerOutcome {
            index,
            points_awarded: grade.points_awarded,
            feedback: grade.feedback,
            running_score: self.running_score,
            repeated: false,
        })
    }

    /// Finishes the session and hands `{score, career}` to the roadmap stage.
    /// Returns false (and does nothing) when already finished or nothing was loaded.
    pub fn finish(&mut self, bridge: &mut NavigationBridge) -> bool {
        if self.phase == AssessmentPhase::Finished || self.slots.is_empty() {
            return false;
        }
        let Some(career) = self.career.clone() else {
            return false;
        };
        self.phase = AssessmentPhase::Finished;
        info!(
            "Assessment finished: career={career} score={}",
            self.running_score
        );
        bridge.emit(Transition::Roadmap {
            career,
            score: self.running_score,
        });
        true
    }

    pub fn view(&self) -> AssessmentView {
        AssessmentView {
            session_id: self.id,
            phase: self.phase,
            career: self.career.clone(),
            running_score: self.running_score,
            max_score: self
                .slots
                .iter()
                .fold(0u32, |total, s| total.saturating_add(s.question.points)),
            can_finish: self.phase != AssessmentPhase::Finished && !self.slots.is_empty(),
            load_error: self.load_error.clone(),
            questions: self
                .slots
                .iter()
                .enumerate()
                .map(|(index, slot)| QuestionView::from_slot(index, slot))
                .collect(),
        }
    }
}

/// Session as shown to the user. Answer keys stay hidden until a question is locked.
#[derive(Debug, Clone, Serialize)]
pub struct AssessmentView {
    pub session_id: Uuid,
    pub phase: AssessmentPhase,
    pub career: Option<String>,
    pub running_score: u32,
    pub max_score: u32,
    pub can_finish: bool,
    pub load_error: Option<String>,
    pub questions: Vec<QuestionView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct QuestionView {
    pub index: usize,
    pub prompt: String,
    pub points: u32,
    #[serde(rename = "type")]
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    pub locked: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer: Option<AnswerRecord>,
}

impl QuestionView {
    fn from_slot(index: usize, slot: &QuestionSlot) -> Self {
        let (kind, options) = match &slot.question.kind {
            QuestionKind::MultipleChoice { options, .. } => ("mcq", Some(options.clone())),
            QuestionKind::FillIn { .. } => ("fill", None),
        };
        Self {
            index,
            prompt: slot.question.prompt.clone(),
            points: slot.question.points,
            kind,
            options,
            locked: slot.answer.is_some(),
            answer: slot.answer.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assessment::question::{fill, mcq};

    fn ready_session(questions: Vec<Question>) -> AssessmentSession {
        let mut session = AssessmentSession::start(Some("Backend Engineer".to_string()));
        session.loaded(Ok(questions));
        session
    }

    #[test]
    fn test_missing_career_goes_straight_to_no_career_selected() {
        let session = AssessmentSession::start(None);
        assert_eq!(session.phase(), AssessmentPhase::NoCareerSelected);
        let blank = AssessmentSession::start(Some("  ".to_string()));
        assert_eq!(blank.phase(), AssessmentPhase::NoCareerSelected);
    }

    #[test]
    fn test_load_failure_degrades_to_empty_ready() {
        let mut session = AssessmentSession::start(Some("QA".to_string()));
        session.loaded(Err(ServiceError::Malformed("boom".to_string())));
        assert_eq!(session.phase(), AssessmentPhase::Ready);
        assert_eq!(session.question_count(), 0);
        assert!(session.view().load_error.unwrap().contains("boom"));
    }

    #[test]
    fn test_two_mcq_one_right_one_wrong_scores_five() {
        let mut session = ready_session(vec![mcq(5, &["a", "b"], 0), mcq(5, &["a", "b"], 0)]);
        session.answer(0, AnswerResponse::Choice(0)).unwrap();
        session.answer(1, AnswerResponse::Choice(1)).unwrap();
        assert_eq!(session.running_score(), 5);

        let mut bridge = NavigationBridge::default();
        assert!(session.finish(&mut bridge));
        assert_eq!(session.phase(), AssessmentPhase::Finished);
        assert!(!session.finish(&mut bridge));
        assert_eq!(
            bridge.take_roadmap(),
            Some(("Backend Engineer".to_string(), 5))
        );
    }

    #[test]
    fn test_second_answer_on_same_index_is_noop() {
        let mut session = ready_session(vec![mcq(3, &["a", "b"], 1)]);
        let first = session.answer(0, AnswerResponse::Choice(0)).unwrap();
        let second = session.answer(0, AnswerResponse::Choice(1)).unwrap();

        assert_eq!(first.points_awarded, 0);
        assert_eq!(second.points_awarded, 0);
        assert_eq!(second.feedback, first.feedback);
        assert!(second.repeated);
        assert_eq!(session.running_score(), 0);
        assert!(session.view().questions[0].locked);
    }

    #[test]
    fn test_score_is_sum_of_correct_points_and_never_decreases() {
        let mut session = ready_session(vec![
            mcq(2, &["a", "b"], 0),
            fill(4, "Ownership"),
            mcq(1, &["a", "b", "c"], 2),
            fill(3, "lifetimes"),
        ]);
        let responses = [
            AnswerResponse::Choice(0),
            AnswerResponse::Text("ownership".to_string()),
            AnswerResponse::Choice(0),
            AnswerResponse::Text("traits".to_string()),
        ];
        let mut last = 0;
        for (i, response) in responses.into_iter().enumerate() {
            let outcome = session.answer(i, response).unwrap();
            assert!(outcome.running_score >= last);
            last = outcome.running_score;
        }
        assert_eq!(session.running_score(), 6);
    }

    #[test]
    fn test_huge_point_values_saturate() {
        let mut session = ready_session(vec![fill(3_000_000_000, "a"), fill(3_000_000_000, "b")]);
        assert_eq!(session.view().max_score, u32::MAX);

        let first = session.answer(0, AnswerResponse::Text("a".to_string())).unwrap();
        let second = session.answer(1, AnswerResponse::Text("b".to_string())).unwrap();
        assert_eq!(first.running_score, 3_000_000_000);
        assert_eq!(second.running_score, u32::MAX);
        assert!(second.running_score >= first.running_score);
    }

    #[test]
    fn test_rejected_response_does_not_lock_question() {
        let mut session = ready_session(vec![fill(2, "x")]);
        assert!(session.answer(0, AnswerResponse::Choice(0)).is_err());
        let outcome = session.answer(0, AnswerResponse::Text("x".to_string())).unwrap();
        assert_eq!(outcome.points_awarded, 2);
    }

    #[test]
    fn test_finish_with_zero_questions_is_noop() {
        let mut session = ready_session(vec![]);
        let mut bridge = NavigationBridge::default();
        assert!(!session.finish(&mut bridge));
        assert_eq!(session.phase(), AssessmentPhase::Ready);
        assert!(bridge.peek().is_none());
    }

    #[test]
    fn test_finish_allowed_before_any_answer() {
        let mut session = ready_session(vec![mcq(1, &["a"], 0)]);
        let mut bridge = NavigationBridge::default();
        assert!(session.finish(&mut bridge));
        assert_eq!(
            bridge.take_roadmap(),
            Some(("Backend Engineer".to_string(), 0))
        );
    }

    #[test]
    fn test_answer_after_finish_rejected() {
        let mut session = ready_session(vec![mcq(1, &["a"], 0)]);
        session.finish(&mut NavigationBridge::default());
        assert!(matches!(
            session.answer(0, AnswerResponse::Choice(0)),
            Err(AssessmentError::AlreadyFinished)
        ));
    }

    #[test]
    fn test_answer_while_loading_rejected() {
        let mut session = AssessmentSession::start(Some("QA".to_string()));
        assert!(matches!(
            session.answer(0, AnswerResponse::Choice(0)),
            Err(AssessmentError::NotReady(AssessmentPhase::Loading))
        ));
    }

    #[test]
    fn test_unknown_index_not_found() {
        let mut session = ready_session(vec![mcq(1, &["a"], 0)]);
        assert!(matches!(
            session.answer(9, AnswerResponse::Choice(0)),
            Err(AssessmentError::QuestionNotFound(9))
        ));
    }

    #[test]
    fn test_view_hides_answer_keys_until_locked() {
        let session = ready_session(vec![mcq(1, &["a", "b"], 1)]);
        let json = serde_json::to_value(session.view()).unwrap();
        let question = &json["questions"][0];
        assert_eq!(question["type"], "mcq");
        assert!(question.get("answer").is_none());
        assert!(question.get("correct_index").is_none());
        assert_eq!(json["max_score"], 1);
    }
}
