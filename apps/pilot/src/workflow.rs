//! Workflow controller state for the career flow.
//!
//! Resume → recommendations → assessment → roadmap. Everything here is ephemeral and
//! lives for one process; durable startup progress is kept apart in `progress`.

use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::assessment::AssessmentSession;
use crate::ingest::ResumeDocument;
use crate::navigation::{NavigationBridge, Transition};
use crate::recommendation::CareerRecommendation;
use crate::roadmap::{Completion, RoadmapForm, RoadmapStage};

#[derive(Debug)]
pub struct WorkflowSession {
    pub id: Uuid,
    pub resume: Option<ResumeDocument>,
    pub recommendations: Vec<CareerRecommendation>,
    pub bridge: NavigationBridge,
    pub assessment: Option<AssessmentSession>,
    pub roadmap: Option<RoadmapStage>,
    pub last_completion: Option<Completion>,
}

impl Default for WorkflowSession {
    fn default() -> Self {
        Self {
            id: Uuid::new_v4(),
            resume: None,
            recommendations: Vec::new(),
            bridge: NavigationBridge::default(),
            assessment: None,
            roadmap: None,
            last_completion: None,
        }
    }
}

/// Short summary of where the session stands.
#[derive(Debug, Clone, Serialize)]
pub struct WorkflowSummary {
    pub session_id: Uuid,
    pub has_resume: bool,
    pub recommendation_count: usize,
    pub pending_transition: Option<Transition>,
    pub last_completion: Option<Completion>,
}

impl WorkflowSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// A new resume invalidates every downstream stage.
    pub fn set_resume(&mut self, resume: ResumeDocument) {
        self.resume = Some(resume);
        self.recommendations.clear();
        self.assessment = None;
        self.roadmap = None;
        self.bridge = NavigationBridge::default();
    }

    /// Picks a match and hands its title to the assessment stage.
    pub fn select_recommendation(&mut self, index: usize) -> Option<&CareerRecommendation> {
        let picked = self.recommendations.get(index)?;
        info!("Recommendation {index} selected: {}", picked.title);
        self.bridge.emit(Transition::Assessment {
            career: picked.title.clone(),
        });
        Some(picked)
    }

    /// Opens a new assessment session, consuming any career handed over.
    pub fn start_assessment(&mut self) -> &mut AssessmentSession {
        let career = self.bridge.take_assessment();
        self.assessment.insert(AssessmentSession::start(career))
    }

    /// Enters the roadmap stage. A pending handoff from the assessment replaces any
    /// stage already open; otherwise the open stage is reused or a blank one created.
    pub fn enter_roadmap(&mut self) -> &mut RoadmapStage {
        if let Some((career, score)) = self.bridge.take_roadmap() {
            info!("Roadmap stage seeded: career={career} score={score}");
            return self
                .roadmap
                .insert(RoadmapStage::new(RoadmapForm::seeded(career, score)));
        }
        self.roadmap.get_or_insert_with(RoadmapStage::default)
    }

    /// Records the completion and clears the career flow. The resume and its
    /// recommendations stay so another match can be explored.
    pub fn complete_roadmap(&mut self) -> Option<Completion> {
        let completion = self.roadmap.as_ref()?.complete()?;
        info!(
            "Career flow completed: career={} score={}",
            completion.career, completion.score
        );
        self.assessment = None;
        self.roadmap = None;
        self.bridge = NavigationBridge::default();
        self.last_completion = Some(completion.clone());
        Some(completion)
    }

    pub fn summary(&self) -> WorkflowSummary {
        WorkflowSummary {
            session_id: self.id,
            has_resume: self.resume.is_some(),
            recommendation_count: self.recommendations.len(),
            pending_transition: self.bridge.peek().cloned(),
            last_completion: self.last_completion.clone(),
        }
    }
}
