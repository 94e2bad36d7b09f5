//! Navigation bridge: carries per-transition context from one stage to the next.
//!
//! A transition is emitted by the stage being left and consumed exactly once by the
//! stage being entered. Nothing here outlives the workflow session.

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Context handed from one stage to the next.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "to", rename_all = "snake_case")]
pub enum Transition {
    /// A recommendation was picked; the assessment stage needs the career.
    Assessment { career: String },
    /// The assessment finished; the roadmap stage needs score and career.
    Roadmap { career: String, score: u32 },
}

#[derive(Debug, Default, Clone, Serialize)]
pub struct NavigationBridge {
    pending: Option<Transition>,
}

impl NavigationBridge {
    /// Replaces any unconsumed transition.
    pub fn emit(&mut self, transition: Transition) {
        debug!("Navigation emit: {transition:?}");
        self.pending = Some(transition);
    }

    pub fn peek(&self) -> Option<&Transition> {
        self.pending.as_ref()
    }

    /// Consumes the career handed to the assessment stage, if that is what is pending.
    pub fn take_assessment(&mut self) -> Option<String> {
        match self.pending.take() {
            Some(Transition::Assessment { career }) => Some(career),
            other => {
                self.pending = other;
                None
            }
        }
    }

    /// Consumes the score and career handed to the roadmap stage.
    pub fn take_roadmap(&mut self) -> Option<(String, u32)> {
        match self.pending.take() {
            Some(Transition::Roadmap { career, score }) => Some((career, score)),
            other => {
                self.pending = other;
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assessment_context_consumed_once() {
        let mut bridge = NavigationBridge::default();
        bridge.emit(Transition::Assessment {
            career: "Data Scientist".to_string(),
        });
        assert_eq!(bridge.take_assessment().as_deref(), Some("Data Scientist"));
        assert_eq!(bridge.take_assessment(), None);
    }

    #[test]
    fn test_wrong_stage_does_not_consume() {
        let mut bridge = NavigationBridge::default();
        bridge.emit(Transition::Roadmap {
            career: "DevOps Engineer".to_string(),
            score: 7,
        });
        assert_eq!(bridge.take_assessment(), None);
        assert_eq!(
            bridge.take_roadmap(),
            Some(("DevOps Engineer".to_string(), 7))
        );
        assert!(bridge.peek().is_none());
    }

    #[test]
    fn test_later_emit_replaces_earlier() {
        let mut bridge = NavigationBridge::default();
        bridge.emit(Transition::Assessment {
            career: "A".to_string(),
        });
        bridge.emit(Transition::Assessment {
            career: "B".to_string(),
        });
        assert_eq!(bridge.take_assessment().as_deref(), Some("B"));
    }

    #[test]
    fn test_transition_serializes_with_stage_tag() {
        let json = serde_json::to_value(Transition::Roadmap {
            career: "QA".to_string(),
            score: 3,
        })
        .unwrap();
        assert_eq!(json["to"], "roadmap");
        assert_eq!(json["score"], 3);
    }
}
