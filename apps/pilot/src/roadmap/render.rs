//! Structured view of the roadmap stage. No markup is produced here; the presentation
//! layer maps each variant to its own control.

use serde::Serialize;

use crate::roadmap::model::{QuizItem, Resource, Topic};
use crate::roadmap::{RoadmapForm, RoadmapStage};

const NO_LINK_LABEL: &str = "(no link provided)";
const EMPTY_LIST_LABEL: &str = "(none)";

#[derive(Debug, Clone, Serialize)]
pub struct RoadmapView {
    pub form: RoadmapForm,
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub roadmap: Option<RoadmapBody>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RoadmapBody {
    pub career: String,
    pub score: i64,
    /// Set when the service attached raw model text because parsing failed upstream.
    pub debug_notice: bool,
    pub raw_toggle_available: bool,
    pub raw_visible: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_payload: Option<String>,
    pub phases: Vec<PhaseView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub empty_notice: Option<&'static str>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PhaseView {
    pub index: usize,
    pub title: String,
    pub open: bool,
    /// Only present while the phase is expanded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topics: Option<Vec<TopicView>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub empty_notice: Option<&'static str>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TopicView {
    pub title: String,
    pub videos: Vec<ResourceView>,
    pub books: Vec<ResourceView>,
    pub quiz: Vec<QuizView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quiz_notice: Option<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResourceView {
    Link { label: String, href: String },
    /// A resource without a link is plain text, never a hyperlink.
    Text { label: String },
    Placeholder { label: &'static str },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuizView {
    pub index: usize,
    pub prompt: String,
    pub control: QuizControl,
}

/// Input affordance for a display-only quiz item. Answers are never evaluated.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum QuizControl {
    RadioGroup { name: String, options: Vec<String> },
    TextInput { placeholder: &'static str },
    CodeEditor { placeholder: &'static str, rows: u8 },
}

pub fn render(stage: &RoadmapStage) -> RoadmapView {
    let roadmap = stage.fetch.as_ref().map(|fetch| {
        let phases: Vec<PhaseView> = fetch
            .result
            .phases
            .iter()
            .enumerate()
            .map(|(p_idx, phase)| {
                let open = stage.disclosure.is_open(p_idx);
                let topics = open.then(|| {
                    phase
                        .topics
                        .iter()
                        .enumerate()
                        .map(|(t_idx, topic)| render_topic(p_idx, t_idx, topic))
                        .collect::<Vec<_>>()
                });
                PhaseView {
                    index: p_idx,
                    title: phase
                        .title
                        .clone()
                        .unwrap_or_else(|| format!("Phase {}", p_idx + 1)),
                    open,
                    empty_notice: (open && phase.topics.is_empty())
                        .then_some("No topics provided in this phase."),
                    topics,
                }
            })
            .collect();

        RoadmapBody {
            career: fetch.career(),
            score: fetch.score(),
            debug_notice: fetch.raw_text.is_some(),
            raw_toggle_available: true,
            raw_visible: stage.raw_visible,
            raw_payload: stage.raw_visible.then(|| fetch.raw_payload.clone()),
            empty_notice: phases
                .is_empty()
                .then_some("No roadmap returned. Toggle raw JSON to debug."),
            phases,
        }
    });

    RoadmapView {
        form: stage.form.clone(),
        error: stage.error.clone(),
        roadmap,
    }
}

fn render_topic(p_idx: usize, t_idx: usize, topic: &Topic) -> TopicView {
    let quiz: Vec<QuizView> = topic
        .quiz
        .iter()
        .enumerate()
        .filter_map(|(q_idx, item)| {
            item.as_ref()
                .map(|item| render_quiz_item(p_idx, t_idx, q_idx, item))
        })
        .collect();

    TopicView {
        title: topic
            .title
            .clone()
            .unwrap_or_else(|| format!("Topic {}", t_idx + 1)),
        videos: render_resources(&topic.videos),
        books: render_resources(&topic.books),
        quiz_notice: topic.quiz.is_empty().then_some("No quiz provided."),
        quiz,
    }
}

fn render_resources(resources: &[Resource]) -> Vec<ResourceView> {
    if resources.is_empty() {
        return vec![ResourceView::Placeholder {
            label: EMPTY_LIST_LABEL,
        }];
    }
    resources.iter().map(render_resource).collect()
}

pub fn render_resource(resource: &Resource) -> ResourceView {
    match &resource.link {
        Some(link) => ResourceView::Link {
            label: resource.name.clone().unwrap_or_else(|| link.clone()),
            href: link.clone(),
        },
        None => ResourceView::Text {
            label: resource
                .name
                .clone()
                .unwrap_or_else(|| NO_LINK_LABEL.to_string()),
        },
    }
}

fn render_quiz_item(p_idx: usize, t_idx: usize, q_idx: usize, item: &QuizItem) -> QuizView {
    let (prompt, control) = match item {
        QuizItem::MultipleChoice { prompt, options } => (
            prompt,
            QuizControl::RadioGroup {
                name: format!("q-{p_idx}-{t_idx}-{q_idx}"),
                options: options.clone(),
            },
        ),
        QuizItem::FillIn { prompt } => (
            prompt,
            QuizControl::TextInput {
                placeholder: "Your answer",
            },
        ),
        QuizItem::Code { prompt } => (
            prompt,
            QuizControl::CodeEditor {
                placeholder: "Write code...",
                rows: 6,
            },
        ),
    };
    QuizView {
        index: q_idx,
        prompt: prompt.clone(),
        control,
    }
}
