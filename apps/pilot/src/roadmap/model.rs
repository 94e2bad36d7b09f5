//! Roadmap payload model, decoded defensively.
//!
//! Every nested array is optional on the wire; an absent or non-array value decodes as
//! empty and never fails the whole payload.

use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RoadmapResult {
    pub career: Option<String>,
    pub score: Option<i64>,
    pub language: Option<String>,
    pub phases: Vec<Phase>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Phase {
    pub title: Option<String>,
    pub topics: Vec<Topic>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Topic {
    pub title: Option<String>,
    pub videos: Vec<Resource>,
    pub books: Vec<Resource>,
    /// Position is kept so render names stay stable; `None` marks an unrenderable item.
    pub quiz: Vec<Option<QuizItem>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Resource {
    pub name: Option<String>,
    pub link: Option<String>,
}

/// Quiz items embedded in a topic. Display-only: answer keys are not kept.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum QuizItem {
    MultipleChoice { prompt: String, options: Vec<String> },
    FillIn { prompt: String },
    Code { prompt: String },
}

impl RoadmapResult {
    pub fn from_value(value: &Value) -> Self {
        Self {
            career: non_empty_str(value.get("career")),
            score: value.get("score").and_then(score_value),
            language: non_empty_str(value.get("language")),
            phases: array(value.get("roadmap")).iter().map(Phase::from_value).collect(),
        }
    }
}

impl Phase {
    fn from_value(value: &Value) -> Self {
        Self {
            title: non_empty_str(value.get("phase")),
            topics: array(value.get("topics")).iter().map(Topic::from_value).collect(),
        }
    }
}

impl Topic {
    fn from_value(value: &Value) -> Self {
        Self {
            title: non_empty_str(value.get("title")),
            videos: array(value.get("video_resources"))
                .iter()
                .map(Resource::from_value)
                .collect(),
            books: array(value.get("book_resources"))
                .iter()
                .map(Resource::from_value)
                .collect(),
            quiz: array(value.get("quiz")).iter().map(QuizItem::from_value).collect(),
        }
    }
}

impl Resource {
    fn from_value(value: &Value) -> Self {
        Self {
            name: non_empty_str(value.get("name")),
            link: non_empty_str(value.get("link")),
        }
    }
}

impl QuizItem {
    fn from_value(value: &Value) -> Option<Self> {
        let prompt = value
            .get("question")
            .and_then(|q| q.as_str())
            .unwrap_or_default()
            .to_string();
        match value.get("type")?.as_str()? {
            "mcq" => Some(QuizItem::MultipleChoice {
                prompt,
                options: array(value.get("options"))
                    .iter()
                    .map(|o| match o {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                    .collect(),
            }),
            "fill" => Some(QuizItem::FillIn { prompt }),
            "code" => Some(QuizItem::Code { prompt }),
            _ => None,
        }
    }
}

fn array(value: Option<&Value>) -> &[Value] {
    value
        .and_then(|v| v.as_array())
        .map(|a| a.as_slice())
        .unwrap_or_default()
}

fn non_empty_str(value: Option<&Value>) -> Option<String> {
    value
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
}

fn score_value(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.round() as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
