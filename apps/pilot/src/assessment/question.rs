//! Assessment questions: wire decoding and grading.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::advisor_client::ServiceError;
use crate::assessment::AssessmentError;

const DEFAULT_POINTS: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum QuestionKind {
    MultipleChoice {
        options: Vec<String>,
        correct_index: usize,
    },
    FillIn {
        correct_text: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Question {
    pub prompt: String,
    pub points: u32,
    pub kind: QuestionKind,
}

/// A user's response to one question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerResponse {
    Choice(usize),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum Feedback {
    Correct,
    Incorrect { expected: String },
}

/// Result of grading a single response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Grade {
    pub points_awarded: u32,
    pub feedback: Feedback,
}

impl Question {
    /// Grades a response. Mismatched response kinds are rejected rather than marked wrong.
    pub fn grade(&self, index: usize, response: &AnswerResponse) -> Result<Grade, AssessmentError> {
        let (correct, expected) = match (&self.kind, response) {
            (
                QuestionKind::MultipleChoice {
                    options,
                    correct_index,
                },
                AnswerResponse::Choice(choice),
            ) => {
                if *choice >= options.len() {
                    return Err(AssessmentError::ChoiceOutOfRange {
                        index,
                        choice: *choice,
                    });
                }
                (choice == correct_index, options[*correct_index].clone())
            }
            (QuestionKind::FillIn { correct_text }, AnswerResponse::Text(text)) => (
                text.trim().to_lowercase() == correct_text.trim().to_lowercase(),
                correct_text.clone(),
            ),
            _ => return Err(AssessmentError::ResponseMismatch(index)),
        };

        Ok(if correct {
            Grade {
                points_awarded: self.points,
                feedback: Feedback::Correct,
            }
        } else {
            Grade {
                points_awarded: 0,
                feedback: Feedback::Incorrect { expected },
            }
        })
    }
}

/// Decodes `{questions: [...]}` from the assessment service.
/// Items with an unknown type or an unusable answer key are skipped.
pub fn decode_questions(body: &Value) -> Result<Vec<Question>, ServiceError> {
    let items = body
        .get("questions")
        .and_then(|q| q.as_array())
        .ok_or_else(|| ServiceError::Malformed("assessment payload has no questions".to_string()))?;

    Ok(items
        .iter()
        .enumerate()
        .filter_map(|(idx, item)| {
            let question = decode_question(item);
            if question.is_none() {
                warn!("Skipping unusable assessment question {idx}");
            }
            question
        })
        .collect())
}

fn decode_question(item: &Value) -> Option<Question> {
    let prompt = item.get("question")?.as_str()?.to_string();
    let points = item
        .get("points")
        .and_then(|p| p.as_u64())
        .map(|p| u32::try_from(p).unwrap_or(u32::MAX))
        .unwrap_or(DEFAULT_POINTS);
    let answer = item.get("answer")?;

    let kind = match item.get("type")?.as_str()? {
        "mcq" => {
            let options: Vec<String> = item
                .get("options")?
                .as_array()?
                .iter()
                .map(value_text)
                .collect();
            let correct_index = match answer {
                Value::Number(n) => n.as_u64()? as usize,
                // Some generations name the option instead of its index.
                Value::String(s) => options.iter().position(|o| o == s)?,
                _ => return None,
            };
            if correct_index >= options.len() {
                return None;
            }
            QuestionKind::MultipleChoice {
                options,
                correct_index,
            }
        }
        "fill" => QuestionKind::FillIn {
            correct_text: value_text(answer),
        },
        _ => return None,
    };

    Some(Question {
        prompt,
        points,
        kind,
    })
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
pub fn mcq(points: u32, options: &[&str], correct_index: usize) -> Question {
    Question {
        prompt: "Pick one".to_string(),
        points,
        kind: QuestionKind::MultipleChoice {
            options: options.iter().map(|s| s.to_string()).collect(),
            correct_index,
        },
    }
}

#[cfg(test)]
pub fn fill(points: u32, correct_text: &str) -> Question {
    Question {
        prompt: "Fill the blank".to_string(),
        points,
        kind: QuestionKind::FillIn {
            correct_text: correct_text.to_string(),
        },
    }
}
