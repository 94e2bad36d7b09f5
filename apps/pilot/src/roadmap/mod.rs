// Learning roadmap stage: request, defensive decoding, disclosure state and rendering.
// A failed upstream generation is displayed, not raised.

pub mod disclosure;
pub mod handlers;
pub mod model;
pub mod render;
pub mod role;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::advisor_client::{AdvisorService, Endpoint, ReplyBody, ServiceError};
use disclosure::Disclosure;
use model::RoadmapResult;

pub const DEFAULT_CAREER: &str = "Software Engineer";
pub const DEFAULT_LANGUAGE: &str = "Python";

/// Editable inputs of the roadmap stage, seeded from the assessment handoff.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoadmapForm {
    pub score: Option<u32>,
    pub career: Option<String>,
    pub language: Option<String>,
}

/// Values actually sent upstream after defaults are applied.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoadmapRequest {
    pub score: u32,
    pub career: String,
    pub language: String,
}

impl RoadmapForm {
    pub fn seeded(career: String, score: u32) -> Self {
        Self {
            score: Some(score),
            career: Some(career),
            language: None,
        }
    }

    /// Overwrites the fields present in `update`; blank strings clear a field.
    pub fn apply(&mut self, update: RoadmapForm) {
        if update.score.is_some() {
            self.score = update.score;
        }
        if let Some(career) = update.career {
            self.career = Some(career).filter(|c| !c.trim().is_empty());
        }
        if let Some(language) = update.language {
            self.language = Some(language).filter(|l| !l.trim().is_empty());
        }
    }

    pub fn request(&self) -> RoadmapRequest {
        fn or_default(value: &Option<String>, default: &str) -> String {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .unwrap_or(default)
                .to_string()
        }
        RoadmapRequest {
            score: self.score.unwrap_or(0),
            career: or_default(&self.career, DEFAULT_CAREER),
            language: or_default(&self.language, DEFAULT_LANGUAGE),
        }
    }
}

/// Whatever the evaluate endpoint returned, successful or not.
#[derive(Debug, Clone, Serialize)]
pub struct RoadmapFetch {
    pub status: u16,
    pub requested: RoadmapRequest,
    pub result: RoadmapResult,
    /// Error message from a non-2xx reply.
    pub error: Option<String>,
    /// Raw model text the service attached when it could not parse its own output.
    pub raw_text: Option<String>,
    /// The full reply body, pretty-printed, for the debug toggle.
    pub raw_payload: String,
    pub fetched_at: DateTime<Utc>,
}

impl RoadmapFetch {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Career the service answered for, else the one that was requested.
    pub fn career(&self) -> String {
        self.result
            .career
            .clone()
            .unwrap_or_else(|| self.requested.career.clone())
    }

    /// Score the service echoed back, else the one that was requested.
    pub fn score(&self) -> i64 {
        self.result
            .score
            .unwrap_or(i64::from(self.requested.score))
    }
}

/// Calls the evaluate endpoint. Only a transport failure is an `Err`;
/// any HTTP reply, including non-2xx, comes back as a displayable `RoadmapFetch`.
pub async fn fetch(
    advisor: &dyn AdvisorService,
    request: RoadmapRequest,
) -> Result<RoadmapFetch, ServiceError> {
    let body = json!({
        "score": request.score,
        "career": request.career,
        "language": request.language,
    });
    let reply = advisor.post(Endpoint::Evaluate, body).await?;
    let ok = reply.is_success();
    let status = reply.status;
    let error = (!ok).then(|| reply.error_message());

    let (result, raw_text, raw_payload) = match &reply.body {
        ReplyBody::Json(value) => (
            RoadmapResult::from_value(value),
            value
                .get("raw_text")
                .and_then(|t| t.as_str())
                .map(String::from),
            serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string()),
        ),
        ReplyBody::Text(text) => (RoadmapResult::default(), Some(text.clone()), text.clone()),
    };

    if ok {
        info!(
            "Roadmap fetched: career={} phases={}",
            request.career,
            result.phases.len()
        );
    } else {
        warn!("Roadmap request returned {status}; keeping payload for display");
    }

    Ok(RoadmapFetch {
        status,
        error: error.map(|e| diagnostic_message(status, &reply.body, e)),
        requested: request,
        result,
        raw_text,
        raw_payload,
        fetched_at: Utc::now(),
    })
}

fn diagnostic_message(status: u16, body: &ReplyBody, message: String) -> String {
    let has_error_field = matches!(body, ReplyBody::Json(Value::Object(map)) if map.contains_key("error"));
    if has_error_field {
        format!("{message} - check raw_text in debug output")
    } else {
        format!("Server returned {status}")
    }
}

/// Recorded when the user concludes the career flow.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Completion {
    pub career: String,
    pub score: i64,
    pub completed_at: DateTime<Utc>,
}

/// Roadmap stage state owned by the workflow session.
#[derive(Debug, Clone, Default)]
pub struct RoadmapStage {
    pub form: RoadmapForm,
    pub fetch: Option<RoadmapFetch>,
    pub disclosure: Disclosure,
    pub raw_visible: bool,
    pub error: Option<String>,
}

impl RoadmapStage {
    pub fn new(form: RoadmapForm) -> Self {
        Self {
            form,
            ..Self::default()
        }
    }

    /// Clears the previous result before a new request goes out.
    pub fn begin_fetch(&mut self) -> RoadmapRequest {
        self.fetch = None;
        self.error = None;
        self.raw_visible = false;
        self.disclosure.collapse_all();
        self.form.request()
    }

    pub fn commit_fetch(&mut self, outcome: Result<RoadmapFetch, ServiceError>) {
        match outcome {
            Ok(fetch) => {
                if !fetch.is_success() {
                    self.error = fetch.error.clone();
                    self.raw_visible = true;
                }
                self.fetch = Some(fetch);
            }
            Err(e) => {
                self.error = Some(format!("Network or parsing error: {e}"));
            }
        }
    }

    /// Flips one phase. `None` when there is no such phase to toggle.
    pub fn toggle_phase(&mut self, index: usize) -> Option<bool> {
        let phases = self.fetch.as_ref()?.result.phases.len();
        (index < phases).then(|| self.disclosure.toggle(index))
    }

    /// Flips raw payload visibility. `None` when nothing was fetched yet.
    pub fn toggle_raw(&mut self) -> Option<bool> {
        self.fetch.as_ref()?;
        self.raw_visible = !self.raw_visible;
        Some(self.raw_visible)
    }

    /// Concludes the flow for the roadmap currently on display.
    pub fn complete(&self) -> Option<Completion> {
        let fetch = self.fetch.as_ref()?;
        Some(Completion {
            career: fetch.career(),
            score: fetch.score(),
            completed_at: Utc::now(),
        })
    }
}
