//! Recommendation client: resume text in, server-ranked career matches out.

pub mod handlers;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;

use crate::advisor_client::{AdvisorService, Endpoint, ServiceError};

/// A single career match. List order is the server's and is never re-sorted here.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CareerRecommendation {
    pub title: String,
    /// Match score, 0 to 100.
    pub rank: u32,
    pub why_fit: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RecommendPayload {
    recommendations: Vec<RawRecommendation>,
}

#[derive(Debug, Deserialize)]
struct RawRecommendation {
    title: Option<String>,
    rank: Option<f64>,
    #[serde(default)]
    why_fit: Option<Vec<Value>>,
}

/// Submits resume text and returns the ranked matches in server order.
pub async fn submit(
    advisor: &dyn AdvisorService,
    resume_text: &str,
) -> Result<Vec<CareerRecommendation>, ServiceError> {
    let reply = advisor
        .post(Endpoint::Recommend, json!({ "resume": resume_text }))
        .await?;
    let recommendations = decode_recommendations(reply.into_success_json()?)?;
    info!("Received {} career recommendation(s)", recommendations.len());
    Ok(recommendations)
}

fn decode_recommendations(body: Value) -> Result<Vec<CareerRecommendation>, ServiceError> {
    let payload: RecommendPayload = serde_json::from_value(body)
        .map_err(|e| ServiceError::Malformed(format!("recommendations: {e}")))?;

    payload
        .recommendations
        .into_iter()
        .enumerate()
        .map(|(idx, raw)| {
            let title = raw
                .title
                .filter(|t| !t.trim().is_empty())
                .ok_or_else(|| {
                    ServiceError::Malformed(format!("recommendation {idx} has no title"))
                })?;
            Ok(CareerRecommendation {
                title,
                rank: raw.rank.unwrap_or(0.0).clamp(0.0, 100.0).round() as u32,
                why_fit: raw
                    .why_fit
                    .unwrap_or_default()
                    .into_iter()
                    .filter_map(|reason| reason.as_str().map(String::from))
                    .collect(),
            })
        })
        .collect()
}
