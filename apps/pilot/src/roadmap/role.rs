//! Role roadmap lookup: skills and staged learning path for a named role.
//!
//! The service returns `{result}` where `result` is itself JSON encoded as a string,
//! often wrapped in a code fence.

use serde::Serialize;
use serde_json::{json, Value};
use tracing::warn;

use crate::advisor_client::{strip_code_fences, AdvisorService, Endpoint, ServiceError};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RoleRoadmap {
    pub role: String,
    pub technical_skills: Vec<String>,
    pub soft_skills: Vec<String>,
    pub stages: Vec<RoleStage>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoleStage {
    pub stage: String,
    pub skills: Vec<String>,
}

pub async fn lookup(advisor: &dyn AdvisorService, role: &str) -> Result<RoleRoadmap, ServiceError> {
    let reply = advisor
        .post(Endpoint::RoleRoadmap, json!({ "role": role }))
        .await?;
    let body = reply.into_success_json()?;
    let encoded = body
        .get("result")
        .and_then(|r| r.as_str())
        .ok_or_else(|| ServiceError::Malformed("role roadmap has no result".to_string()))?;
    decode_role_roadmap(role, encoded)
}

fn decode_role_roadmap(role: &str, encoded: &str) -> Result<RoleRoadmap, ServiceError> {
    let value: Value = serde_json::from_str(strip_code_fences(encoded)).map_err(|e| {
        warn!("Role roadmap result is not valid JSON: {e}");
        ServiceError::Malformed(format!("role roadmap result: {e}"))
    })?;

    let skills = value.get("skills");
    let stages = value
        .get("roadmap")
        .and_then(|r| r.as_array())
        .map(|stages| {
            stages
                .iter()
                .filter_map(|s| {
                    Some(RoleStage {
                        stage: s.get("stage")?.as_str()?.to_string(),
                        skills: strings(s.get("skills")),
                    })
                })
                .collect()
        })
        .unwrap_or_default();

    Ok(RoleRoadmap {
        role: role.to_string(),
        technical_skills: strings(skills.and_then(|s| s.get("technical"))),
        soft_skills: strings(skills.and_then(|s| s.get("soft"))),
        stages,
    })
}

fn strings(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(|v| v.as_array())
        .map(|items| {
            items
                .iter()
                .filter_map(|i| i.as_str().map(String::from))
                .collect()
        })
        .unwrap_or_default()
}
