use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;
use tracing::{info, warn};

use crate::advisor_client::{AdvisorService, Endpoint, ServiceError};
use crate::progress::sanitize::{sanitize_guidance, GuidanceBlock};
use crate::progress::{ProjectDetails, Stage};

#[derive(Debug, Error)]
pub enum GuidanceError {
    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Service(#[from] ServiceError),
}

/// Progress as it stood when guidance was requested.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressSnapshot {
    pub completed: BTreeSet<u8>,
    pub stage: Stage,
    pub project: ProjectDetails,
}

#[derive(Debug, Clone, Serialize)]
pub struct GuidanceResult {
    pub content: Vec<GuidanceBlock>,
    pub snapshot: ProgressSnapshot,
    pub requested_at: DateTime<Utc>,
}

/// Local gate run before any network traffic.
pub fn validate_project(project: &ProjectDetails) -> Result<(), GuidanceError> {
    if project.project_name.trim().is_empty() || project.description.trim().is_empty() {
        return Err(GuidanceError::Validation(
            "Please fill in at least project name and description".to_string(),
        ));
    }
    Ok(())
}

pub async fn request_guidance(
    advisor: &dyn AdvisorService,
    project: &ProjectDetails,
    completed: &BTreeSet<u8>,
    stage: Stage,
) -> Result<GuidanceResult, GuidanceError> {
    validate_project(project)?;

    info!(
        "Requesting guidance for '{}' ({} steps, {})",
        project.project_name,
        completed.len(),
        stage.label()
    );

    let body = json!({
        "projectDetails": project,
        "completedSteps": completed,
        "currentStage": stage,
    });
    let reply = advisor.post(Endpoint::StartupGuidance, body).await?;
    let value = reply.into_success_json()?;

    let raw = value
        .get("guidance")
        .and_then(|g| g.as_str())
        .ok_or_else(|| ServiceError::Malformed("guidance reply has no guidance text".to_string()))?;

    let content = sanitize_guidance(raw);
    if content.is_empty() {
        warn!("Guidance reply contained no displayable text");
    }

    Ok(GuidanceResult {
        content,
        snapshot: ProgressSnapshot {
            completed: completed.clone(),
            stage,
            project: project.clone(),
        },
        requested_at: Utc::now(),
    })
}
