use std::sync::Arc;

use axum::{
    extract::{Multipart, State},
    Json,
};
use tracing::warn;

use crate::errors::AppError;
use crate::ingest::{extract_text, IngestError, ResumeDocument, Upload};
use crate::state::{raise, AppState};

const FILE_FIELD: &str = "file";

/// POST /api/v1/resume
///
/// Multipart upload with a single `file` field. The extracted text replaces any
/// previous resume and resets the downstream stages.
pub async fn handle_upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ResumeDocument>, AppError> {
    let _pending = raise(&state.pending.upload)?;
    let upload = read_upload(&mut multipart).await?;

    let pages = Arc::clone(&state.pages);
    let document = tokio::task::spawn_blocking(move || extract_text(&upload, pages.as_ref()))
        .await
        .map_err(|e| {
            warn!("PDF extraction task aborted: {e}");
            IngestError::Extraction("the document could not be parsed".to_string())
        })??;

    state.workflow.lock().await.set_resume(document.clone());
    Ok(Json(document))
}

async fn read_upload(multipart: &mut Multipart) -> Result<Upload, AppError> {
    let invalid = |e: axum::extract::multipart::MultipartError| {
        AppError::Validation(format!("Invalid upload: {e}"))
    };

    while let Some(field) = multipart.next_field().await.map_err(invalid)? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let file_name = field.file_name().map(String::from);
        let content_type = field.content_type().map(String::from);
        let bytes = field.bytes().await.map_err(invalid)?;
        return Ok(Upload {
            file_name,
            content_type,
            bytes,
        });
    }

    Err(AppError::Validation(format!(
        "multipart field '{FILE_FIELD}' is required"
    )))
}
