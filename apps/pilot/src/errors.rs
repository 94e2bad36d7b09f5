use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::advisor_client::ServiceError;
use crate::assessment::AssessmentError;
use crate::ingest::IngestError;
use crate::progress::guidance::GuidanceError;
use crate::progress::store::StoreError;
use crate::progress::ProgressError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Empty document: {0}")]
    EmptyDocument(String),

    #[error("Busy: {0} is already in progress")]
    Busy(&'static str),

    #[error("Service error: {0}")]
    Service(#[from] ServiceError),

    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<IngestError> for AppError {
    fn from(err: IngestError) -> Self {
        match err {
            IngestError::UnsupportedFormat(kind) => AppError::UnsupportedFormat(kind),
            IngestError::EmptyDocument => AppError::EmptyDocument(
                "No extractable text found (empty or scanned PDF)".to_string(),
            ),
            IngestError::Extraction(msg) => {
                AppError::UnsupportedFormat(format!("Could not read the PDF file: {msg}"))
            }
        }
    }
}

impl From<AssessmentError> for AppError {
    fn from(err: AssessmentError) -> Self {
        match err {
            AssessmentError::QuestionNotFound(index) => {
                AppError::NotFound(format!("Question {index} not found"))
            }
            other => AppError::Validation(other.to_string()),
        }
    }
}

impl From<ProgressError> for AppError {
    fn from(err: ProgressError) -> Self {
        match err {
            ProgressError::UnknownStep(_) => AppError::Validation(err.to_string()),
            ProgressError::Store(e) => AppError::Storage(e),
        }
    }
}

impl From<GuidanceError> for AppError {
    fn from(err: GuidanceError) -> Self {
        match err {
            GuidanceError::Validation(msg) => AppError::Validation(msg),
            GuidanceError::Service(e) => AppError::Service(e),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::UnsupportedFormat(msg) => (
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                "UNSUPPORTED_FORMAT",
                msg.clone(),
            ),
            AppError::EmptyDocument(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "EMPTY_DOCUMENT",
                msg.clone(),
            ),
            AppError::Busy(surface) => (
                StatusCode::CONFLICT,
                "BUSY",
                format!("{surface} is already in progress"),
            ),
            AppError::Service(e) => {
                tracing::error!("Advisor service error: {e}");
                (StatusCode::BAD_GATEWAY, "SERVICE_ERROR", e.to_string())
            }
            AppError::Storage(e) => {
                tracing::error!("Storage error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "STORAGE_ERROR",
                    "Could not save your progress".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
