//! Resume ingestion. Turns an uploaded PDF into page-ordered plain text.
//!
//! The PDF engine itself is a capability behind `PageTextSource`; this module owns
//! format gating, page ordering, joining and the empty-document rule.

pub mod handlers;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

pub const PDF_CONTENT_TYPE: &str = "application/pdf";

/// PDF files may carry a few junk bytes before the header; readers scan the first 1KiB.
const PDF_HEADER_SCAN: usize = 1024;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("only PDF resumes are supported (got {0})")]
    UnsupportedFormat(String),

    #[error("document contains no extractable text")]
    EmptyDocument,

    #[error("PDF extraction failed: {0}")]
    Extraction(String),
}

/// Produces the text fragments of every page, page 1 first.
pub trait PageTextSource: Send + Sync {
    fn page_fragments(&self, pdf: &[u8]) -> Result<Vec<Vec<String>>, IngestError>;
}

/// `pdf-extract` backed page source.
pub struct PdfExtractSource;

impl PageTextSource for PdfExtractSource {
    fn page_fragments(&self, pdf: &[u8]) -> Result<Vec<Vec<String>>, IngestError> {
        let pages = pdf_extract::extract_text_from_mem_by_pages(pdf)
            .map_err(|e| IngestError::Extraction(e.to_string()))?;
        Ok(pages
            .iter()
            .map(|page| {
                page.lines()
                    .map(str::trim)
                    .filter(|line| !line.is_empty())
                    .map(String::from)
                    .collect()
            })
            .collect())
    }
}

/// An uploaded file as received from the client.
#[derive(Debug, Clone)]
pub struct Upload {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

/// Extracted resume held for the current session only.
#[derive(Debug, Clone, Serialize)]
pub struct ResumeDocument {
    pub id: Uuid,
    pub file_name: Option<String>,
    pub page_count: usize,
    pub text: String,
    pub uploaded_at: DateTime<Utc>,
}

/// Rejects anything that is not a PDF, by declared type and by header bytes.
pub fn ensure_pdf(upload: &Upload) -> Result<(), IngestError> {
    let declared = upload
        .content_type
        .as_deref()
        .map(|ct| ct.split(';').next().unwrap_or(ct).trim().to_ascii_lowercase());

    let declared_ok = match declared.as_deref() {
        Some(PDF_CONTENT_TYPE) => true,
        Some("application/octet-stream") | None => upload
            .file_name
            .as_deref()
            .map(|name| name.to_ascii_lowercase().ends_with(".pdf"))
            .unwrap_or(false),
        Some(_) => false,
    };

    if !declared_ok {
        return Err(IngestError::UnsupportedFormat(
            declared.unwrap_or_else(|| "unknown type".to_string()),
        ));
    }

    let scan = &upload.bytes[..upload.bytes.len().min(PDF_HEADER_SCAN)];
    if !scan.windows(5).any(|w| w == b"%PDF-") {
        return Err(IngestError::UnsupportedFormat(
            "file without a PDF header".to_string(),
        ));
    }

    Ok(())
}

/// Joins page fragments with a space, concatenating pages strictly in page order.
pub fn join_pages(pages: &[Vec<String>]) -> String {
    let mut text = String::new();
    for fragments in pages {
        text.push_str(&fragments.join(" "));
        text.push(' ');
    }
    text.trim().to_string()
}

/// Extracts page-ordered plain text from an uploaded PDF.
pub fn extract_text(upload: &Upload, source: &dyn PageTextSource) -> Result<ResumeDocument, IngestError> {
    ensure_pdf(upload)?;

    let pages = source.page_fragments(&upload.bytes)?;
    debug!("Extracted {} page(s) from upload", pages.len());

    let text = join_pages(&pages);
    if text.is_empty() {
        return Err(IngestError::EmptyDocument);
    }

    info!(
        "Resume ingested: {} page(s), {} characters",
        pages.len(),
        text.chars().count()
    );

    Ok(ResumeDocument {
        id: Uuid::new_v4(),
        file_name: upload.file_name.clone(),
        page_count: pages.len(),
        text,
        uploaded_at: Utc::now(),
    })
}
