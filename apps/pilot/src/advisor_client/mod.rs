/// Advisor client: the single point of entry for all calls to the remote advisory service.
///
/// Recommendation, assessment, roadmap and guidance generation all live behind this
/// port. Components hand it an `Endpoint` plus a JSON body and decode the reply themselves.
///
/// No retries: a failed call is surfaced to the caller exactly once.
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

#[cfg(test)]
pub mod testing;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("service returned status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("malformed service payload: {0}")]
    Malformed(String),
}

/// Remote operations consumed by the workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Assessment,
    Recommend,
    Evaluate,
    StartupGuidance,
    RoleRoadmap,
}

impl Endpoint {
    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::Assessment => "/assessment",
            Endpoint::Recommend => "/recommend",
            Endpoint::Evaluate => "/evaluate",
            Endpoint::StartupGuidance => "/get-startup-guidance",
            Endpoint::RoleRoadmap => "/get-role-roadmap",
        }
    }
}

/// Body of a service reply. Non-JSON bodies are kept verbatim so diagnostics survive.
#[derive(Debug, Clone, PartialEq)]
pub enum ReplyBody {
    Json(Value),
    Text(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ServiceReply {
    pub status: u16,
    pub body: ReplyBody,
}

impl ServiceReply {
    pub fn json(status: u16, body: Value) -> Self {
        Self {
            status,
            body: ReplyBody::Json(body),
        }
    }

    pub fn text(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: ReplyBody::Text(body.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Returns the JSON body of a 2xx reply.
    /// Non-2xx replies become `ServiceError::Status` carrying the service's `error` message.
    pub fn into_success_json(self) -> Result<Value, ServiceError> {
        if !self.is_success() {
            return Err(ServiceError::Status {
                status: self.status,
                message: self.error_message(),
            });
        }
        match self.body {
            ReplyBody::Json(value) => Ok(value),
            ReplyBody::Text(text) => Err(ServiceError::Malformed(format!(
                "expected a JSON body, got: {}",
                truncate(&text, 120)
            ))),
        }
    }

    /// Best-effort human readable message for a failed reply.
    pub fn error_message(&self) -> String {
        match &self.body {
            ReplyBody::Json(value) => value
                .get("error")
                .and_then(|e| e.as_str())
                .map(String::from)
                .unwrap_or_else(|| format!("Server returned {}", self.status)),
            ReplyBody::Text(text) if !text.trim().is_empty() => truncate(text.trim(), 200),
            ReplyBody::Text(_) => format!("Server returned {}", self.status),
        }
    }
}

/// The remote advisory port. Carried in `AppState` as `Arc<dyn AdvisorService>`.
#[async_trait]
pub trait AdvisorService: Send + Sync {
    async fn post(&self, endpoint: Endpoint, body: Value) -> Result<ServiceReply, ServiceError>;
}

/// `reqwest`-backed implementation of the advisor port.
#[derive(Clone)]
pub struct HttpAdvisor {
    client: Client,
    base_url: String,
}

impl HttpAdvisor {
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, ServiceError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, endpoint: Endpoint) -> String {
        format!("{}{}", self.base_url, endpoint.path())
    }
}

#[async_trait]
impl AdvisorService for HttpAdvisor {
    async fn post(&self, endpoint: Endpoint, body: Value) -> Result<ServiceReply, ServiceError> {
        let url = self.url(endpoint);
        debug!("POST {url}");

        let response = self
            .client
            .post(&url)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status().as_u16();
        let text = response.text().await?;

        if !(200..300).contains(&status) {
            warn!("Advisor {} returned {}", endpoint.path(), status);
        } else {
            debug!("Advisor {} returned {} ({} bytes)", endpoint.path(), status, text.len());
        }

        Ok(match serde_json::from_str::<Value>(&text) {
            Ok(value) => ServiceReply::json(status, value),
            Err(_) => ServiceReply::text(status, text),
        })
    }
}

/// Strips ```json ... ``` or ``` ... ``` code fences from generated output.
pub fn strip_code_fences(text: &str) -> &str {
    let text = text.trim();
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    // Drop the language tag on the opening fence line, if any.
    let rest = match rest.find('\n') {
        Some(pos) if !rest[..pos].trim().contains(' ') => &rest[pos + 1..],
        Some(_) => rest,
        None => strip_inline_tag(rest),
    };
    rest.trim_end()
        .strip_suffix("```")
        .map(|s| s.trim())
        .unwrap_or(rest.trim())
}

/// One-line fences such as ```json{...}``` carry the tag directly before the payload.
fn strip_inline_tag(rest: &str) -> &str {
    let tag_len = rest
        .find(|c: char| !c.is_ascii_alphabetic())
        .unwrap_or(rest.len());
    let after = rest[tag_len..].trim_start();
    if tag_len > 0 && after.starts_with(|c: char| matches!(c, '{' | '[' | '<')) {
        after
    } else {
        rest
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let cut: String = text.chars().take(max_chars).collect();
    format!("{cut}…")
}
