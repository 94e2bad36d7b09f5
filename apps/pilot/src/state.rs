use std::sync::Arc;

use tokio::sync::Mutex;

use crate::advisor_client::AdvisorService;
use crate::config::Config;
use crate::errors::AppError;
use crate::ingest::PageTextSource;
use crate::pending::{PendingFlag, PendingGuard};
use crate::progress::ProgressTracker;
use crate::workflow::WorkflowSession;

/// One in-flight flag per action surface.
#[derive(Debug, Clone)]
pub struct PendingFlags {
    pub upload: PendingFlag,
    pub recommend: PendingFlag,
    pub assessment: PendingFlag,
    pub roadmap: PendingFlag,
    pub guidance: PendingFlag,
    pub role_roadmap: PendingFlag,
}

impl Default for PendingFlags {
    fn default() -> Self {
        Self {
            upload: PendingFlag::new("resume upload"),
            recommend: PendingFlag::new("recommendation request"),
            assessment: PendingFlag::new("assessment load"),
            roadmap: PendingFlag::new("roadmap request"),
            guidance: PendingFlag::new("guidance request"),
            role_roadmap: PendingFlag::new("role roadmap lookup"),
        }
    }
}

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Remote advisory service. `HttpAdvisor` in production, a scripted fake in tests.
    pub advisor: Arc<dyn AdvisorService>,
    pub pages: Arc<dyn PageTextSource>,
    /// Never held across a call to `advisor`.
    pub workflow: Arc<Mutex<WorkflowSession>>,
    pub progress: ProgressTracker,
    pub pending: PendingFlags,
}

impl AppState {
    pub fn new(
        config: Config,
        advisor: Arc<dyn AdvisorService>,
        pages: Arc<dyn PageTextSource>,
        progress: ProgressTracker,
    ) -> Self {
        Self {
            config,
            advisor,
            pages,
            workflow: Arc::new(Mutex::new(WorkflowSession::new())),
            progress,
            pending: PendingFlags::default(),
        }
    }
}

/// Raises `flag` or refuses the request when that surface is already busy.
pub fn raise(flag: &PendingFlag) -> Result<PendingGuard, AppError> {
    flag.try_raise().ok_or(AppError::Busy(flag.name()))
}
