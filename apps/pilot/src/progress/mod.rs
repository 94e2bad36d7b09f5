//! Startup progress tracking: the persisted milestone checklist, the derived stage label,
//! and the guidance request built from them.

pub mod guidance;
pub mod handlers;
pub mod sanitize;
pub mod store;

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, MutexGuard};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use store::{KeyValueStore, StoreError};

pub const PROGRESS_KEY: &str = "startupProgress";
pub const PROJECT_KEY: &str = "projectDetails";

/// One milestone of the startup checklist, with the guidance text shown beside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StartupStep {
    pub id: u8,
    pub title: &'static str,
    pub description: &'static str,
    pub details: &'static [&'static str],
}

pub const STARTUP_STEPS: [StartupStep; 8] = [
    StartupStep {
        id: 1,
        title: "Idea Validation & Market Research",
        description: "Validate your business idea through market research, customer interviews, and competitive analysis.",
        details: &[
            "Conduct customer interviews and surveys",
            "Analyze market size and competition",
            "Create a value proposition canvas",
            "Test your minimum viable product (MVP) concept",
        ],
    },
    StartupStep {
        id: 2,
        title: "Business Plan & Strategy",
        description: "Develop a comprehensive business plan including financial projections and go-to-market strategy.",
        details: &[
            "Write a detailed business plan",
            "Create financial projections and budgets",
            "Define your target market and customer personas",
            "Develop pricing strategy and revenue models",
        ],
    },
    StartupStep {
        id: 3,
        title: "Legal & Regulatory Setup",
        description: "Establish your business legally with proper registrations, licenses, and compliance requirements.",
        details: &[
            "Choose business structure (LLC, Corporation, etc.)",
            "Register your business name and domain",
            "Obtain necessary licenses and permits",
            "Set up business bank accounts and accounting",
        ],
    },
    StartupStep {
        id: 4,
        title: "Funding & Investment",
        description: "Secure funding through various channels including bootstrapping, investors, or loans.",
        details: &[
            "Bootstrap with personal savings",
            "Apply for business loans or grants",
            "Pitch to angel investors or VCs",
            "Consider crowdfunding platforms",
        ],
    },
    StartupStep {
        id: 5,
        title: "Product Development",
        description: "Build and develop your product or service with focus on quality and user experience.",
        details: &[
            "Develop your MVP (Minimum Viable Product)",
            "Implement user feedback and iterations",
            "Ensure quality assurance and testing",
            "Prepare for product launch",
        ],
    },
    StartupStep {
        id: 6,
        title: "Marketing & Branding",
        description: "Create a strong brand identity and marketing strategy to reach your target audience.",
        details: &[
            "Develop brand identity and logo",
            "Create marketing materials and website",
            "Implement digital marketing strategies",
            "Build social media presence",
        ],
    },
    StartupStep {
        id: 7,
        title: "Team Building & Operations",
        description: "Hire the right team and establish operational processes for sustainable growth.",
        details: &[
            "Define roles and responsibilities",
            "Hire key team members",
            "Establish company culture and values",
            "Set up operational processes and workflows",
        ],
    },
    StartupStep {
        id: 8,
        title: "Launch & Growth",
        description: "Launch your business and focus on growth, customer acquisition, and scaling operations.",
        details: &[
            "Execute product launch strategy",
            "Focus on customer acquisition",
            "Monitor key performance indicators",
            "Plan for scaling and expansion",
        ],
    },
];

#[derive(Debug, Error)]
pub enum ProgressError {
    #[error("unknown startup step {0} (expected 1-{max})", max = STARTUP_STEPS.len())]
    UnknownStep(u8),

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Stage {
    #[serde(rename = "Just Starting")]
    JustStarting,
    #[serde(rename = "Early Stage")]
    EarlyStage,
    #[serde(rename = "Development Stage")]
    DevelopmentStage,
    #[serde(rename = "Pre-Launch Stage")]
    PreLaunchStage,
    #[serde(rename = "Growth Stage")]
    GrowthStage,
}

impl Stage {
    pub fn label(&self) -> &'static str {
        match self {
            Stage::JustStarting => "Just Starting",
            Stage::EarlyStage => "Early Stage",
            Stage::DevelopmentStage => "Development Stage",
            Stage::PreLaunchStage => "Pre-Launch Stage",
            Stage::GrowthStage => "Growth Stage",
        }
    }
}

/// Stage label from the number of completed steps. Only the count matters.
pub fn derive_stage(completed_count: usize) -> Stage {
    match completed_count {
        0 => Stage::JustStarting,
        1..=2 => Stage::EarlyStage,
        3..=5 => Stage::DevelopmentStage,
        6..=7 => Stage::PreLaunchStage,
        _ => Stage::GrowthStage,
    }
}

/// Free-text project description feeding the guidance request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProjectDetails {
    pub project_name: String,
    pub description: String,
    pub current_stage: String,
    pub challenges: String,
    pub goals: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProgressRecord {
    pub completed: BTreeSet<u8>,
    pub project: ProjectDetails,
}

impl ProgressRecord {
    pub fn stage(&self) -> Stage {
        derive_stage(self.completed.len())
    }
}

/// Owns the durable progress record. Every mutation is written through immediately.
///
/// Handlers run on several worker threads, so each read-modify-write of the record
/// happens under `write_lock`.
#[derive(Clone)]
pub struct ProgressTracker {
    store: Arc<dyn KeyValueStore>,
    write_lock: Arc<Mutex<()>>,
}

impl ProgressTracker {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ()> {
        // The guarded data is `()`; a panic elsewhere leaves nothing inconsistent.
        self.write_lock.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn store(&self) -> &Arc<dyn KeyValueStore> {
        &self.store
    }

    /// Reads the record, creating and persisting an empty checklist on first read.
    pub fn load(&self) -> Result<ProgressRecord, ProgressError> {
        let _guard = self.lock();
        self.load_locked()
    }

    fn load_locked(&self) -> Result<ProgressRecord, ProgressError> {
        let completed = match self.store.get(PROGRESS_KEY)? {
            Some(raw) => decode_steps(&raw)?,
            None => {
                info!("No saved progress; starting an empty checklist");
                self.save_steps(&BTreeSet::new())?;
                BTreeSet::new()
            }
        };

        let project = match self.store.get(PROJECT_KEY)? {
            Some(raw) => serde_json::from_str(&raw).map_err(|source| StoreError::Serialization {
                key: PROJECT_KEY.to_string(),
                source,
            })?,
            None => ProjectDetails::default(),
        };

        Ok(ProgressRecord { completed, project })
    }

    /// Adds the step if absent, removes it if present, and persists the result.
    pub fn toggle_step(&self, id: u8) -> Result<BTreeSet<u8>, ProgressError> {
        if !STARTUP_STEPS.iter().any(|s| s.id == id) {
            return Err(ProgressError::UnknownStep(id));
        }

        let _guard = self.lock();
        let mut completed = self.load_locked()?.completed;
        if !completed.remove(&id) {
            completed.insert(id);
        }
        self.save_steps(&completed)?;

        debug!(
            "Toggled step {id}: {} completed, stage {}",
            completed.len(),
            derive_stage(completed.len()).label()
        );
        Ok(completed)
    }

    pub fn save_project(&self, project: &ProjectDetails) -> Result<(), ProgressError> {
        let _guard = self.lock();
        let raw = serde_json::to_string(project).map_err(|source| StoreError::Serialization {
            key: PROJECT_KEY.to_string(),
            source,
        })?;
        self.store.set(PROJECT_KEY, &raw)?;
        Ok(())
    }

    fn save_steps(&self, completed: &BTreeSet<u8>) -> Result<(), ProgressError> {
        let raw = serde_json::to_string(completed).map_err(|source| StoreError::Serialization {
            key: PROGRESS_KEY.to_string(),
            source,
        })?;
        self.store.set(PROGRESS_KEY, &raw)?;
        Ok(())
    }
}

/// Decodes the stored id array. Ids outside the catalog are dropped.
fn decode_steps(raw: &str) -> Result<BTreeSet<u8>, StoreError> {
    let ids: Vec<i64> = serde_json::from_str(raw).map_err(|source| StoreError::Serialization {
        key: PROGRESS_KEY.to_string(),
        source,
    })?;
    Ok(ids
        .into_iter()
        .filter_map(|id| u8::try_from(id).ok())
        .filter(|id| STARTUP_STEPS.iter().any(|s| s.id == *id))
        .collect())
}
