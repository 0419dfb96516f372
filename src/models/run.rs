// src/models/run.rs

//! Scrape run lifecycle records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

use super::project::ProjectRecord;

/// Terminal status of a scrape run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Success,
    Failed,
}

/// Failure details folded into a run record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunFailure {
    /// Top-level error message
    pub message: String,

    /// Rendered source chain for diagnosis
    pub trace: String,
}

impl RunFailure {
    pub fn from_error(err: &AppError) -> Self {
        Self {
            message: err.to_string(),
            trace: err.trace(),
        }
    }
}

/// One extraction invocation. Immutable once completed; persisted exactly
/// once as a handoff artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapeRun {
    /// Short random token for traceability across logs and file names
    pub run_id: String,

    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,

    pub status: RunStatus,

    /// Retained records, in discovery order
    pub records: Vec<ProjectRecord>,

    /// Present iff status is Failed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<RunFailure>,
}

impl ScrapeRun {
    /// Complete a run successfully with the collected records.
    pub fn success(run_id: String, started_at: DateTime<Utc>, records: Vec<ProjectRecord>) -> Self {
        Self {
            run_id,
            started_at,
            completed_at: Utc::now(),
            status: RunStatus::Success,
            records,
            error: None,
        }
    }

    /// Complete a run as failed, folding the error into the record.
    pub fn failure(run_id: String, started_at: DateTime<Utc>, err: &AppError) -> Self {
        Self {
            run_id,
            started_at,
            completed_at: Utc::now(),
            status: RunStatus::Failed,
            records: Vec::new(),
            error: Some(RunFailure::from_error(err)),
        }
    }

    pub fn succeeded(&self) -> bool {
        self.status == RunStatus::Success
    }

    /// Wall-clock duration between start and completion.
    pub fn duration_seconds(&self) -> f64 {
        (self.completed_at - self.started_at).num_milliseconds() as f64 / 1000.0
    }
}

/// Fresh run identifier: the first 8 hex characters of a random UUID,
/// enough to tell concurrent runs apart in logs and file names.
pub fn new_run_id() -> String {
    let id = uuid::Uuid::new_v4().simple().to_string();
    id[..8].to_string()
}
