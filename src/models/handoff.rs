// src/models/handoff.rs

//! Handoff artifact: the JSON envelope persisted once per run.
//!
//! The artifact is the durable bridge between extraction and the
//! verification/upload steps. It is created exactly once by the scrape
//! pipeline and read-only afterward.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};

use super::project::ProjectRecord;
use super::run::ScrapeRun;

/// Payload section of the artifact envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HandoffData {
    pub total_projects: usize,
    pub projects: Vec<ProjectRecord>,
    pub run_id: String,

    /// Completion instant of the producing run
    pub scraped_at: DateTime<Utc>,

    pub duration_seconds: f64,
}

/// The artifact envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HandoffArtifact {
    pub success: bool,
    pub data: HandoffData,

    /// Failure message, present on failed runs only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Rendered error chain, present on failed runs only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_details: Option<String>,

    /// Human-readable outcome summary
    pub message: String,
}

impl HandoffArtifact {
    /// Build the envelope for a completed run.
    pub fn from_run(run: &ScrapeRun) -> Self {
        let duration = run.duration_seconds();
        match &run.error {
            None => Self {
                success: true,
                message: format!(
                    "Successfully scraped {} projects in {:.1}s",
                    run.records.len(),
                    duration
                ),
                data: HandoffData {
                    total_projects: run.records.len(),
                    projects: run.records.clone(),
                    run_id: run.run_id.clone(),
                    scraped_at: run.completed_at,
                    duration_seconds: duration,
                },
                error: None,
                error_details: None,
            },
            Some(failure) => Self {
                success: false,
                message: format!("Scraping failed after {:.1}s: {}", duration, failure.message),
                data: HandoffData {
                    total_projects: 0,
                    projects: Vec::new(),
                    run_id: run.run_id.clone(),
                    scraped_at: run.completed_at,
                    duration_seconds: duration,
                },
                error: Some(failure.message.clone()),
                error_details: Some(failure.trace.clone()),
            },
        }
    }

    /// Artifact file name: timestamped and tagged with the run id so
    /// parallel runs never clobber each other.
    pub fn file_name(&self) -> String {
        format!(
            "up_rera_projects_{}_{}.json",
            self.data.scraped_at.format("%Y%m%d_%H%M%S"),
            self.data.run_id
        )
    }

    /// Persist the artifact under `dir`, creating the directory as needed.
    /// Returns the full path written.
    pub async fn save(&self, dir: impl AsRef<Path>) -> Result<PathBuf> {
        let dir = dir.as_ref();
        tokio::fs::create_dir_all(dir).await?;

        let path = dir.join(self.file_name());
        let bytes = serde_json::to_vec_pretty(self)?;

        // Write to temp, then rename
        let tmp = path.with_extension("tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(&bytes).await?;
        file.flush().await?;
        drop(file);
        tokio::fs::rename(&tmp, &path).await?;

        Ok(path)
    }
}

/// Read an artifact leniently: any JSON document is accepted so partial or
/// hand-edited envelopes can still be summarized. Returns the parsed value
/// and the file size in bytes.
pub async fn read_envelope(path: impl AsRef<Path>) -> Result<(Value, u64)> {
    let path = path.as_ref();
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(AppError::HandoffNotFound {
                path: path.display().to_string(),
            });
        }
        Err(e) => return Err(AppError::Io(e)),
    };

    let size = bytes.len() as u64;
    let value = serde_json::from_slice(&bytes).map_err(|source| AppError::HandoffCorrupt {
        path: path.display().to_string(),
        source,
    })?;

    Ok((value, size))
}
