// src/pipeline/verify.rs

//! Read-only verification of a persisted handoff artifact.
//!
//! Downstream ingestion wants a quick answer to "did the scrape leave a
//! usable file here". Missing and corrupt artifacts are report outcomes,
//! not process failures, so this stage never returns an error.

use std::path::Path;

use serde::Serialize;
use serde_json::Value;

use crate::error::AppError;
use crate::models::read_envelope;

/// How many records the sample section shows.
const SAMPLE_LIMIT: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VerifyStatus {
    Success,
    Error,
}

/// Structured cause for an error report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VerifyErrorKind {
    HandoffNotFound,
    HandoffCorrupt,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SampleProject {
    pub project_name: String,
    pub rera_number: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct VerifyReport {
    pub status: VerifyStatus,
    pub file_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<VerifyErrorKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_size: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_size_kb: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_projects: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sample_projects: Option<Vec<SampleProject>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scraped_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_seconds: Option<f64>,
    pub message: String,
}

/// Inspect the artifact at `path` and report on it. Never fails: every
/// outcome, including a missing or unparseable file, is a report.
pub async fn verify_handoff(path: impl AsRef<Path>) -> VerifyReport {
    let path = path.as_ref();
    log::info!("Verifying handoff artifact at {}", path.display());

    match read_envelope(path).await {
        Ok((envelope, file_size)) => summarize(path, &envelope, file_size),
        Err(AppError::HandoffNotFound { .. }) => error_report(
            path,
            Some(VerifyErrorKind::HandoffNotFound),
            "File not found",
            format!("The file {} does not exist", path.display()),
        ),
        Err(AppError::HandoffCorrupt { source, .. }) => error_report(
            path,
            Some(VerifyErrorKind::HandoffCorrupt),
            "Invalid JSON format in file",
            source.to_string(),
        ),
        Err(e) => error_report(path, None, "File verification failed", e.to_string()),
    }
}

/// The envelope may be partial, so every field is read leniently.
fn summarize(path: &Path, envelope: &Value, file_size: u64) -> VerifyReport {
    let data = &envelope["data"];
    let empty = Vec::new();
    let projects = data["projects"].as_array().unwrap_or(&empty);

    let sample_projects: Vec<SampleProject> = projects
        .iter()
        .take(SAMPLE_LIMIT)
        .map(|project| SampleProject {
            project_name: lenient_str(&project["project_name"]),
            rera_number: lenient_str(&project["rera_number"]),
        })
        .collect();

    let kb = file_size as f64 / 1024.0;
    log::info!(
        "Verified {} projects in {} bytes ({kb:.2} KB)",
        projects.len(),
        file_size
    );

    VerifyReport {
        status: VerifyStatus::Success,
        file_path: path.display().to_string(),
        error_kind: None,
        error: None,
        file_size: Some(file_size),
        file_size_kb: Some((kb * 100.0).round() / 100.0),
        total_projects: Some(projects.len()),
        sample_projects: Some(sample_projects),
        run_id: Some(lenient_str(&data["run_id"])),
        scraped_at: Some(lenient_str(&data["scraped_at"])),
        duration_seconds: Some(data["duration_seconds"].as_f64().unwrap_or(0.0)),
        message: format!(
            "Successfully verified file with {} projects ({kb:.2} KB)",
            projects.len()
        ),
    }
}

fn lenient_str(value: &Value) -> String {
    value.as_str().unwrap_or("N/A").to_string()
}

fn error_report(
    path: &Path,
    error_kind: Option<VerifyErrorKind>,
    message: &str,
    detail: String,
) -> VerifyReport {
    log::error!("Verification failed for {}: {detail}", path.display());
    VerifyReport {
        status: VerifyStatus::Error,
        file_path: path.display().to_string(),
        error_kind,
        error: Some(detail),
        file_size: None,
        file_size_kb: None,
        total_projects: None,
        sample_projects: None,
        run_id: None,
        scraped_at: None,
        duration_seconds: None,
        message: message.to_string(),
    }
}
