// src/pipeline/scrape.rs

//! Scrape-and-hand-off pipeline.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use crate::browser::Browser;
use crate::config::Config;
use crate::error::Result;
use crate::models::HandoffArtifact;
use crate::scrape::ProjectScraper;

/// What one scrape invocation produced.
#[derive(Debug, Clone, Serialize)]
pub struct ScrapeSummary {
    pub run_id: String,
    pub success: bool,
    pub total_projects: usize,
    pub duration_seconds: f64,
    pub artifact_path: PathBuf,
    pub message: String,
}

/// Run one scrape and persist its handoff artifact under the configured
/// output directory. Failed runs still produce an artifact; only failing
/// to persist it is an error here.
pub async fn run_scrape(
    browser: Arc<dyn Browser>,
    config: &Config,
    max_records: usize,
    timeout: Duration,
) -> Result<ScrapeSummary> {
    let scraper = ProjectScraper::new(browser, config.scrape.clone());
    let run = scraper.scrape(max_records, timeout).await;

    let artifact = HandoffArtifact::from_run(&run);
    let artifact_path = artifact.save(&config.output.dir).await?;
    log::info!("Handoff artifact saved to {}", artifact_path.display());

    Ok(ScrapeSummary {
        run_id: run.run_id.clone(),
        success: run.succeeded(),
        total_projects: artifact.data.total_projects,
        duration_seconds: artifact.data.duration_seconds,
        artifact_path,
        message: artifact.message.clone(),
    })
}
