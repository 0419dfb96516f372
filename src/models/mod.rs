// src/models/mod.rs

//! Domain models for the scraper application.

mod handoff;
mod project;
mod run;

pub use handoff::{HandoffArtifact, HandoffData, read_envelope};
pub use project::{ExtractionStrategy, ProjectRecord};
pub use run::{RunFailure, RunStatus, ScrapeRun, new_run_id};
