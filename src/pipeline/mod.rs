// src/pipeline/mod.rs

//! Pipeline entry points for scraper operations.
//!
//! - `run_scrape`: Drive a browser session and persist the handoff artifact
//! - `verify_handoff`: Summarize a persisted artifact without touching it
//! - `run_upload`: Push an artifact's records into partitioned storage

pub mod scrape;
pub mod upload;
pub mod verify;

pub use scrape::{ScrapeSummary, run_scrape};
pub use upload::{UploadReport, run_upload};
pub use verify::{SampleProject, VerifyErrorKind, VerifyReport, VerifyStatus, verify_handoff};
