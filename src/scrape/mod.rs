// src/scrape/mod.rs

//! Portal scraping: session driving, navigation and the tiered
//! extraction cascade.
//!
//! `ProjectScraper` owns the whole flow. It talks to the portal through
//! the capability traits in [`crate::browser`], which keeps every tier
//! and the navigation logic testable without a Chrome binary.

mod engine;
pub mod selectors;
mod tiers;

pub use engine::ProjectScraper;
