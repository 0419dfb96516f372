// src/lib.rs

//! UP RERA project scraper library

pub mod browser;
pub mod config;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod scrape;
pub mod storage;
