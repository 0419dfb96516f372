// src/error.rs

//! Unified error handling for the scraper application.

use std::fmt;

use thiserror::Error;

/// Result type alias for scraper operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// Browser session or driver error
    #[error("Browser error: {0}")]
    Browser(String),

    /// The listing link could not be located on the entry page
    #[error("Navigation target not found: {0}")]
    NavigationTargetNotFound(String),

    /// Handoff artifact missing at the given path
    #[error("Handoff artifact not found: {path}")]
    HandoffNotFound { path: String },

    /// Handoff artifact exists but is not valid JSON
    #[error("Handoff artifact corrupt: {path}")]
    HandoffCorrupt {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    /// LOCAL destination requested without a configured local root
    #[error("LOCAL destination requires a local output root (config or LOCAL_OUTPUT_DIR)")]
    MissingLocalRoot,

    /// Destination descriptor empty or unusable
    #[error("Missing or invalid destination: {0}")]
    MissingDestinationConfig(String),

    /// Storage backend rejected a write
    #[error("Storage write to {target} failed: {message}")]
    StorageWrite { target: String, message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),
}

impl AppError {
    /// Create a browser/driver error.
    pub fn browser(message: impl fmt::Display) -> Self {
        Self::Browser(message.to_string())
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a storage write error for a concrete target.
    pub fn storage_write(target: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::StorageWrite {
            target: target.into(),
            message: message.to_string(),
        }
    }

    /// Render this error with its full source chain, outermost first.
    ///
    /// Used when folding a failure into a run record, where the chain
    /// stands in for a stack trace.
    pub fn trace(&self) -> String {
        let mut rendered = self.to_string();
        let mut source = std::error::Error::source(self);
        while let Some(cause) = source {
            rendered.push_str("\ncaused by: ");
            rendered.push_str(&cause.to_string());
            source = cause.source();
        }
        rendered
    }
}
