// src/models/project.rs

//! Extracted project records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Which fallback tier produced a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionStrategy {
    /// Structured rows from the listing grid
    TableRows,
    /// Card/div layout
    Cards,
    /// Identifier mining over raw page text
    PageText,
}

impl ExtractionStrategy {
    /// Stable lowercase tag, as serialized.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TableRows => "table_rows",
            Self::Cards => "cards",
            Self::PageText => "page_text",
        }
    }
}

/// A project listing extracted from the portal.
///
/// The schema is a superset across tiers: fields a tier cannot supply stay
/// empty strings, so every serialized record carries the same columns.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectRecord {
    /// Serial number as printed in the listing grid
    #[serde(default)]
    pub serial_no: String,

    /// Promoter / developer name
    #[serde(default)]
    pub promoter_name: String,

    /// Project display name
    #[serde(default)]
    pub project_name: String,

    /// Registration identifier (UPRERAPRJ...)
    #[serde(default)]
    pub rera_number: String,

    /// Project type (residential, commercial, ...)
    #[serde(default)]
    pub project_type: String,

    /// District
    #[serde(default)]
    pub district: String,

    /// Declared start date, as printed
    #[serde(default)]
    pub start_date: String,

    /// Declared end date, as printed
    #[serde(default)]
    pub end_date: String,

    /// Registration date, as printed
    #[serde(default)]
    pub registration_date: String,

    /// Link to the project detail page
    #[serde(default)]
    pub detail_link: String,

    /// Unstructured fallback payload (card tier only)
    #[serde(default)]
    pub raw_text: String,

    /// Caveat attached to synthesized records (text-mining tier only)
    #[serde(default)]
    pub note: String,

    /// When this record was extracted
    #[serde(default)]
    pub scraped_at: DateTime<Utc>,

    /// Tier that produced the record
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extraction_strategy: Option<ExtractionStrategy>,
}

impl ProjectRecord {
    /// Empty record stamped with the producing tier and the current time.
    pub fn tagged(strategy: ExtractionStrategy) -> Self {
        Self {
            scraped_at: Utc::now(),
            extraction_strategy: Some(strategy),
            ..Self::default()
        }
    }

    /// Retention check: a record is kept only when it identifies a project
    /// by name or by registration identifier.
    pub fn has_identity(&self) -> bool {
        !self.project_name.trim().is_empty() || !self.rera_number.trim().is_empty()
    }
}
