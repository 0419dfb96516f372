// src/config.rs

//! Application configuration structures.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::storage::KeyStrategy;

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Browser session and extraction behavior
    #[serde(default)]
    pub scrape: ScrapeConfig,

    /// Local handoff artifact output
    #[serde(default)]
    pub output: OutputConfig,

    /// Destination for partitioned batch delivery
    #[serde(default)]
    pub upload: UploadConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.scrape.entry_url.trim().is_empty() {
            return Err(AppError::validation("scrape.entry_url is empty"));
        }
        if self.scrape.listing_link_text.trim().is_empty() {
            return Err(AppError::validation("scrape.listing_link_text is empty"));
        }
        if self.scrape.user_agent.trim().is_empty() {
            return Err(AppError::validation("scrape.user_agent is empty"));
        }
        if self.scrape.max_projects == 0 {
            return Err(AppError::validation("scrape.max_projects must be > 0"));
        }
        if self.scrape.timeout_secs == 0 {
            return Err(AppError::validation("scrape.timeout_secs must be > 0"));
        }
        if self.output.dir.trim().is_empty() {
            return Err(AppError::validation("output.dir is empty"));
        }
        if self.upload.prefix.trim().is_empty() {
            return Err(AppError::validation("upload.prefix is empty"));
        }
        Ok(())
    }
}

/// Browser session and extraction behavior settings.
///
/// The wait durations mirror how the portal actually behaves: the landing
/// page needs a settle delay before its links are clickable, and the listing
/// grid renders long after navigation reports complete.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapeConfig {
    /// Portal entry page
    #[serde(default = "defaults::entry_url")]
    pub entry_url: String,

    /// Visible text of the listing link on the entry page
    #[serde(default = "defaults::listing_link_text")]
    pub listing_link_text: String,

    /// User-Agent override for the browser session
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Maximum records to retain per run
    #[serde(default = "defaults::max_projects")]
    pub max_projects: usize,

    /// Navigation/request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Timeout for each listing-link click attempt, in seconds
    #[serde(default = "defaults::link_click_timeout")]
    pub link_click_timeout_secs: u64,

    /// Delay after landing on the entry page, in milliseconds
    #[serde(default = "defaults::settle_delay")]
    pub settle_delay_ms: u64,

    /// Delay after activating the listing link, in milliseconds
    #[serde(default = "defaults::post_click_delay")]
    pub post_click_delay_ms: u64,

    /// Wait for listing structure (tables/cards), in seconds
    #[serde(default = "defaults::content_wait")]
    pub content_wait_secs: u64,

    /// Fallback wait for the document body, in seconds
    #[serde(default = "defaults::body_wait")]
    pub body_wait_secs: u64,

    /// Extra render grace after the body appears, in milliseconds
    #[serde(default = "defaults::render_grace")]
    pub render_grace_ms: u64,

    /// Last-resort fixed wait when nothing was observed, in milliseconds
    #[serde(default = "defaults::last_resort_wait")]
    pub last_resort_wait_ms: u64,
}

impl ScrapeConfig {
    /// Link text variants tried in order when locating the listing link.
    pub fn listing_link_variants(&self) -> Vec<String> {
        let text = self.listing_link_text.trim().to_string();
        let upper = text.to_uppercase();
        if upper == text {
            vec![text]
        } else {
            vec![text, upper]
        }
    }
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            entry_url: defaults::entry_url(),
            listing_link_text: defaults::listing_link_text(),
            user_agent: defaults::user_agent(),
            max_projects: defaults::max_projects(),
            timeout_secs: defaults::timeout(),
            link_click_timeout_secs: defaults::link_click_timeout(),
            settle_delay_ms: defaults::settle_delay(),
            post_click_delay_ms: defaults::post_click_delay(),
            content_wait_secs: defaults::content_wait(),
            body_wait_secs: defaults::body_wait(),
            render_grace_ms: defaults::render_grace(),
            last_resort_wait_ms: defaults::last_resort_wait(),
        }
    }
}

/// Handoff artifact output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory for handoff artifacts
    #[serde(default = "defaults::output_dir")]
    pub dir: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: defaults::output_dir(),
        }
    }
}

/// Partitioned delivery settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    /// Destination descriptor: "LOCAL", a file:// URI, or a bucket name
    #[serde(default = "defaults::destination")]
    pub destination: String,

    /// Key prefix for partitioned batches
    #[serde(default = "defaults::upload_prefix")]
    pub prefix: String,

    /// Root directory for the LOCAL destination; the LOCAL_OUTPUT_DIR
    /// environment variable takes precedence when set
    #[serde(default)]
    pub local_root: Option<String>,

    /// Leaf naming strategy for partition keys
    #[serde(default)]
    pub key_strategy: KeyStrategy,
}

impl UploadConfig {
    /// Effective LOCAL root, preferring the environment override.
    pub fn effective_local_root(&self) -> Option<String> {
        std::env::var("LOCAL_OUTPUT_DIR")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .or_else(|| self.local_root.clone())
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            destination: defaults::destination(),
            prefix: defaults::upload_prefix(),
            local_root: None,
            key_strategy: KeyStrategy::default(),
        }
    }
}

mod defaults {
    // Scrape defaults
    pub fn entry_url() -> String {
        "https://www.up-rera.in/index".into()
    }
    pub fn listing_link_text() -> String {
        "Registered Projects".into()
    }
    pub fn user_agent() -> String {
        "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 \
         (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36"
            .into()
    }
    pub fn max_projects() -> usize {
        20
    }
    pub fn timeout() -> u64 {
        180
    }
    pub fn link_click_timeout() -> u64 {
        10
    }
    pub fn settle_delay() -> u64 {
        5_000
    }
    pub fn post_click_delay() -> u64 {
        8_000
    }
    pub fn content_wait() -> u64 {
        60
    }
    pub fn body_wait() -> u64 {
        30
    }
    pub fn render_grace() -> u64 {
        10_000
    }
    pub fn last_resort_wait() -> u64 {
        15_000
    }

    // Output defaults
    pub fn output_dir() -> String {
        "output".into()
    }

    // Upload defaults
    pub fn destination() -> String {
        "LOCAL".into()
    }
    pub fn upload_prefix() -> String {
        "scrapes".into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_default_config_ok() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn validate_rejects_empty_entry_url() {
        let mut config = Config::default();
        config.scrape.entry_url = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_max_projects() {
        let mut config = Config::default();
        config.scrape.max_projects = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn listing_link_variants_include_uppercase() {
        let scrape = ScrapeConfig::default();
        let variants = scrape.listing_link_variants();
        assert_eq!(
            variants,
            vec![
                "Registered Projects".to_string(),
                "REGISTERED PROJECTS".to_string()
            ]
        );
    }

    #[test]
    fn listing_link_variants_dedupe_all_caps() {
        let scrape = ScrapeConfig {
            listing_link_text: "PROJECTS".into(),
            ..ScrapeConfig::default()
        };
        assert_eq!(scrape.listing_link_variants(), vec!["PROJECTS".to_string()]);
    }

    #[test]
    fn parses_partial_toml_with_defaults() {
        let toml_str = r#"
            [scrape]
            max_projects = 5

            [upload]
            destination = "my-bucket"
        "#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.scrape.max_projects, 5);
        assert_eq!(config.scrape.timeout_secs, 180);
        assert_eq!(config.upload.destination, "my-bucket");
        assert_eq!(config.upload.prefix, "scrapes");
    }
}
