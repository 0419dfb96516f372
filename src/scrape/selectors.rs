// src/scrape/selectors.rs

//! Selector and pattern constants for the UP RERA portal.
//!
//! The portal has shipped at least three different listing layouts; these
//! constants pin down what each extraction tier looks for.

use std::sync::LazyLock;

use regex::Regex;
use url::Url;

/// Rows of the registered-projects grid
pub const TABLE_ROW_SELECTOR: &str = "#grdPojDetail tbody tr";

/// Cells within a grid row
pub const CELL_SELECTOR: &str = "td, th";

/// Hyperlinks carrying an href
pub const LINK_SELECTOR: &str = "a[href]";

/// Every anchor on the page, for the link-text fallback scan
pub const ANCHOR_SELECTOR: &str = "a";

/// Card-layout containers some portal revisions render instead of the grid
pub const CARD_SELECTOR: &str = ".project-card, .project-item, div[data-project]";

/// Structural hint that listing content has rendered
pub const CONTENT_SELECTOR: &str = "table, .project-list, .data-table, tbody tr";

/// Document body
pub const BODY_SELECTOR: &str = "body";

/// First-cell keywords marking a header row
pub const HEADER_KEYWORDS: [&str; 5] = ["s.no", "sr.", "serial", "project name", "rera"];

/// Href marker identifying a project detail page
pub const DETAIL_HREF_MARKER: &str = "Frm_View_Project_Details";

/// Base for resolving relative portal hrefs
pub const PORTAL_BASE: &str = "https://www.up-rera.in/";

/// Registration identifier pattern
pub static RERA_NUMBER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"UPRERAPRJ\d+").unwrap());

/// Whether an href points at a project detail page.
pub fn is_detail_href(href: &str) -> bool {
    href.contains(DETAIL_HREF_MARKER) || href.to_lowercase().contains("project")
}

/// Resolve a portal href to an absolute URL. Hrefs that fail to resolve are
/// passed through unchanged.
pub fn resolve_portal_href(href: &str) -> String {
    if href.starts_with("http") {
        return href.to_string();
    }
    Url::parse(PORTAL_BASE)
        .and_then(|base| base.join(href.trim_start_matches('/')))
        .map(|url| url.to_string())
        .unwrap_or_else(|_| href.to_string())
}

/// Synthesized detail link for a bare registration identifier.
pub fn detail_link_for(rera_number: &str) -> String {
    let digits = rera_number.trim_start_matches("UPRERAPRJ");
    format!("{PORTAL_BASE}Frm_View_Project_Details.aspx?id={digits}")
}
