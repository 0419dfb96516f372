// src/scrape/tiers.rs

//! The three extraction tiers, highest fidelity first.
//!
//! Each tier caps at `max_records` *retained* records and applies the same
//! retention rule: a record must carry a project name or a registration
//! identifier. Per-item failures are logged and skipped; only whole-tier
//! query failures propagate.

use std::collections::HashSet;

use crate::browser::{Element, Page};
use crate::error::Result;
use crate::models::{ExtractionStrategy, ProjectRecord};

use super::selectors::{
    CARD_SELECTOR, CELL_SELECTOR, HEADER_KEYWORDS, LINK_SELECTOR, RERA_NUMBER,
    TABLE_ROW_SELECTOR, detail_link_for, is_detail_href, resolve_portal_href,
};

/// Card tier keeps this much raw text as its unstructured payload.
const RAW_TEXT_LIMIT: usize = 200;

/// Caveat attached to records synthesized from bare identifiers.
const TEXT_MINING_NOTE: &str =
    "Only RERA number extracted. Visit detail_link for full information.";

/// Tier 1: structured rows from the listing grid.
pub async fn extract_table_rows(
    page: &dyn Page,
    max_records: usize,
) -> Result<Vec<ProjectRecord>> {
    let rows = page.find_all(TABLE_ROW_SELECTOR).await?;
    log::info!("Found {} rows in the projects grid", rows.len());

    let mut records = Vec::new();
    for (idx, row) in rows.iter().enumerate() {
        if records.len() >= max_records {
            break;
        }
        match extract_row(row.as_ref()).await {
            Ok(Some(record)) if record.has_identity() => records.push(record),
            Ok(_) => {}
            Err(e) => log::warn!("Skipping row {idx}: {e}"),
        }
    }
    Ok(records)
}

/// One grid row. `None` for header, empty and too-short rows.
async fn extract_row(row: &dyn Element) -> Result<Option<ProjectRecord>> {
    let cells = row.find_all(CELL_SELECTOR).await?;
    if cells.len() < 2 {
        return Ok(None);
    }

    let mut cell_texts = Vec::with_capacity(cells.len());
    for cell in &cells {
        cell_texts.push(cell.text().await?);
    }
    if cell_texts.iter().all(|text| text.is_empty()) {
        return Ok(None);
    }

    let first_cell = cell_texts[0].to_lowercase();
    if HEADER_KEYWORDS.iter().any(|kw| first_cell.contains(kw)) {
        log::debug!("Header row: {:?}", &cell_texts[..cell_texts.len().min(3)]);
        return Ok(None);
    }

    let (detail_link, link_rera) = row_detail_link(row).await?;

    // Grid columns: S.No, Promoter, Project Name, RERA Reg.No., Type,
    // District, Start, End, Registration Date
    let cell = |idx: usize| cell_texts.get(idx).cloned().unwrap_or_default();
    let mut record = ProjectRecord::tagged(ExtractionStrategy::TableRows);
    record.serial_no = cell(0);
    record.promoter_name = cell(1);
    record.project_name = cell(2);
    // The identifier parsed from link text beats the positional cell
    record.rera_number = if link_rera.is_empty() { cell(3) } else { link_rera };
    record.project_type = cell(4);
    record.district = cell(5);
    record.start_date = cell(6);
    record.end_date = cell(7);
    record.registration_date = cell(8);
    record.detail_link = detail_link;

    Ok(Some(record))
}

/// First detail-page link of a row, plus any identifier found in its text.
async fn row_detail_link(row: &dyn Element) -> Result<(String, String)> {
    for link in row.find_all(LINK_SELECTOR).await? {
        let Some(href) = link.attr("href").await? else {
            continue;
        };
        if !is_detail_href(&href) {
            continue;
        }

        let detail_link = resolve_portal_href(&href);
        let link_text = link.text().await?;
        let rera = RERA_NUMBER
            .find(&link_text)
            .map(|m| m.as_str().to_string())
            .unwrap_or_default();
        return Ok((detail_link, rera));
    }
    Ok((String::new(), String::new()))
}

/// Tier 2: card/div layout.
pub async fn extract_cards(page: &dyn Page, max_records: usize) -> Result<Vec<ProjectRecord>> {
    let cards = page.find_all(CARD_SELECTOR).await?;
    log::info!("Found {} card elements", cards.len());

    let mut records = Vec::new();
    for (idx, card) in cards.iter().enumerate() {
        if records.len() >= max_records {
            break;
        }
        match extract_card(card.as_ref()).await {
            Ok(record) if record.has_identity() => records.push(record),
            Ok(_) => {}
            Err(e) => log::warn!("Skipping card {idx}: {e}"),
        }
    }
    Ok(records)
}

async fn extract_card(card: &dyn Element) -> Result<ProjectRecord> {
    let text = card.text().await?;

    let mut detail_link = String::new();
    if let Some(link) = card.find_all(LINK_SELECTOR).await?.into_iter().next() {
        if let Some(href) = link.attr("href").await? {
            detail_link = resolve_portal_href(&href);
        }
    }

    let mut record = ProjectRecord::tagged(ExtractionStrategy::Cards);
    record.rera_number = RERA_NUMBER
        .find(&text)
        .map(|m| m.as_str().to_string())
        .unwrap_or_default();
    record.detail_link = detail_link;
    record.raw_text = text.chars().take(RAW_TEXT_LIMIT).collect();

    Ok(record)
}

/// Tier 3: mine identifiers out of the rendered page text. Matches are
/// deduplicated in first-seen order; each synthesized record carries a
/// constructed detail link and a caveat note.
pub fn extract_page_text(page_text: &str, max_records: usize) -> Vec<ProjectRecord> {
    let mut seen = HashSet::new();
    let mut records = Vec::new();

    for m in RERA_NUMBER.find_iter(page_text) {
        if records.len() >= max_records {
            break;
        }
        let rera = m.as_str().to_string();
        if !seen.insert(rera.clone()) {
            continue;
        }

        let mut record = ProjectRecord::tagged(ExtractionStrategy::PageText);
        record.detail_link = detail_link_for(&rera);
        record.rera_number = rera;
        record.note = TEXT_MINING_NOTE.to_string();
        records.push(record);
    }

    log::info!("Mined {} unique identifiers from page text", records.len());
    records
}
