// src/scrape/engine.rs

//! Drives a browser session through the portal and runs the extraction
//! cascade. One `scrape` call is one browser session and one `ScrapeRun`.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;

use crate::browser::{Browser, Page};
use crate::config::ScrapeConfig;
use crate::error::{AppError, Result};
use crate::models::{ProjectRecord, ScrapeRun, new_run_id};

use super::selectors::{ANCHOR_SELECTOR, BODY_SELECTOR, CONTENT_SELECTOR};
use super::tiers;

pub struct ProjectScraper {
    browser: Arc<dyn Browser>,
    config: ScrapeConfig,
}

impl ProjectScraper {
    pub fn new(browser: Arc<dyn Browser>, config: ScrapeConfig) -> Self {
        Self { browser, config }
    }

    /// Run one full scrape. Never returns an error: every failure mode is
    /// folded into a failed `ScrapeRun` so the caller can always hand off.
    pub async fn scrape(&self, max_records: usize, timeout: Duration) -> ScrapeRun {
        let run_id = new_run_id();
        let started_at = Utc::now();
        log::info!("Starting scrape [run_id={run_id}, max_records={max_records}]");

        let page = match self.browser.open_page(timeout).await {
            Ok(page) => page,
            Err(e) => {
                log::error!("Could not open a browser page: {e}");
                return ScrapeRun::failure(run_id, started_at, &e);
            }
        };

        let outcome = self.drive(page.as_ref(), max_records).await;
        page.close().await;

        match outcome {
            Ok(records) => {
                match records.first().and_then(|r| r.extraction_strategy) {
                    Some(strategy) => log::info!(
                        "Completed scrape [run_id={run_id}]: {} records via {}",
                        records.len(),
                        strategy.as_str()
                    ),
                    None => log::info!("Completed scrape [run_id={run_id}] with no records"),
                }
                ScrapeRun::success(run_id, started_at, records)
            }
            Err(e) => {
                log::error!("Scrape failed [run_id={run_id}]: {e}");
                ScrapeRun::failure(run_id, started_at, &e)
            }
        }
    }

    async fn drive(&self, page: &dyn Page, max_records: usize) -> Result<Vec<ProjectRecord>> {
        self.navigate(page).await?;
        self.await_listing_content(page).await;

        let page_text = match page.body_text().await {
            Ok(text) => text,
            Err(e) => {
                log::warn!("Could not read page text: {e}");
                String::new()
            }
        };
        log::info!("Page text: {} chars", page_text.chars().count());

        let records = tiers::extract_table_rows(page, max_records).await?;
        if !records.is_empty() {
            return Ok(records);
        }

        log::info!("No grid rows retained, trying card layout");
        let records = tiers::extract_cards(page, max_records).await?;
        if !records.is_empty() {
            return Ok(records);
        }

        log::info!("No cards retained, mining page text");
        let records = tiers::extract_page_text(&page_text, max_records);
        if records.is_empty() {
            log::warn!("All extraction tiers exhausted without a retained record");
        }
        Ok(records)
    }

    /// Open the entry page and click through to the registered-project
    /// listing. The text-matched click is tried first for each casing
    /// variant; a raw anchor scan is the fallback. Running out of
    /// candidates is fatal.
    async fn navigate(&self, page: &dyn Page) -> Result<()> {
        page.goto(&self.config.entry_url).await?;
        log::info!("Opened {}", self.config.entry_url);
        sleep_ms(self.config.settle_delay_ms).await;

        let variants = self.config.listing_link_variants();
        let click_wait = Duration::from_secs(self.config.link_click_timeout_secs);

        for variant in &variants {
            if page.click_link_text(variant, click_wait).await? {
                log::info!("Opened listing via link '{variant}'");
                sleep_ms(self.config.post_click_delay_ms).await;
                return Ok(());
            }
        }

        // Some portal builds render the link without an accessible role,
        // so fall back to matching raw anchors by trimmed text.
        for anchor in page.find_all(ANCHOR_SELECTOR).await? {
            let text = match anchor.text().await {
                Ok(text) => text,
                Err(_) => continue,
            };
            if !variants.iter().any(|v| v == text.trim()) {
                continue;
            }
            match anchor.click().await {
                Ok(()) => {
                    log::info!("Opened listing via anchor '{}'", text.trim());
                    sleep_ms(self.config.post_click_delay_ms).await;
                    return Ok(());
                }
                Err(e) => {
                    log::debug!("Anchor '{}' did not click: {e}", text.trim());
                }
            }
        }

        Err(AppError::NavigationTargetNotFound(
            self.config.listing_link_text.clone(),
        ))
    }

    /// Staged wait for the listing to render. Never fails: each stage
    /// shortens expectations, and the last resort is a plain delay.
    async fn await_listing_content(&self, page: &dyn Page) {
        let content_wait = Duration::from_secs(self.config.content_wait_secs);
        if page
            .wait_for(CONTENT_SELECTOR, content_wait)
            .await
            .unwrap_or(false)
        {
            log::info!("Listing content present");
            return;
        }

        log::warn!("Listing content selector never matched, waiting on body");
        let body_wait = Duration::from_secs(self.config.body_wait_secs);
        if page
            .wait_for(BODY_SELECTOR, body_wait)
            .await
            .unwrap_or(false)
        {
            sleep_ms(self.config.render_grace_ms).await;
            return;
        }

        log::warn!("Body never appeared, giving the page a final grace period");
        sleep_ms(self.config.last_resort_wait_ms).await;
    }
}

async fn sleep_ms(ms: u64) {
    if ms > 0 {
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::fake::{FakeBrowser, FakeElement, FakePage, PageLog};
    use crate::models::{ExtractionStrategy, RunStatus};
    use crate::scrape::selectors::{CARD_SELECTOR, CELL_SELECTOR, TABLE_ROW_SELECTOR};

    const LINK_TEXT: &str = "Registered Projects";

    /// All waits zeroed so tests run instantly.
    fn test_config() -> ScrapeConfig {
        ScrapeConfig {
            settle_delay_ms: 0,
            post_click_delay_ms: 0,
            link_click_timeout_secs: 0,
            content_wait_secs: 0,
            body_wait_secs: 0,
            render_grace_ms: 0,
            last_resort_wait_ms: 0,
            ..ScrapeConfig::default()
        }
    }

    fn grid_row(cells: &[&str]) -> FakeElement {
        let cells = cells
            .iter()
            .map(|text| FakeElement::with_text(text))
            .collect();
        FakeElement::new().children(CELL_SELECTOR, cells)
    }

    fn listing_page() -> FakePage {
        FakePage::new()
            .with_clickable_link(LINK_TEXT)
            .with_present(CONTENT_SELECTOR)
    }

    async fn scrape_with(page: FakePage, max_records: usize) -> (ScrapeRun, Arc<PageLog>) {
        let log = page.log();
        let scraper = ProjectScraper::new(Arc::new(FakeBrowser::single(page)), test_config());
        let run = scraper.scrape(max_records, Duration::from_secs(5)).await;
        (run, log)
    }

    #[tokio::test]
    async fn grid_rows_win_over_cards() {
        let page = listing_page()
            .with_elements(
                TABLE_ROW_SELECTOR,
                vec![grid_row(&["1", "Acme", "Green Meadows", "UPRERAPRJ1"])],
            )
            .with_elements(
                CARD_SELECTOR,
                vec![FakeElement::with_text("UPRERAPRJ77 card")],
            );

        let (run, log) = scrape_with(page, 10).await;
        assert!(run.succeeded());
        assert_eq!(run.records.len(), 1);
        assert_eq!(
            run.records[0].extraction_strategy,
            Some(ExtractionStrategy::TableRows)
        );
        assert!(!log.queried_selectors().contains(&CARD_SELECTOR.to_string()));
    }

    #[tokio::test]
    async fn scrape_caps_and_orders_records() {
        let mut rows = vec![grid_row(&["S.No", "Promoter Name", "Project Name"])];
        for i in 1..=5 {
            rows.push(grid_row(&[
                &i.to_string(),
                "Acme",
                &format!("Project {i}"),
                &format!("UPRERAPRJ{i}"),
            ]));
        }
        let page = listing_page().with_elements(TABLE_ROW_SELECTOR, rows);

        let (run, log) = scrape_with(page, 2).await;
        assert!(run.succeeded());
        assert_eq!(run.records.len(), 2);
        assert_eq!(run.records[0].project_name, "Project 1");
        assert_eq!(run.records[1].project_name, "Project 2");
        assert!(log.was_closed());
    }

    #[tokio::test]
    async fn falls_back_to_cards_when_grid_is_empty() {
        let card = FakeElement::with_text("Towers UPRERAPRJ42");
        let page = listing_page().with_elements(CARD_SELECTOR, vec![card]);

        let (run, _) = scrape_with(page, 10).await;
        assert!(run.succeeded());
        assert_eq!(run.records.len(), 1);
        assert_eq!(run.records[0].rera_number, "UPRERAPRJ42");
        assert_eq!(
            run.records[0].extraction_strategy,
            Some(ExtractionStrategy::Cards)
        );
    }

    #[tokio::test]
    async fn falls_back_to_text_mining_when_no_elements_match() {
        let page = listing_page().with_body("see UPRERAPRJ8 and UPRERAPRJ9 and UPRERAPRJ8");

        let (run, _) = scrape_with(page, 10).await;
        assert!(run.succeeded());
        assert_eq!(run.records.len(), 2);
        assert_eq!(run.records[0].rera_number, "UPRERAPRJ8");
        assert_eq!(run.records[1].rera_number, "UPRERAPRJ9");
        assert_eq!(
            run.records[0].extraction_strategy,
            Some(ExtractionStrategy::PageText)
        );
        assert!(!run.records[0].note.is_empty());
    }

    #[tokio::test]
    async fn empty_page_is_a_successful_empty_run() {
        let (run, log) = scrape_with(listing_page(), 10).await;
        assert!(run.succeeded());
        assert!(run.records.is_empty());
        assert!(log.was_closed());
    }

    #[tokio::test]
    async fn missing_listing_link_fails_the_run() {
        let page = FakePage::new().with_present(CONTENT_SELECTOR);

        let (run, log) = scrape_with(page, 10).await;
        assert_eq!(run.status, RunStatus::Failed);
        let failure = run.error.unwrap();
        assert!(failure.message.contains(LINK_TEXT));
        assert!(log.was_closed());
    }

    #[tokio::test]
    async fn anchor_scan_rescues_navigation() {
        let anchor = FakeElement::with_text("  REGISTERED PROJECTS  ");
        let page = FakePage::new()
            .with_elements(ANCHOR_SELECTOR, vec![anchor])
            .with_present(CONTENT_SELECTOR)
            .with_elements(
                TABLE_ROW_SELECTOR,
                vec![grid_row(&["1", "Acme", "Green Meadows", "UPRERAPRJ1"])],
            );

        let (run, log) = scrape_with(page, 10).await;
        assert!(run.succeeded());
        assert_eq!(run.records.len(), 1);
        let clicks = log.element_clicks.lock().unwrap().clone();
        assert_eq!(clicks, vec!["  REGISTERED PROJECTS  ".to_string()]);
    }

    #[tokio::test]
    async fn goto_failure_fails_the_run_and_closes_the_page() {
        let page = FakePage::new().with_goto_failure("net::ERR_NAME_NOT_RESOLVED");

        let (run, log) = scrape_with(page, 10).await;
        assert_eq!(run.status, RunStatus::Failed);
        assert!(run.error.unwrap().message.contains("ERR_NAME_NOT_RESOLVED"));
        assert!(log.was_closed());
    }

    #[tokio::test]
    async fn unreadable_body_text_does_not_fail_the_run() {
        let page = listing_page()
            .with_body_failure()
            .with_elements(
                TABLE_ROW_SELECTOR,
                vec![grid_row(&["1", "Acme", "Green Meadows", "UPRERAPRJ1"])],
            );

        let (run, _) = scrape_with(page, 10).await;
        assert!(run.succeeded());
        assert_eq!(run.records.len(), 1);
    }

    #[tokio::test]
    async fn unavailable_browser_fails_the_run() {
        let scraper =
            ProjectScraper::new(Arc::new(FakeBrowser::unavailable()), test_config());
        let run = scraper.scrape(10, Duration::from_secs(5)).await;
        assert_eq!(run.status, RunStatus::Failed);
        assert!(run.error.is_some());
    }

    #[tokio::test]
    async fn grid_query_failure_fails_the_run() {
        let page = listing_page().with_find_failure(TABLE_ROW_SELECTOR);

        let (run, log) = scrape_with(page, 10).await;
        assert_eq!(run.status, RunStatus::Failed);
        assert!(log.was_closed());
    }
}
