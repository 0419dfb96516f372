// src/browser/chromium.rs

//! Chrome-backed browser sessions via the DevTools protocol.
//!
//! Each opened page launches its own headless Chrome process; closing the
//! page tears the whole process down. The portal is fragile under shared
//! sessions, so nothing is pooled or reused.

use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::browser::{Browser as CdpBrowser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::network::SetUserAgentOverrideParams;
use chromiumoxide::element::Element as CdpElement;
use chromiumoxide::page::Page as CdpPage;
use futures::StreamExt;
use tokio::task::JoinHandle;

use crate::error::{AppError, Result};

use super::{Browser, Element, Page};

/// Chrome flags the portal tolerates best in containerized environments:
/// /dev/shm is tiny in containers and the GPU/process split only costs
/// memory for a single-page session.
const LAUNCH_ARGS: [&str; 3] = ["--disable-dev-shm-usage", "--disable-gpu", "--single-process"];

const WINDOW_WIDTH: u32 = 1280;
const WINDOW_HEIGHT: u32 = 720;

/// How often polling waits re-check the DOM.
const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Launches one headless Chrome process per session.
pub struct ChromiumBrowser {
    user_agent: String,
}

impl ChromiumBrowser {
    pub fn new(user_agent: impl Into<String>) -> Self {
        Self {
            user_agent: user_agent.into(),
        }
    }
}

#[async_trait]
impl Browser for ChromiumBrowser {
    async fn open_page(&self, timeout: Duration) -> Result<Box<dyn Page>> {
        let config = BrowserConfig::builder()
            .no_sandbox()
            .window_size(WINDOW_WIDTH, WINDOW_HEIGHT)
            .request_timeout(timeout)
            .args(LAUNCH_ARGS)
            .build()
            .map_err(AppError::Browser)?;

        let (browser, mut handler) = CdpBrowser::launch(config)
            .await
            .map_err(AppError::browser)?;

        // Pump CDP events for the lifetime of the session
        let driver = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                let _ = event;
            }
        });

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(AppError::browser)?;
        page.set_user_agent(SetUserAgentOverrideParams::new(self.user_agent.clone()))
            .await
            .map_err(AppError::browser)?;

        Ok(Box::new(ChromiumPage {
            browser,
            page,
            driver,
            nav_timeout: timeout,
        }))
    }
}

/// One live Chrome page plus the process and event pump behind it.
struct ChromiumPage {
    browser: CdpBrowser,
    page: CdpPage,
    driver: JoinHandle<()>,
    nav_timeout: Duration,
}

impl ChromiumPage {
    /// Snapshot of anchors whose exact trimmed text matches.
    async fn link_by_text(&self, text: &str) -> Option<CdpElement> {
        let links = self.page.find_elements("a").await.ok()?;
        for link in links {
            if let Ok(Some(inner)) = link.inner_text().await {
                if inner.trim() == text {
                    return Some(link);
                }
            }
        }
        None
    }
}

#[async_trait]
impl Page for ChromiumPage {
    async fn goto(&self, url: &str) -> Result<()> {
        match tokio::time::timeout(self.nav_timeout, self.page.goto(url)).await {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(e)) => Err(AppError::browser(e)),
            Err(_) => Err(AppError::browser(format!(
                "navigation to {url} timed out after {}s",
                self.nav_timeout.as_secs()
            ))),
        }
    }

    async fn click_link_text(&self, text: &str, wait: Duration) -> Result<bool> {
        let deadline = tokio::time::Instant::now() + wait;
        loop {
            if let Some(link) = self.link_by_text(text).await {
                match link.click().await {
                    Ok(_) => return Ok(true),
                    // The portal re-renders its menus; a detached handle
                    // just means retry on the next poll
                    Err(e) => log::debug!("Click on '{text}' failed: {e}"),
                }
            }
            if tokio::time::Instant::now() >= deadline {
                return Ok(false);
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    async fn wait_for(&self, selector: &str, wait: Duration) -> Result<bool> {
        let deadline = tokio::time::Instant::now() + wait;
        loop {
            match self.page.find_elements(selector).await {
                Ok(found) if !found.is_empty() => return Ok(true),
                Ok(_) => {}
                Err(e) => log::debug!("Probe for '{selector}' failed: {e}"),
            }
            if tokio::time::Instant::now() >= deadline {
                return Ok(false);
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    async fn find_all(&self, selector: &str) -> Result<Vec<Box<dyn Element>>> {
        let elements = self
            .page
            .find_elements(selector)
            .await
            .map_err(AppError::browser)?;
        Ok(elements
            .into_iter()
            .map(|inner| Box::new(ChromiumElement { inner }) as Box<dyn Element>)
            .collect())
    }

    async fn body_text(&self) -> Result<String> {
        let mut bodies = self
            .page
            .find_elements("body")
            .await
            .map_err(AppError::browser)?;
        let Some(body) = bodies.pop() else {
            return Ok(String::new());
        };
        let text = body.inner_text().await.map_err(AppError::browser)?;
        Ok(text.unwrap_or_default())
    }

    async fn close(self: Box<Self>) {
        let ChromiumPage {
            page,
            mut browser,
            driver,
            ..
        } = *self;

        if let Err(e) = page.close().await {
            log::debug!("Page close failed: {e}");
        }
        if let Err(e) = browser.close().await {
            log::warn!("Browser close failed: {e}");
        }
        if let Err(e) = browser.wait().await {
            log::debug!("Browser process wait failed: {e}");
        }
        driver.abort();
    }
}

struct ChromiumElement {
    inner: CdpElement,
}

#[async_trait]
impl Element for ChromiumElement {
    async fn text(&self) -> Result<String> {
        let text = self.inner.inner_text().await.map_err(AppError::browser)?;
        Ok(text.unwrap_or_default().trim().to_string())
    }

    async fn attr(&self, name: &str) -> Result<Option<String>> {
        self.inner.attribute(name).await.map_err(AppError::browser)
    }

    async fn find_all(&self, selector: &str) -> Result<Vec<Box<dyn Element>>> {
        let elements = self
            .inner
            .find_elements(selector)
            .await
            .map_err(AppError::browser)?;
        Ok(elements
            .into_iter()
            .map(|inner| Box::new(ChromiumElement { inner }) as Box<dyn Element>)
            .collect())
    }

    async fn click(&self) -> Result<()> {
        self.inner.click().await.map_err(AppError::browser)?;
        Ok(())
    }
}
