// src/browser/fake.rs

//! In-memory browser fixtures.
//!
//! A [`FakePage`] is a literal map from selector strings to prepared
//! elements, plus an observation log the test keeps a handle to. No CSS
//! matching happens here; fixtures key their content by the exact selector
//! strings the engine uses.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::error::{AppError, Result};

use super::{Browser, Element, Page};

/// What a fixture page observed, shared with the test that built it.
#[derive(Debug, Default)]
pub struct PageLog {
    /// URLs passed to goto
    pub visited: Mutex<Vec<String>>,
    /// Selectors passed to find_all
    pub queried: Mutex<Vec<String>>,
    /// Selectors passed to wait_for
    pub waited: Mutex<Vec<String>>,
    /// Link texts clicked through click_link_text
    pub clicked_links: Mutex<Vec<String>>,
    /// Texts of elements clicked directly
    pub element_clicks: Mutex<Vec<String>>,
    /// Whether the session was closed
    pub closed: AtomicBool,
}

impl PageLog {
    pub fn was_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    pub fn queried_selectors(&self) -> Vec<String> {
        self.queried.lock().unwrap().clone()
    }
}

/// One prepared in-memory element.
#[derive(Debug, Clone, Default)]
pub struct FakeElement {
    text: String,
    attrs: HashMap<String, String>,
    children: HashMap<String, Vec<FakeElement>>,
    fail_text: bool,
    log: Option<Arc<PageLog>>,
}

impl FakeElement {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text(text: &str) -> Self {
        Self {
            text: text.to_string(),
            ..Self::default()
        }
    }

    pub fn attr(mut self, name: &str, value: &str) -> Self {
        self.attrs.insert(name.to_string(), value.to_string());
        self
    }

    pub fn children(mut self, selector: &str, elements: Vec<FakeElement>) -> Self {
        self.children.insert(selector.to_string(), elements);
        self
    }

    /// Make text extraction fail, simulating a detached handle.
    pub fn failing_text(mut self) -> Self {
        self.fail_text = true;
        self
    }

    fn attach_log(&mut self, log: &Arc<PageLog>) {
        self.log = Some(Arc::clone(log));
        for elements in self.children.values_mut() {
            for child in elements {
                child.attach_log(log);
            }
        }
    }
}

#[async_trait]
impl Element for FakeElement {
    async fn text(&self) -> Result<String> {
        if self.fail_text {
            return Err(AppError::browser("element detached"));
        }
        Ok(self.text.trim().to_string())
    }

    async fn attr(&self, name: &str) -> Result<Option<String>> {
        Ok(self.attrs.get(name).cloned())
    }

    async fn find_all(&self, selector: &str) -> Result<Vec<Box<dyn Element>>> {
        Ok(self
            .children
            .get(selector)
            .cloned()
            .unwrap_or_default()
            .into_iter()
            .map(|e| Box::new(e) as Box<dyn Element>)
            .collect())
    }

    async fn click(&self) -> Result<()> {
        if let Some(log) = &self.log {
            log.element_clicks.lock().unwrap().push(self.text.clone());
        }
        Ok(())
    }
}

/// One prepared in-memory page.
pub struct FakePage {
    elements: HashMap<String, Vec<FakeElement>>,
    body: String,
    clickable_links: HashSet<String>,
    present: HashSet<String>,
    goto_failure: Option<String>,
    failing_selectors: HashSet<String>,
    fail_body: bool,
    log: Arc<PageLog>,
}

impl FakePage {
    pub fn new() -> Self {
        Self {
            elements: HashMap::new(),
            body: String::new(),
            clickable_links: HashSet::new(),
            present: HashSet::new(),
            goto_failure: None,
            failing_selectors: HashSet::new(),
            fail_body: false,
            log: Arc::new(PageLog::default()),
        }
    }

    /// Elements returned for an exact find_all selector.
    pub fn with_elements(mut self, selector: &str, mut elements: Vec<FakeElement>) -> Self {
        for element in &mut elements {
            element.attach_log(&self.log);
        }
        self.elements.insert(selector.to_string(), elements);
        self
    }

    pub fn with_body(mut self, text: &str) -> Self {
        self.body = text.to_string();
        self
    }

    /// Link text for which click_link_text succeeds.
    pub fn with_clickable_link(mut self, text: &str) -> Self {
        self.clickable_links.insert(text.to_string());
        self
    }

    /// Selector for which wait_for reports a match.
    pub fn with_present(mut self, selector: &str) -> Self {
        self.present.insert(selector.to_string());
        self
    }

    pub fn with_goto_failure(mut self, message: &str) -> Self {
        self.goto_failure = Some(message.to_string());
        self
    }

    /// Make find_all fail for one selector.
    pub fn with_find_failure(mut self, selector: &str) -> Self {
        self.failing_selectors.insert(selector.to_string());
        self
    }

    pub fn with_body_failure(mut self) -> Self {
        self.fail_body = true;
        self
    }

    /// Handle to the observation log, kept by the test.
    pub fn log(&self) -> Arc<PageLog> {
        Arc::clone(&self.log)
    }
}

impl Default for FakePage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Page for FakePage {
    async fn goto(&self, url: &str) -> Result<()> {
        self.log.visited.lock().unwrap().push(url.to_string());
        match &self.goto_failure {
            Some(message) => Err(AppError::browser(message)),
            None => Ok(()),
        }
    }

    async fn click_link_text(&self, text: &str, _wait: Duration) -> Result<bool> {
        if self.clickable_links.contains(text) {
            self.log.clicked_links.lock().unwrap().push(text.to_string());
            Ok(true)
        } else {
            Ok(false)
        }
    }

    async fn wait_for(&self, selector: &str, _wait: Duration) -> Result<bool> {
        self.log.waited.lock().unwrap().push(selector.to_string());
        Ok(self.present.contains(selector))
    }

    async fn find_all(&self, selector: &str) -> Result<Vec<Box<dyn Element>>> {
        self.log.queried.lock().unwrap().push(selector.to_string());
        if self.failing_selectors.contains(selector) {
            return Err(AppError::browser(format!("query '{selector}' failed")));
        }
        Ok(self
            .elements
            .get(selector)
            .cloned()
            .unwrap_or_default()
            .into_iter()
            .map(|e| Box::new(e) as Box<dyn Element>)
            .collect())
    }

    async fn body_text(&self) -> Result<String> {
        if self.fail_body {
            return Err(AppError::browser("body text unavailable"));
        }
        Ok(self.body.clone())
    }

    async fn close(self: Box<Self>) {
        self.log.closed.store(true, Ordering::SeqCst);
    }
}

/// Hands out prepared fixture pages, one per scrape.
pub struct FakeBrowser {
    pages: Mutex<Vec<FakePage>>,
}

impl FakeBrowser {
    pub fn single(page: FakePage) -> Self {
        Self {
            pages: Mutex::new(vec![page]),
        }
    }

    /// A browser with no pages: every open fails, like a missing Chrome
    /// binary.
    pub fn unavailable() -> Self {
        Self {
            pages: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl Browser for FakeBrowser {
    async fn open_page(&self, _timeout: Duration) -> Result<Box<dyn Page>> {
        self.pages
            .lock()
            .unwrap()
            .pop()
            .map(|page| Box::new(page) as Box<dyn Page>)
            .ok_or_else(|| AppError::browser("browser unavailable"))
    }
}
