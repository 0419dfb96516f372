// src/browser/mod.rs

//! Browser automation capability.
//!
//! The extraction engine drives pages only through these traits, so its
//! fallback logic runs identically against a real Chrome session or an
//! in-memory fixture. One [`Browser`] acts as a session factory; a session
//! is a single [`Page`] that must be closed on every exit path.

#[cfg(feature = "browser")]
mod chromium;
#[cfg(test)]
pub mod fake;

use std::time::Duration;

use async_trait::async_trait;

use crate::error::Result;

#[cfg(feature = "browser")]
pub use chromium::ChromiumBrowser;

/// Session factory. Opening a page launches and owns everything the session
/// needs; closing the page releases it all.
#[async_trait]
pub trait Browser: Send + Sync {
    /// Open a fresh page with the given navigation/operation timeout.
    async fn open_page(&self, timeout: Duration) -> Result<Box<dyn Page>>;
}

/// One live page of a browser session.
#[async_trait]
pub trait Page: Send + Sync {
    /// Navigate to a URL and wait for the document to load.
    async fn goto(&self, url: &str) -> Result<()>;

    /// Click the first link whose exact trimmed text matches, retrying
    /// until `wait` elapses. Returns whether a link was clicked.
    async fn click_link_text(&self, text: &str, wait: Duration) -> Result<bool>;

    /// Wait until `selector` matches at least one element or `wait`
    /// elapses. Returns whether a match appeared. Never fails on timeout.
    async fn wait_for(&self, selector: &str, wait: Duration) -> Result<bool>;

    /// All elements currently matching `selector`, in document order.
    async fn find_all(&self, selector: &str) -> Result<Vec<Box<dyn Element>>>;

    /// Visible text of the document body.
    async fn body_text(&self) -> Result<String>;

    /// Tear the session down. Teardown problems are logged, never raised.
    async fn close(self: Box<Self>);
}

/// A handle to one element of a live page.
#[async_trait]
pub trait Element: Send + Sync {
    /// Trimmed visible text of the element.
    async fn text(&self) -> Result<String>;

    /// Attribute value, if present.
    async fn attr(&self, name: &str) -> Result<Option<String>>;

    /// Descendant elements matching `selector`, in document order.
    async fn find_all(&self, selector: &str) -> Result<Vec<Box<dyn Element>>>;

    /// Scroll into view and click.
    async fn click(&self) -> Result<()>;
}
