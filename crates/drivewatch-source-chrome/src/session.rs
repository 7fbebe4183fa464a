//! Browser session seam
//!
//! [`PageScraper`](crate::PageScraper) drives a page through these traits so
//! the wait/extract/release sequence does not depend on a real browser.

use async_trait::async_trait;
use drivewatch_core::error::FetchError;

/// Opens a browser session already navigated to a URL
#[async_trait]
pub trait SessionLauncher: Send + Sync {
    /// Start a browser and load `url`
    ///
    /// On error no session exists and nothing needs to be released.
    async fn open(&self, url: &str) -> Result<Box<dyn BrowserSession>, FetchError>;
}

/// A live page in a browser
#[async_trait]
pub trait BrowserSession: Send {
    /// Raw text of every element that may name an item, untrimmed
    async fn candidate_texts(&mut self) -> Result<Vec<String>, FetchError>;

    /// Full rendered markup of the page
    async fn page_markup(&mut self) -> Result<String, FetchError>;

    /// Shut the browser down
    ///
    /// Called exactly once per session. Failures are logged, not returned.
    async fn release(&mut self);
}
