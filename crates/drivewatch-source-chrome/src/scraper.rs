// # Page Scraper
//
// One `snapshot()` call is one browser session:
//
// 1. open the session on the target URL
// 2. wait until at least one candidate element exists, or the wait times out
// 3. write the rendered markup to the debug file
// 4. collect candidate texts that look like item names
// 5. release the session
//
// A wait timeout is logged and the scrape continues with whatever is on the
// page. The session is released on every path once it has been opened.

use crate::session::{BrowserSession, SessionLauncher};
use async_trait::async_trait;
use drivewatch_core::config::BrowserConfig;
use drivewatch_core::error::FetchError;
use drivewatch_core::traits::{ItemSet, ItemSnapshotSource};
use std::path::PathBuf;
use std::time::Duration;

/// Whether a trimmed element text looks like a file or folder name
///
/// Folders carry the literal `Folder` marker; files are recognised by a
/// period, standing in for an extension.
pub fn is_item_label(text: &str) -> bool {
    text.contains("Folder") || text.contains('.')
}

/// Timing and output settings for a scrape
#[derive(Debug, Clone)]
pub struct ScrapeSettings {
    /// Maximum wait for the first candidate element
    pub wait_timeout: Duration,
    /// Delay between checks while waiting
    pub wait_poll: Duration,
    /// Where the rendered markup is written on every scrape
    pub debug_page_path: PathBuf,
}

impl From<&BrowserConfig> for ScrapeSettings {
    fn from(config: &BrowserConfig) -> Self {
        Self {
            wait_timeout: config.wait_timeout(),
            wait_poll: config.wait_poll(),
            debug_page_path: config.debug_page_path.clone(),
        }
    }
}

/// Snapshot source that scrapes item names from a rendered page
pub struct PageScraper<L> {
    url: String,
    launcher: L,
    settings: ScrapeSettings,
}

impl<L: SessionLauncher> PageScraper<L> {
    pub fn new(url: impl Into<String>, launcher: L, settings: ScrapeSettings) -> Self {
        Self {
            url: url.into(),
            launcher,
            settings,
        }
    }

    /// Target page
    pub fn url(&self) -> &str {
        &self.url
    }

    async fn scrape(&self, session: &mut dyn BrowserSession) -> Result<ItemSet, FetchError> {
        if !self.wait_for_candidates(session).await {
            tracing::error!(
                "Timed out after {:?} waiting for items to load on {}",
                self.settings.wait_timeout,
                self.url
            );
        }

        self.dump_markup(session).await;

        let items: ItemSet = session
            .candidate_texts()
            .await?
            .iter()
            .map(|text| text.trim())
            .filter(|text| !text.is_empty() && is_item_label(text))
            .map(str::to_string)
            .collect();

        Ok(items)
    }

    /// Returns false if the timeout elapsed with nothing on the page
    ///
    /// Read errors while the page is still loading are retried until the
    /// timeout; only the extraction after the wait may fail the scrape.
    async fn wait_for_candidates(&self, session: &mut dyn BrowserSession) -> bool {
        let poll = self.settings.wait_poll;
        let wait = async {
            loop {
                match session.candidate_texts().await {
                    Ok(texts) if !texts.is_empty() => return,
                    Ok(_) => {}
                    Err(e) => tracing::debug!("Page not ready yet: {}", e),
                }
                tokio::time::sleep(poll).await;
            }
        };

        tokio::time::timeout(self.settings.wait_timeout, wait)
            .await
            .is_ok()
    }

    async fn dump_markup(&self, session: &mut dyn BrowserSession) {
        let path = &self.settings.debug_page_path;
        match session.page_markup().await {
            Ok(markup) => {
                if let Err(e) = tokio::fs::write(path, markup).await {
                    tracing::warn!("Failed to write page dump to {}: {}", path.display(), e);
                }
            }
            Err(e) => tracing::warn!("Failed to read page markup: {}", e),
        }
    }
}

#[async_trait]
impl<L: SessionLauncher> ItemSnapshotSource for PageScraper<L> {
    async fn snapshot(&self) -> Result<ItemSet, FetchError> {
        tracing::info!("Loading page: {}", self.url);
        let mut session = self.launcher.open(&self.url).await?;

        let result = self.scrape(session.as_mut()).await;
        session.release().await;

        result
    }

    fn source_name(&self) -> &'static str {
        "chrome"
    }
}
