//! # Chrome Snapshot Source
//!
//! Scrapes the names of files and folders from a shared drive page rendered
//! in headless Chrome.
//!
//! [`PageScraper`] holds the scraping sequence and works with any
//! [`SessionLauncher`]; [`ChromeLauncher`] is the real browser behind it.

pub mod chrome;
pub mod scraper;
pub mod session;

pub use chrome::{ChromeLauncher, ChromeSession, ITEM_XPATH};
pub use scraper::{PageScraper, ScrapeSettings, is_item_label};
pub use session::{BrowserSession, SessionLauncher};

use drivewatch_core::config::MonitorConfig;

/// Build the snapshot source for a loaded configuration
pub fn chrome_source(config: &MonitorConfig) -> PageScraper<ChromeLauncher> {
    PageScraper::new(
        config.general.drive_url.trim(),
        ChromeLauncher::new(&config.browser),
        ScrapeSettings::from(&config.browser),
    )
}
