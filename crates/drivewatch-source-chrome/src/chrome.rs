// # Chrome Sessions
//
// Launches a headless Chrome per session through the DevTools protocol.
//
// ## Session Lifecycle
//
// - `open()` starts the browser, spawns the protocol handler task and loads
//   the page
// - `release()` closes the browser, reaps the process and stops the handler
//
// If navigation fails the browser is closed before the error is returned.

use crate::session::{BrowserSession, SessionLauncher};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig as LaunchConfig};
use chromiumoxide::handler::Handler;
use chromiumoxide::page::Page;
use drivewatch_core::config::BrowserConfig;
use drivewatch_core::error::FetchError;
use std::path::PathBuf;
use tokio::task::JoinHandle;
use tokio_stream::StreamExt;

/// XPath selecting spans that may name an item
pub const ITEM_XPATH: &str = "//span[contains(text(), 'Folder') or contains(text(), '.')]";

/// Switches passed to every launch besides the sandbox and profile settings
const BASE_ARGS: &[&str] = &["--disable-gpu", "--disable-dev-shm-usage"];

/// Launches a fresh headless Chrome for every session
#[derive(Debug, Clone)]
pub struct ChromeLauncher {
    profile_dir: PathBuf,
    chrome_executable: Option<PathBuf>,
    extra_args: Vec<String>,
}

impl ChromeLauncher {
    pub fn new(config: &BrowserConfig) -> Self {
        Self {
            profile_dir: config.profile_dir.clone(),
            chrome_executable: config.chrome_executable.clone(),
            extra_args: config.extra_args.clone(),
        }
    }

    fn launch_config(&self) -> Result<LaunchConfig, FetchError> {
        let mut builder = LaunchConfig::builder()
            .no_sandbox()
            .user_data_dir(&self.profile_dir)
            .args(BASE_ARGS.iter().copied())
            .args(self.extra_args.iter().map(String::as_str));

        if let Some(executable) = &self.chrome_executable {
            builder = builder.chrome_executable(executable);
        }

        builder.build().map_err(FetchError::launch)
    }
}

#[async_trait]
impl SessionLauncher for ChromeLauncher {
    async fn open(&self, url: &str) -> Result<Box<dyn BrowserSession>, FetchError> {
        let (browser, handler) = Browser::launch(self.launch_config()?)
            .await
            .map_err(|e| FetchError::launch(e.to_string()))?;

        let mut session = ChromeSession {
            browser,
            handler: Some(spawn_handler(handler)),
            page: None,
        };

        match session.browser.new_page(url).await {
            Ok(page) => {
                session.page = Some(page);
                Ok(Box::new(session))
            }
            Err(e) => {
                session.release().await;
                Err(FetchError::navigation(url, e.to_string()))
            }
        }
    }
}

/// Drive the protocol connection until the browser goes away
fn spawn_handler(mut handler: Handler) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = handler.next().await {
            if let Err(e) = event {
                tracing::debug!("Browser handler error: {}", e);
            }
        }
    })
}

/// A running Chrome with one page open
pub struct ChromeSession {
    browser: Browser,
    handler: Option<JoinHandle<()>>,
    page: Option<Page>,
}

impl ChromeSession {
    fn page(&self) -> Result<&Page, FetchError> {
        self.page
            .as_ref()
            .ok_or_else(|| FetchError::extraction("session has no open page"))
    }
}

/// Evaluates to a JSON array with the text of every `ITEM_XPATH` match
///
/// Uses `var` so the script can run repeatedly in the same page.
fn candidate_script() -> String {
    format!(
        r#"var found = document.evaluate("{}", document, null,
            XPathResult.ORDERED_NODE_SNAPSHOT_TYPE, null);
        var texts = [];
        for (var i = 0; i < found.snapshotLength; i++) {{
            texts.push(found.snapshotItem(i).innerText || "");
        }}
        JSON.stringify(texts);"#,
        ITEM_XPATH
    )
}

#[async_trait]
impl BrowserSession for ChromeSession {
    async fn candidate_texts(&mut self) -> Result<Vec<String>, FetchError> {
        let encoded: String = self
            .page()?
            .evaluate(candidate_script())
            .await
            .map_err(|e| FetchError::extraction(e.to_string()))?
            .into_value()
            .map_err(|e| FetchError::extraction(e.to_string()))?;

        serde_json::from_str(&encoded).map_err(|e| FetchError::extraction(e.to_string()))
    }

    async fn page_markup(&mut self) -> Result<String, FetchError> {
        self.page()?
            .content()
            .await
            .map_err(|e| FetchError::extraction(e.to_string()))
    }

    async fn release(&mut self) {
        self.page = None;

        if let Err(e) = self.browser.close().await {
            tracing::warn!("Failed to close browser: {}", e);
        }
        if let Err(e) = self.browser.wait().await {
            tracing::warn!("Failed to reap browser process: {}", e);
        }
        if let Some(handler) = self.handler.take() {
            handler.abort();
            let _ = handler.await;
        }

        tracing::debug!("Browser session released");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_launch_config_from_browser_section() {
        let config = BrowserConfig {
            chrome_executable: Some(PathBuf::from("/usr/bin/chromium")),
            extra_args: vec!["--lang=en-US".to_string()],
            ..BrowserConfig::default()
        };
        let launcher = ChromeLauncher::new(&config);

        assert_eq!(launcher.profile_dir, PathBuf::from("/tmp/chrome-user-data"));
        assert!(launcher.launch_config().is_ok());
    }

    #[test]
    fn test_candidate_script_embeds_xpath() {
        let script = candidate_script();
        assert!(script.contains(ITEM_XPATH));
        assert!(script.contains("JSON.stringify"));
        assert!(script.contains("innerText"));
    }
}
