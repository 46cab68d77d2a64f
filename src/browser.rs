use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures_util::StreamExt;
use tokio::task::JoinHandle;
use tracing::{debug, error};

/// The slice of a browser tab the crawler needs.
///
/// Every call blocks the run until it finishes; nothing is issued
/// concurrently on the same page.
#[async_trait]
pub trait DocPage: Send + Sync {
    /// Loads `url`, failing if it takes longer than `timeout`.
    async fn navigate(&self, url: &str, timeout: Duration) -> Result<()>;
    /// Returns once the DOM has been parsed (not necessarily fully loaded).
    async fn wait_for_dom_ready(&self, timeout: Duration) -> Result<()>;
    /// Runs a JavaScript expression in the page and returns its JSON value.
    async fn evaluate(&self, script: &str) -> Result<serde_json::Value>;
    /// URL after redirects.
    async fn current_url(&self) -> Result<String>;
    async fn current_title(&self) -> Result<Option<String>>;
    async fn rendered_html(&self) -> Result<String>;
    async fn wait(&self, duration: Duration);
}

const READY_STATE_POLL: Duration = Duration::from_millis(100);

/// A chromiumoxide tab.
pub struct ChromiumPage {
    page: Page,
}

impl ChromiumPage {
    pub fn new(page: Page) -> Self {
        Self { page }
    }
}

#[async_trait]
impl DocPage for ChromiumPage {
    async fn navigate(&self, url: &str, timeout: Duration) -> Result<()> {
        match tokio::time::timeout(timeout, self.page.goto(url)).await {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(e)) => Err(anyhow!("Failed to navigate to {}: {}", url, e)),
            Err(_) => Err(anyhow!("Navigation to {} timed out after {:?}", url, timeout)),
        }
    }

    async fn wait_for_dom_ready(&self, timeout: Duration) -> Result<()> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            let state = self.evaluate("document.readyState").await?;
            if state.as_str() != Some("loading") {
                return Ok(());
            }
            if tokio::time::Instant::now() >= deadline {
                return Err(anyhow!("DOM not ready after {:?}", timeout));
            }
            tokio::time::sleep(READY_STATE_POLL).await;
        }
    }

    async fn evaluate(&self, script: &str) -> Result<serde_json::Value> {
        let result = self
            .page
            .evaluate_expression(script)
            .await
            .map_err(|e| anyhow!("Failed to evaluate script: {}", e))?;

        // Scripts that return `undefined` have no value to convert.
        Ok(result.into_value::<serde_json::Value>().unwrap_or(serde_json::Value::Null))
    }

    async fn current_url(&self) -> Result<String> {
        self.page
            .url()
            .await
            .map_err(|e| anyhow!("Failed to read page URL: {}", e))?
            .ok_or_else(|| anyhow!("Page has no URL"))
    }

    async fn current_title(&self) -> Result<Option<String>> {
        self.page
            .get_title()
            .await
            .map_err(|e| anyhow!("Failed to read page title: {}", e))
    }

    async fn rendered_html(&self) -> Result<String> {
        self.page
            .content()
            .await
            .map_err(|e| anyhow!("Failed to get page content: {}", e))
    }

    async fn wait(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// A launched Chromium plus the task pumping its CDP events.
pub struct BrowserSession {
    browser: Browser,
    handle: JoinHandle<()>,
}

impl BrowserSession {
    pub async fn launch(visible: bool) -> Result<Self> {
        let mut builder = BrowserConfig::builder().window_size(1920, 1080);
        if visible {
            builder = builder.with_head();
        }
        let config = builder
            .build()
            .map_err(|e| anyhow!("Failed to create browser config: {}", e))?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| anyhow!("Failed to launch browser: {}", e))?;

        let handle = tokio::spawn(async move {
            while let Some(h) = handler.next().await {
                if let Err(err) = h {
                    let err_str = err.to_string();
                    if !err_str.contains("data did not match any variant")
                        && !err_str.contains("untagged enum Message")
                    {
                        error!("Browser handler error: {}", err);
                    } else {
                        debug!("Chrome protocol message ignored: {}", err);
                    }
                }
            }
        });

        Ok(Self { browser, handle })
    }

    pub fn browser(&self) -> &Browser {
        &self.browser
    }

    pub async fn new_page(&self) -> Result<ChromiumPage> {
        let page = self
            .browser
            .new_page("about:blank")
            .await
            .map_err(|e| anyhow!("Failed to create new page: {}", e))?;
        Ok(ChromiumPage::new(page))
    }

    pub async fn close(mut self) {
        self.browser.close().await.ok();
        self.handle.abort();
    }
}
