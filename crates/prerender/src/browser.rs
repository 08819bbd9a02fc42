//! Headless browser seam.
//!
//! The prerender loop only talks to [`HeadlessBrowser`] and [`BrowserPage`];
//! [`ChromiumBrowser`] is the production implementation.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chromiumoxide::Page;
use chromiumoxide::browser::{Browser, BrowserConfig};
use futures::StreamExt;
use std::time::Duration;
use tokio::task::JoinHandle;

#[async_trait]
pub trait HeadlessBrowser: Send + Sync {
    type Page: BrowserPage;

    /// Open a fresh blank page. The caller owns it and must close it.
    async fn new_page(&self) -> Result<Self::Page>;
}

#[async_trait]
pub trait BrowserPage: Send + Sync {
    /// Navigate to `url`, resolving once the page has loaded. Returns the
    /// HTTP status of the main document response, if the browser saw one.
    async fn navigate(&mut self, url: &str) -> Result<Option<u16>>;

    /// Serialized DOM of the fully rendered document.
    async fn content(&self) -> Result<String>;

    async fn close(self) -> Result<()>;
}

/// Chromium driven over the DevTools protocol.
pub struct ChromiumBrowser {
    browser: Browser,
    handler: JoinHandle<()>,
}

impl ChromiumBrowser {
    pub async fn launch(request_timeout: Duration) -> Result<Self> {
        let config = BrowserConfig::builder()
            .request_timeout(request_timeout)
            .build()
            .map_err(|e| anyhow::anyhow!("Invalid browser configuration: {}", e))?;

        let (browser, mut events) = Browser::launch(config)
            .await
            .context("Failed to launch headless Chromium")?;

        // The protocol handler must be polled for the browser to make progress
        let handler = tokio::spawn(async move {
            while let Some(event) = events.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        tracing::info!("headless browser launched");

        Ok(Self { browser, handler })
    }

    pub async fn close(mut self) -> Result<()> {
        self.browser
            .close()
            .await
            .context("Failed to close headless browser")?;
        self.browser.wait().await?;
        let _ = self.handler.await;
        tracing::info!("headless browser closed");
        Ok(())
    }
}

pub struct ChromiumPage {
    page: Page,
}

#[async_trait]
impl HeadlessBrowser for ChromiumBrowser {
    type Page = ChromiumPage;

    async fn new_page(&self) -> Result<ChromiumPage> {
        let page = self
            .browser
            .new_page("about:blank")
            .await
            .context("Failed to open browser page")?;
        Ok(ChromiumPage { page })
    }
}

#[async_trait]
impl BrowserPage for ChromiumPage {
    async fn navigate(&mut self, url: &str) -> Result<Option<u16>> {
        self.page
            .goto(url)
            .await
            .with_context(|| format!("Navigation to {} failed", url))?;
        let request = self
            .page
            .wait_for_navigation_response()
            .await
            .with_context(|| format!("Navigation to {} failed", url))?;

        Ok(request
            .as_ref()
            .and_then(|request| request.response.as_ref())
            .and_then(|response| u16::try_from(response.status).ok()))
    }

    async fn content(&self) -> Result<String> {
        self.page
            .content()
            .await
            .context("Failed to serialize page content")
    }

    async fn close(self) -> Result<()> {
        self.page.close().await.context("Failed to close page")
    }
}
