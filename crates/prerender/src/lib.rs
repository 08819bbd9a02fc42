//! Prerendering: snapshot every manifest route into static HTML.
//!
//! Resources are acquired and released in a fixed order: preview server,
//! browser, then one page per route (sequentially), then browser and server
//! are released again on every exit path.

pub mod browser;
pub mod server;

use anyhow::{Context, Result};
use rankbee_core::{PRERENDER_MARKER, Route};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::time::{sleep, timeout};

pub use browser::{BrowserPage, ChromiumBrowser, HeadlessBrowser};
pub use server::{PreviewServer, READY_POLL_INTERVAL, READY_TIMEOUT, ServerCommand};

pub const NAVIGATION_TIMEOUT: Duration = Duration::from_secs(60);

/// Pause after load so client-side rendering can finish.
pub const SETTLE_DELAY: Duration = Duration::from_millis(200);

#[derive(Debug, Clone)]
pub struct PrerenderOptions {
    /// Preview server origin without a trailing slash.
    pub origin: String,
    pub out_dir: PathBuf,
    pub navigation_timeout: Duration,
    pub settle_delay: Duration,
}

impl PrerenderOptions {
    pub fn new(origin: &str, out_dir: impl Into<PathBuf>) -> Self {
        Self {
            origin: origin.trim_end_matches('/').to_string(),
            out_dir: out_dir.into(),
            navigation_timeout: NAVIGATION_TIMEOUT,
            settle_delay: SETTLE_DELAY,
        }
    }
}

/// Terminal state of a single route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteOutcome {
    /// Snapshot written to the contained path.
    Captured(PathBuf),
    /// Preview server answered with an error status; nothing written.
    Skipped { status: u16 },
    Failed(String),
}

#[derive(Debug, Default)]
pub struct PrerenderReport {
    pub outcomes: Vec<(Route, RouteOutcome)>,
}

impl PrerenderReport {
    pub fn captured(&self) -> usize {
        self.count(|o| matches!(o, RouteOutcome::Captured(_)))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, RouteOutcome::Skipped { .. }))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, RouteOutcome::Failed(_)))
    }

    fn count(&self, predicate: impl Fn(&RouteOutcome) -> bool) -> usize {
        self.outcomes.iter().filter(|(_, o)| predicate(o)).count()
    }
}

/// Timings for a complete [`run`].
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub ready_poll_interval: Duration,
    pub ready_timeout: Duration,
    pub navigation_timeout: Duration,
    pub settle_delay: Duration,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            ready_poll_interval: READY_POLL_INTERVAL,
            ready_timeout: READY_TIMEOUT,
            navigation_timeout: NAVIGATION_TIMEOUT,
            settle_delay: SETTLE_DELAY,
        }
    }
}

/// Complete run: start the preview server, wait for it, launch the browser,
/// render all routes, then tear everything down. Ctrl-C or SIGTERM abort
/// the run and still stop the server.
pub async fn run(
    command: &ServerCommand,
    routes: &[Route],
    out_dir: &Path,
    options: &RunOptions,
) -> Result<PrerenderReport> {
    run_until(command, routes, out_dir, options, interrupted()).await
}

/// [`run`], aborted early when `cancel` completes.
pub async fn run_until(
    command: &ServerCommand,
    routes: &[Route],
    out_dir: &Path,
    options: &RunOptions,
    cancel: impl Future<Output = ()>,
) -> Result<PrerenderReport> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(5))
        .build()
        .context("Failed to build HTTP client")?;

    let mut server = PreviewServer::spawn(command)?;

    let result = tokio::select! {
        result = render_with_server(&mut server, &client, routes, out_dir, options) => result,
        _ = cancel => Err(anyhow::anyhow!("Prerender interrupted")),
    };

    if let Err(e) = server.shutdown().await {
        tracing::warn!(error = %e, "failed to stop preview server cleanly");
    }

    result
}

async fn render_with_server(
    server: &mut PreviewServer,
    client: &reqwest::Client,
    routes: &[Route],
    out_dir: &Path,
    options: &RunOptions,
) -> Result<PrerenderReport> {
    server
        .wait_until_ready(client, options.ready_poll_interval, options.ready_timeout)
        .await?;

    let browser = ChromiumBrowser::launch(options.navigation_timeout).await?;
    let mut page_options = PrerenderOptions::new(server.origin(), out_dir);
    page_options.navigation_timeout = options.navigation_timeout;
    page_options.settle_delay = options.settle_delay;
    let report = prerender_routes(&browser, routes, &page_options).await;

    if let Err(e) = browser.close().await {
        tracing::warn!(error = %e, "failed to close headless browser cleanly");
    }

    Ok(report)
}

/// Resolves on Ctrl-C, or SIGTERM on Unix. The preview server runs in its
/// own process group, so these signals only reach this process.
async fn interrupted() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::warn!("interrupted, stopping preview server");
}

/// Render routes one at a time. A failing route is recorded and the batch
/// carries on.
pub async fn prerender_routes<B: HeadlessBrowser>(
    browser: &B,
    routes: &[Route],
    options: &PrerenderOptions,
) -> PrerenderReport {
    let mut report = PrerenderReport::default();

    for route in routes {
        let outcome = prerender_route(browser, route, options).await;
        match &outcome {
            RouteOutcome::Captured(path) => {
                tracing::info!(route = %route, path = %path.display(), "prerendered")
            }
            RouteOutcome::Skipped { status } => {
                tracing::warn!(
                    route = %route,
                    status,
                    "skipped: preview server returned an error status"
                )
            }
            RouteOutcome::Failed(reason) => {
                tracing::error!(route = %route, error = %reason, "prerender failed")
            }
        }
        report.outcomes.push((route.clone(), outcome));
    }

    report
}

async fn prerender_route<B: HeadlessBrowser>(
    browser: &B,
    route: &Route,
    options: &PrerenderOptions,
) -> RouteOutcome {
    let target = match route.output_path() {
        Ok(relative) => options.out_dir.join(relative),
        Err(e) => return RouteOutcome::Failed(e.to_string()),
    };

    let mut page = match browser.new_page().await {
        Ok(page) => page,
        Err(e) => return RouteOutcome::Failed(format!("{:#}", e)),
    };

    let url = format!("{}{}", options.origin, route);
    let outcome = match timeout(options.navigation_timeout, page.navigate(&url)).await {
        Ok(Ok(Some(status))) if status >= 400 => RouteOutcome::Skipped { status },
        Ok(Ok(_)) => capture(&page, &target, options.settle_delay).await,
        Ok(Err(e)) => RouteOutcome::Failed(format!("{:#}", e)),
        Err(_) => RouteOutcome::Failed(format!(
            "navigation timed out after {}s",
            options.navigation_timeout.as_secs_f32()
        )),
    };

    if let Err(e) = page.close().await {
        tracing::debug!(route = %route, error = %e, "failed to close page");
    }

    outcome
}

async fn capture<P: BrowserPage>(page: &P, target: &Path, settle: Duration) -> RouteOutcome {
    sleep(settle).await;

    let html = match page.content().await {
        Ok(html) => html,
        Err(e) => return RouteOutcome::Failed(format!("{:#}", e)),
    };

    match write_snapshot(target, &html).await {
        Ok(()) => RouteOutcome::Captured(target.to_path_buf()),
        Err(e) => RouteOutcome::Failed(format!("{:#}", e)),
    }
}

async fn write_snapshot(target: &Path, html: &str) -> Result<()> {
    if let Some(parent) = target.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    tokio::fs::write(target, snapshot_html(html))
        .await
        .with_context(|| format!("Failed to write {}", target.display()))
}

/// Prefix captured markup with the provenance marker, restoring the doctype
/// that DOM serialization drops. A marker already present (the preview server
/// served an earlier snapshot) is not repeated.
pub fn snapshot_html(html: &str) -> String {
    let mut html = html.trim_start();
    while let Some(rest) = html.strip_prefix(PRERENDER_MARKER) {
        html = rest.trim_start();
    }

    let has_doctype = html
        .get(..9)
        .is_some_and(|head| head.eq_ignore_ascii_case("<!doctype"));

    if has_doctype {
        format!("{}\n{}", PRERENDER_MARKER, html)
    } else {
        format!("{}\n<!DOCTYPE html>\n{}", PRERENDER_MARKER, html)
    }
}
