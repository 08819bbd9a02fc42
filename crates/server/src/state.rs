//! Shared application state.

use crate::ghost::GhostClient;
use rankbee_core::{Route, SiteConfig};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    inner: Arc<InnerState>,
}

struct InnerState {
    config: SiteConfig,
    /// Manifest order, used for the sitemap.
    routes: Vec<Route>,
    /// Path to index in `routes`.
    by_path: HashMap<String, usize>,
    static_dir: PathBuf,
    ghost: Option<GhostClient>,
}

impl AppState {
    /// Build state for a site. A CMS configuration that cannot be turned
    /// into a client is logged here and surfaces per request as a
    /// configuration error.
    pub fn new(config: SiteConfig, routes: Vec<Route>, static_dir: impl Into<PathBuf>) -> Self {
        let ghost = match &config.ghost {
            Some(ghost) => match GhostClient::new(ghost) {
                Ok(client) => Some(client),
                Err(e) => {
                    tracing::error!(error = %e, "newsletter CMS configuration is invalid");
                    None
                }
            },
            None => {
                tracing::warn!("newsletter CMS not configured, subscriptions will fail");
                None
            }
        };

        let by_path = routes
            .iter()
            .enumerate()
            .map(|(i, r)| (r.as_str().to_string(), i))
            .collect();

        Self {
            inner: Arc::new(InnerState {
                config,
                routes,
                by_path,
                static_dir: static_dir.into(),
                ghost,
            }),
        }
    }

    pub fn config(&self) -> &SiteConfig {
        &self.inner.config
    }

    pub fn routes(&self) -> &[Route] {
        &self.inner.routes
    }

    pub fn static_dir(&self) -> &Path {
        &self.inner.static_dir
    }

    pub fn ghost(&self) -> Option<&GhostClient> {
        self.inner.ghost.as_ref()
    }

    /// The manifest route a request path refers to, ignoring one trailing
    /// slash.
    pub fn route_for(&self, path: &str) -> Option<&Route> {
        let trimmed = if path.len() > 1 {
            path.trim_end_matches('/')
        } else {
            path
        };
        let trimmed = if trimmed.is_empty() { "/" } else { trimmed };

        let index = self
            .inner
            .by_path
            .get(path)
            .or_else(|| self.inner.by_path.get(trimmed))?;
        self.inner.routes.get(*index)
    }
}
