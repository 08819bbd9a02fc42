//! SEO artifact generation.
//!
//! Pure functions of `(site_url, indexable, routes)` shared by the build-time
//! `seo` command and the request-time handlers in `rankbee-server`, so both
//! always apply the same policy.

pub mod feed;
pub mod robots;
pub mod sitemap;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rankbee_core::Route;
use std::fs;
use std::path::{Path, PathBuf};

pub use feed::rss_xml;
pub use robots::robots_txt;
pub use sitemap::{SitemapEntry, sitemap_entries, sitemap_xml};

pub const ROBOTS_FILE: &str = "robots.txt";
pub const SITEMAP_FILE: &str = "sitemap.xml";

/// Generated SEO documents, ready to be written or served.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeoArtifacts {
    pub robots_txt: String,
    pub sitemap_xml: String,
}

pub fn generate_artifacts(
    site_url: &str,
    indexable: bool,
    routes: &[Route],
    now: DateTime<Utc>,
) -> SeoArtifacts {
    SeoArtifacts {
        robots_txt: robots_txt(site_url, indexable),
        sitemap_xml: sitemap_xml(site_url, routes, now),
    }
}

/// Write robots.txt and sitemap.xml into `out_dir`, creating it as needed.
///
/// Returns the written paths in write order.
pub fn write_artifacts(out_dir: &Path, artifacts: &SeoArtifacts) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create output directory {}", out_dir.display()))?;

    let files = [
        (ROBOTS_FILE, &artifacts.robots_txt),
        (SITEMAP_FILE, &artifacts.sitemap_xml),
    ];

    let mut written = Vec::with_capacity(files.len());
    for (name, body) in files {
        let path = out_dir.join(name);
        fs::write(&path, body).with_context(|| format!("Failed to write {}", path.display()))?;
        tracing::debug!(path = %path.display(), bytes = body.len(), "wrote SEO artifact");
        written.push(path);
    }

    Ok(written)
}
