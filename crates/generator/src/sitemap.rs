//! sitemap.xml generation.
//!
//! Entries are regenerated wholesale on every run; `lastmod` is the
//! generation instant, not a per-page content time.

use chrono::{DateTime, SecondsFormat, Utc};
use quick_xml::escape::escape;
use rankbee_core::{ChangeFreq, Route};
use std::fmt::Write;

pub const SITEMAP_NS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

/// One `<url>` element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SitemapEntry {
    pub loc: String,
    pub lastmod: String,
    pub changefreq: ChangeFreq,
    pub priority: &'static str,
}

/// ISO-8601 UTC with millisecond precision, e.g. `2026-10-17T09:30:00.000Z`.
pub fn format_lastmod(now: DateTime<Utc>) -> String {
    now.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Build entries for every non-auth route, in manifest order.
pub fn sitemap_entries(site_url: &str, routes: &[Route], now: DateTime<Utc>) -> Vec<SitemapEntry> {
    let base = site_url.trim_end_matches('/');
    let lastmod = format_lastmod(now);

    routes
        .iter()
        .filter(|route| !route.is_auth())
        .map(|route| {
            let meta = route.meta();
            SitemapEntry {
                loc: format!("{}{}", base, route),
                lastmod: lastmod.clone(),
                changefreq: meta.changefreq,
                priority: meta.priority,
            }
        })
        .collect()
}

/// Render the full sitemap document.
pub fn sitemap_xml(site_url: &str, routes: &[Route], now: DateTime<Utc>) -> String {
    let mut xml = String::new();
    xml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    xml.push_str(&format!("<urlset xmlns=\"{}\">\n", SITEMAP_NS));

    for entry in sitemap_entries(site_url, routes, now) {
        // Writing into a String cannot fail
        xml.push_str("  <url>\n");
        let _ = writeln!(xml, "    <loc>{}</loc>", escape(entry.loc.as_str()));
        let _ = writeln!(xml, "    <lastmod>{}</lastmod>", entry.lastmod);
        let _ = writeln!(xml, "    <changefreq>{}</changefreq>", entry.changefreq);
        let _ = writeln!(xml, "    <priority>{}</priority>", entry.priority);
        xml.push_str("  </url>\n");
    }

    xml.push_str("</urlset>\n");
    xml
}
