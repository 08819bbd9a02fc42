/// Body served when crawling is not allowed.
pub const DISALLOW_ALL: &str = "User-agent: *\nDisallow: /\n";

/// Render robots.txt for the given site.
///
/// Non-indexable deployments get a blanket disallow with no sitemap
/// reference.
pub fn robots_txt(site_url: &str, indexable: bool) -> String {
    if !indexable {
        return DISALLOW_ALL.to_string();
    }

    format!(
        "User-agent: *\nAllow: /\n\nSitemap: {}/sitemap.xml\n",
        site_url.trim_end_matches('/')
    )
}
