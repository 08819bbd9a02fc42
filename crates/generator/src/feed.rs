//! RSS placeholder feed.
//!
//! Blog posts live in the external CMS, so the channel carries no items.

use chrono::{DateTime, Utc};
use quick_xml::escape::escape;
use std::fmt::Write;

pub fn rss_xml(site_url: &str, site_name: &str, now: DateTime<Utc>) -> String {
    let base = site_url.trim_end_matches('/');
    let name = escape(site_name);
    let link = format!("{}/blog", base);

    let mut xml = String::new();
    xml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    xml.push_str("<rss version=\"2.0\">\n");
    xml.push_str("  <channel>\n");
    // Writing into a String cannot fail
    let _ = writeln!(xml, "    <title>{} Blog</title>", name);
    let _ = writeln!(xml, "    <link>{}</link>", escape(link.as_str()));
    let _ = writeln!(xml, "    <description>Latest articles from {}</description>", name);
    xml.push_str("    <language>en</language>\n");
    let _ = writeln!(xml, "    <lastBuildDate>{}</lastBuildDate>", now.to_rfc2822());
    xml.push_str("  </channel>\n");
    xml.push_str("</rss>\n");
    xml
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_rss_placeholder() {
        let now = Utc.with_ymd_and_hms(2026, 10, 17, 9, 30, 0).unwrap();
        let xml = rss_xml("https://rankbee.ai/", "RankBee", now);

        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(xml.contains("<rss version=\"2.0\">"));
        assert!(xml.contains("<title>RankBee Blog</title>"));
        assert!(xml.contains("<link>https://rankbee.ai/blog</link>"));
        assert!(xml.contains("<lastBuildDate>Sat, 17 Oct 2026 09:30:00 +0000</lastBuildDate>"));
        assert!(!xml.contains("<item>"));
    }

    #[test]
    fn test_rss_document_shape() {
        let now = Utc.with_ymd_and_hms(2026, 10, 17, 9, 30, 0).unwrap();
        let expected = concat!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n",
            "<rss version=\"2.0\">\n",
            "  <channel>\n",
            "    <title>RankBee Blog</title>\n",
            "    <link>https://rankbee.ai/blog</link>\n",
            "    <description>Latest articles from RankBee</description>\n",
            "    <language>en</language>\n",
            "    <lastBuildDate>Sat, 17 Oct 2026 09:30:00 +0000</lastBuildDate>\n",
            "  </channel>\n",
            "</rss>\n",
        );
        assert_eq!(rss_xml("https://rankbee.ai", "RankBee", now), expected);
    }

    #[test]
    fn test_rss_escapes_site_name() {
        let now = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let xml = rss_xml("https://rankbee.ai", "Bees & <Co>", now);
        assert!(xml.contains("<title>Bees &amp; &lt;Co&gt; Blog</title>"));
    }
}
