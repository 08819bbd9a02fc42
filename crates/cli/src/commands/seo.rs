use anyhow::{Context, Result};
use chrono::Utc;
use rankbee_core::{SiteConfig, load_manifest_lenient};
use rankbee_generator::{generate_artifacts, write_artifacts};
use std::path::Path;

/// Generate robots.txt and sitemap.xml for the current environment.
///
/// An unreadable manifest degrades to a sitemap with no pages; a malformed
/// one fails the command.
pub async fn run(config: &SiteConfig, manifest: &Path, out: &Path) -> Result<()> {
    let indexable = config.is_indexable();

    println!("Generating SEO artifacts...");
    println!("   Site: {}", config.site_url);
    println!(
        "   Environment: {} ({})",
        config.environment,
        if indexable { "indexable" } else { "noindex" }
    );
    println!("   Manifest: {}", manifest.display());

    let routes = load_manifest_lenient(manifest)
        .with_context(|| format!("Invalid route manifest {}", manifest.display()))?;
    let in_sitemap = routes.iter().filter(|r| !r.is_auth()).count();

    let artifacts = generate_artifacts(&config.site_url, indexable, &routes, Utc::now());
    let written = write_artifacts(out, &artifacts)?;

    for path in &written {
        println!("   ✓ Wrote {}", path.display());
    }
    println!("   ✓ Sitemap: {} of {} routes", in_sitemap, routes.len());
    if !indexable {
        println!("   ⚠ robots.txt disallows all crawlers outside production");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rankbee_core::Environment;
    use std::fs;
    use tempfile::TempDir;

    fn config(environment: &str) -> SiteConfig {
        SiteConfig {
            environment: Environment::new(environment),
            ..SiteConfig::default()
        }
    }

    #[tokio::test]
    async fn test_writes_both_artifacts() {
        let temp = TempDir::new().unwrap();
        let manifest = temp.path().join("routes.json");
        fs::write(&manifest, r#"["/", "/pricing", "/sign-up"]"#).unwrap();
        let out = temp.path().join("public");

        run(&config("production"), &manifest, &out).await.unwrap();

        let robots = fs::read_to_string(out.join("robots.txt")).unwrap();
        assert!(robots.contains("Sitemap: https://rankbee.ai/sitemap.xml"));

        let sitemap = fs::read_to_string(out.join("sitemap.xml")).unwrap();
        assert!(sitemap.contains("<loc>https://rankbee.ai/pricing</loc>"));
        assert!(!sitemap.contains("sign-up"));
    }

    #[tokio::test]
    async fn test_missing_manifest_degrades() {
        let temp = TempDir::new().unwrap();
        let out = temp.path().join("public");

        run(&config("development"), &temp.path().join("missing.json"), &out)
            .await
            .unwrap();

        assert_eq!(
            fs::read_to_string(out.join("robots.txt")).unwrap(),
            "User-agent: *\nDisallow: /\n"
        );
        assert!(!fs::read_to_string(out.join("sitemap.xml")).unwrap().contains("<url>"));
    }

    #[tokio::test]
    async fn test_malformed_manifest_fails() {
        let temp = TempDir::new().unwrap();
        let manifest = temp.path().join("routes.json");
        fs::write(&manifest, r#"["pricing"]"#).unwrap();

        let result = run(&config("production"), &manifest, &temp.path().join("public")).await;
        assert!(result.is_err());
        assert!(!temp.path().join("public").exists());
    }
}
