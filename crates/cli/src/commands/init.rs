use anyhow::{Context, Result};
use rankbee_core::SiteConfig;
use rankbee_core::config::{DEFAULT_MANIFEST, DEFAULT_SITE_NAME, DEFAULT_SITE_URL};
use std::fs;
use std::path::Path;

pub const CONFIG_FILE: &str = "site.toml";

/// Routes every fresh site starts with.
const STARTER_ROUTES: &[&str] = &[
    "/",
    "/pricing",
    "/about",
    "/demo",
    "/blog",
    "/contact",
    "/sign-in",
    "/sign-up",
];

/// Escape a string for a TOML basic string.
///
/// The template is written by hand to keep its comments, so values are
/// escaped here rather than serialized.
fn toml_escape_string(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\x08', "\\b")
        .replace('\x0C', "\\f")
        .replace('\n', "\\n")
        .replace('\r', "\\r")
        .replace('\t', "\\t")
}

fn site_toml(site_url: &str) -> String {
    format!(
        r#"# Site configuration
#
# Every value here can be overridden by an environment variable:
#   SITE_URL, SITE_NAME, SITE_ENV (or CONTEXT), SITE_MANIFEST,
#   GHOST_ADMIN_URL, GHOST_ADMIN_API_KEY

site_url = "{site_url}"
site_name = "{site_name}"

# Only "production" is indexable; anything else gets a disallow-all robots.txt
environment = "development"

manifest = "{manifest}"

# Newsletter CMS credentials. Prefer the environment variables for the key.
# [ghost]
# admin_url = "https://cms.example.com"
# admin_api_key = "<id>:<hex secret>"
"#,
        site_url = toml_escape_string(site_url),
        site_name = DEFAULT_SITE_NAME,
        manifest = DEFAULT_MANIFEST,
    )
}

/// Scaffold `site.toml` and `routes.json` in `path`, creating it if needed.
pub async fn run(path: &Path, site_url: Option<&str>, force: bool) -> Result<()> {
    println!("Initializing site: {}", path.display());

    let config_path = path.join(CONFIG_FILE);
    let manifest_path = path.join(DEFAULT_MANIFEST);

    if !force {
        for existing in [&config_path, &manifest_path] {
            if existing.exists() {
                anyhow::bail!(
                    "{} already exists\nHint: Re-run with --force to overwrite",
                    existing.display()
                );
            }
        }
    }

    let config_toml = site_toml(site_url.unwrap_or(DEFAULT_SITE_URL));

    // Refuse to write a config the loader would reject
    let config = SiteConfig::from_sources(Some(&config_toml), |_| None)
        .context("Generated configuration is invalid")?;

    fs::create_dir_all(path)
        .with_context(|| format!("Failed to create directory {}", path.display()))?;

    fs::write(&config_path, &config_toml)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;

    let manifest = serde_json::to_string_pretty(STARTER_ROUTES)?;
    fs::write(&manifest_path, format!("{}\n", manifest))
        .with_context(|| format!("Failed to write {}", manifest_path.display()))?;

    println!("\n✓ Initialization complete!");
    println!("\nGenerated structure:");
    println!("  {}/", path.display());
    println!("  ├── {}            ← Site URL, environment, CMS", CONFIG_FILE);
    println!("  └── {}          ← {} starter routes", DEFAULT_MANIFEST, STARTER_ROUTES.len());

    println!("\nNext steps:");
    println!("  1. Check site_url ({}) and add your routes", config.site_url);
    println!("  2. Generate SEO files: rankbee --config {} seo", config_path.display());
    println!("  3. Validate: rankbee --config {} validate", config_path.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rankbee_core::load_manifest;
    use tempfile::TempDir;

    #[test]
    fn test_toml_escape_string() {
        assert_eq!(toml_escape_string("plain"), "plain");
        assert_eq!(toml_escape_string("a\"b"), "a\\\"b");
        assert_eq!(toml_escape_string("c:\\path"), "c:\\\\path");
        assert_eq!(toml_escape_string("line\nbreak"), "line\\nbreak");
    }

    #[tokio::test]
    async fn test_init_scaffolds_files() {
        let temp = TempDir::new().unwrap();
        let site = temp.path().join("site");

        run(&site, Some("https://example.com/"), false).await.unwrap();

        let content = fs::read_to_string(site.join(CONFIG_FILE)).unwrap();
        let config = SiteConfig::from_sources(Some(&content), |_| None).unwrap();
        assert_eq!(config.site_url, "https://example.com");
        assert!(!config.is_indexable());
        assert!(config.ghost.is_none());

        let routes = load_manifest(site.join(DEFAULT_MANIFEST)).unwrap();
        assert_eq!(routes.len(), STARTER_ROUTES.len());
        assert!(routes.iter().any(|r| r.is_root()));
    }

    #[tokio::test]
    async fn test_init_refuses_overwrite() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(CONFIG_FILE), "site_url = \"https://keep.me\"\n").unwrap();

        let result = run(temp.path(), None, false).await;
        assert!(result.unwrap_err().to_string().contains("already exists"));
        assert_eq!(
            fs::read_to_string(temp.path().join(CONFIG_FILE)).unwrap(),
            "site_url = \"https://keep.me\"\n"
        );

        run(temp.path(), None, true).await.unwrap();
        assert!(
            fs::read_to_string(temp.path().join(CONFIG_FILE))
                .unwrap()
                .contains(DEFAULT_SITE_URL)
        );
    }

    #[tokio::test]
    async fn test_init_rejects_bad_site_url() {
        let temp = TempDir::new().unwrap();
        let result = run(temp.path(), Some("not a url"), false).await;

        assert!(result.is_err());
        assert!(!temp.path().join(CONFIG_FILE).exists());
    }
}
