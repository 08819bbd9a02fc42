use crate::error::{Error, Result};
use crate::types::Environment;
use serde::Deserialize;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use url::Url;

pub const DEFAULT_SITE_URL: &str = "https://rankbee.ai";
pub const DEFAULT_SITE_NAME: &str = "RankBee";
pub const DEFAULT_MANIFEST: &str = "routes.json";

/// Raw TOML configuration structure
/// This matches the site.toml file structure exactly
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    site_url: Option<String>,
    site_name: Option<String>,
    environment: Option<String>,
    manifest: Option<String>,
    #[serde(default)]
    ghost: RawGhostConfig,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawGhostConfig {
    admin_url: Option<String>,
    admin_api_key: Option<String>,
}

/// Site-wide configuration, assembled once at startup and passed to each
/// component.
#[derive(Debug, Clone)]
pub struct SiteConfig {
    /// Absolute base URL without a trailing slash, e.g. `https://rankbee.ai`.
    pub site_url: String,
    pub site_name: String,
    pub environment: Environment,
    /// Path to the JSON route manifest.
    pub manifest: PathBuf,
    /// Newsletter CMS credentials; `None` when not configured.
    pub ghost: Option<GhostConfig>,
}

/// Credentials for the CMS admin API.
#[derive(Clone)]
pub struct GhostConfig {
    /// Base URL of the CMS, e.g. `https://cms.rankbee.ai`.
    pub admin_url: String,
    /// Admin API key in `<id>:<hex secret>` form.
    pub admin_api_key: String,
}

impl fmt::Debug for GhostConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GhostConfig")
            .field("admin_url", &self.admin_url)
            .field("admin_api_key", &"<redacted>")
            .finish()
    }
}

impl Default for SiteConfig {
    fn default() -> Self {
        SiteConfig {
            site_url: DEFAULT_SITE_URL.to_string(),
            site_name: DEFAULT_SITE_NAME.to_string(),
            environment: Environment::default(),
            manifest: PathBuf::from(DEFAULT_MANIFEST),
            ghost: None,
        }
    }
}

impl SiteConfig {
    pub fn is_indexable(&self) -> bool {
        self.environment.is_indexable()
    }

    /// Load configuration from an optional site.toml plus process environment.
    ///
    /// Precedence (lowest first): built-in defaults, the TOML file, environment
    /// variables.
    ///
    /// Environment variables:
    /// - `SITE_URL`: absolute base URL (default: `https://rankbee.ai`)
    /// - `SITE_NAME`: display name used in feeds (default: `RankBee`)
    /// - `SITE_ENV`, then `CONTEXT`: environment name (default: `development`)
    /// - `SITE_MANIFEST`: route manifest path (default: `routes.json`)
    /// - `GHOST_ADMIN_URL`, `GHOST_ADMIN_API_KEY`: newsletter CMS credentials
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let content = match path {
            Some(path) => Some(fs::read_to_string(path)?),
            None => None,
        };

        let mut config = Self::from_sources(content.as_deref(), |key| std::env::var(key).ok())?;

        // A manifest named in the file is relative to the file
        if let Some(dir) = path.and_then(Path::parent)
            && config.manifest.is_relative()
            && std::env::var_os("SITE_MANIFEST").is_none()
        {
            config.manifest = dir.join(&config.manifest);
        }

        tracing::info!(
            site_url = %config.site_url,
            environment = %config.environment,
            indexable = config.is_indexable(),
            manifest = %config.manifest.display(),
            ghost_configured = config.ghost.is_some(),
            "site configuration loaded"
        );

        Ok(config)
    }

    /// Build configuration from TOML text and an environment lookup
    /// (useful for testing).
    pub fn from_sources<F>(toml_content: Option<&str>, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw: RawConfig = match toml_content {
            Some(content) => toml::from_str(content)?,
            None => RawConfig::default(),
        };

        // Empty variables count as unset
        let env = |key: &str| env(key).filter(|v| !v.trim().is_empty());

        let site_url = env("SITE_URL")
            .or(raw.site_url)
            .unwrap_or_else(|| DEFAULT_SITE_URL.to_string());
        let site_url = normalize_site_url(&site_url)?;

        let site_name = env("SITE_NAME")
            .or(raw.site_name)
            .unwrap_or_else(|| DEFAULT_SITE_NAME.to_string());

        let environment = env("SITE_ENV")
            .or_else(|| env("CONTEXT"))
            .or(raw.environment)
            .map(Environment::new)
            .unwrap_or_default();

        let manifest = env("SITE_MANIFEST")
            .or(raw.manifest)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_MANIFEST));

        let admin_url = env("GHOST_ADMIN_URL").or(raw.ghost.admin_url);
        let admin_api_key = env("GHOST_ADMIN_API_KEY").or(raw.ghost.admin_api_key);
        let ghost = match (admin_url, admin_api_key) {
            (Some(admin_url), Some(admin_api_key)) => Some(GhostConfig {
                admin_url: admin_url.trim_end_matches('/').to_string(),
                admin_api_key,
            }),
            _ => None,
        };

        Ok(SiteConfig {
            site_url,
            site_name,
            environment,
            manifest,
            ghost,
        })
    }
}

/// Validate an absolute http(s) base URL and strip trailing slashes.
fn normalize_site_url(raw: &str) -> Result<String> {
    let parsed = Url::parse(raw.trim())
        .map_err(|e| Error::ConfigParse(format!("Invalid site_url '{}': {}", raw, e)))?;

    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(Error::ConfigParse(format!(
            "site_url must use http or https: '{}'",
            raw
        )));
    }

    if parsed.query().is_some() || parsed.fragment().is_some() {
        return Err(Error::ConfigParse(format!(
            "site_url must not contain a query or fragment: '{}'",
            raw
        )));
    }

    Ok(raw.trim().trim_end_matches('/').to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = SiteConfig::from_sources(None, env_from(&[])).unwrap();
        assert_eq!(config.site_url, "https://rankbee.ai");
        assert_eq!(config.site_name, "RankBee");
        assert_eq!(config.environment.name(), "development");
        assert!(!config.is_indexable());
        assert_eq!(config.manifest, PathBuf::from("routes.json"));
        assert!(config.ghost.is_none());
    }

    #[test]
    fn test_env_values() {
        let config = SiteConfig::from_sources(
            None,
            env_from(&[
                ("SITE_URL", "https://staging.rankbee.ai/"),
                ("SITE_ENV", "production"),
                ("SITE_MANIFEST", "dist/routes.json"),
                ("GHOST_ADMIN_URL", "https://cms.rankbee.ai/"),
                ("GHOST_ADMIN_API_KEY", "abc:0011"),
            ]),
        )
        .unwrap();

        assert_eq!(config.site_url, "https://staging.rankbee.ai");
        assert!(config.is_indexable());
        assert_eq!(config.manifest, PathBuf::from("dist/routes.json"));
        let ghost = config.ghost.unwrap();
        assert_eq!(ghost.admin_url, "https://cms.rankbee.ai");
        assert_eq!(ghost.admin_api_key, "abc:0011");
    }

    #[test]
    fn test_context_fallback() {
        let config =
            SiteConfig::from_sources(None, env_from(&[("CONTEXT", "production")])).unwrap();
        assert!(config.is_indexable());

        // SITE_ENV wins over CONTEXT
        let config = SiteConfig::from_sources(
            None,
            env_from(&[("SITE_ENV", "deploy-preview"), ("CONTEXT", "production")]),
        )
        .unwrap();
        assert!(!config.is_indexable());
    }

    #[test]
    fn test_toml_file_and_env_precedence() {
        let toml = r#"
site_url = "https://rankbee.ai"
site_name = "RankBee AI"
environment = "prod"
manifest = "config/routes.json"

[ghost]
admin_url = "https://cms.example.com"
admin_api_key = "id:beef"
        "#;

        let config = SiteConfig::from_sources(Some(toml), env_from(&[])).unwrap();
        assert_eq!(config.site_name, "RankBee AI");
        assert!(config.is_indexable());
        assert_eq!(config.manifest, PathBuf::from("config/routes.json"));
        assert!(config.ghost.is_some());

        let config = SiteConfig::from_sources(
            Some(toml),
            env_from(&[("SITE_ENV", "staging"), ("SITE_URL", "http://localhost:8080")]),
        )
        .unwrap();
        assert!(!config.is_indexable());
        assert_eq!(config.site_url, "http://localhost:8080");
    }

    #[test]
    fn test_empty_env_counts_as_unset() {
        let config = SiteConfig::from_sources(
            None,
            env_from(&[("SITE_URL", ""), ("GHOST_ADMIN_API_KEY", "  ")]),
        )
        .unwrap();
        assert_eq!(config.site_url, "https://rankbee.ai");
        assert!(config.ghost.is_none());
    }

    #[test]
    fn test_ghost_requires_both_values() {
        let config = SiteConfig::from_sources(
            None,
            env_from(&[("GHOST_ADMIN_URL", "https://cms.example.com")]),
        )
        .unwrap();
        assert!(config.ghost.is_none());
    }

    #[test]
    fn test_rejects_invalid_site_url() {
        let result = SiteConfig::from_sources(None, env_from(&[("SITE_URL", "rankbee.ai")]));
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Invalid site_url"));

        let result =
            SiteConfig::from_sources(None, env_from(&[("SITE_URL", "ftp://rankbee.ai")]));
        assert!(result.is_err());

        let result =
            SiteConfig::from_sources(None, env_from(&[("SITE_URL", "https://rankbee.ai/?x=1")]));
        assert!(result.is_err());
    }

    #[test]
    fn test_rejects_unknown_toml_keys() {
        let result = SiteConfig::from_sources(Some("site_uri = \"x\""), env_from(&[]));
        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("Configuration parse error")
        );
    }

    #[test]
    fn test_debug_redacts_admin_key() {
        let ghost = GhostConfig {
            admin_url: "https://cms.example.com".into(),
            admin_api_key: "id:supersecret".into(),
        };
        let printed = format!("{:?}", ghost);
        assert!(!printed.contains("supersecret"));
        assert!(printed.contains("<redacted>"));
    }

    #[test]
    fn test_load_missing_file_is_error() {
        let result = SiteConfig::load(Some(Path::new("/nonexistent/site.toml")));
        assert!(result.is_err());
    }

    #[test]
    fn test_load_resolves_manifest_next_to_file() {
        if std::env::var_os("SITE_MANIFEST").is_some() || std::env::var_os("SITE_URL").is_some() {
            return;
        }

        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("site.toml");
        fs::write(&path, "manifest = \"routes.json\"\n").unwrap();

        let config = SiteConfig::load(Some(&path)).unwrap();
        assert_eq!(config.manifest, temp.path().join("routes.json"));
    }
}
