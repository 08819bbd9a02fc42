use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Routes that never appear in the sitemap, whatever the environment.
pub const AUTH_ROUTES: &[&str] = &["/sign-in", "/sign-up"];

/// First line of every prerendered page.
pub const PRERENDER_MARKER: &str = "<!-- prerendered -->";

/// File written for each route inside the output directory.
pub const PAGE_FILE: &str = "index.html";

/// A site path from the route manifest, e.g. `/pricing`.
///
/// Always starts with `/`. Duplicates are allowed here; the validator
/// reports them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Route(String);

impl Route {
    pub fn parse(path: impl Into<String>) -> Result<Self> {
        let path = path.into();

        if !path.starts_with('/') {
            return Err(Error::InvalidRoute {
                route: path,
                reason: "must start with '/'".to_string(),
            });
        }

        if path.chars().any(char::is_whitespace) {
            return Err(Error::InvalidRoute {
                route: path,
                reason: "must not contain whitespace".to_string(),
            });
        }

        Ok(Route(path))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0 == "/"
    }

    /// Sign-in / sign-up pages, excluded from the sitemap.
    pub fn is_auth(&self) -> bool {
        AUTH_ROUTES.contains(&self.0.as_str())
    }

    pub fn meta(&self) -> RouteMeta {
        RouteMeta::for_path(&self.0)
    }

    /// Relative path of this route's static HTML file.
    ///
    /// `/` maps to `index.html`, `/foo/bar` to `foo/bar/index.html`. Query
    /// strings and fragments are ignored. Dot segments are rejected so a page
    /// can never land outside the output directory.
    pub fn output_path(&self) -> Result<PathBuf> {
        let path = self.0.split(['?', '#']).next().unwrap_or_default();

        let mut relative = PathBuf::new();
        for segment in path.split('/').filter(|s| !s.is_empty()) {
            if segment == ".." || segment == "." {
                return Err(Error::InvalidRoute {
                    route: self.0.clone(),
                    reason: "dot segments not allowed in output path".to_string(),
                });
            }
            relative.push(segment);
        }

        relative.push(PAGE_FILE);
        Ok(relative)
    }
}

impl TryFrom<String> for Route {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Route::parse(value)
    }
}

impl From<Route> for String {
    fn from(route: Route) -> Self {
        route.0
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Sitemap `changefreq` hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeFreq {
    Weekly,
    Monthly,
}

impl ChangeFreq {
    pub fn as_str(self) -> &'static str {
        match self {
            ChangeFreq::Weekly => "weekly",
            ChangeFreq::Monthly => "monthly",
        }
    }
}

impl fmt::Display for ChangeFreq {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-route sitemap metadata, derived from a fixed table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteMeta {
    pub priority: &'static str,
    pub changefreq: ChangeFreq,
}

impl RouteMeta {
    /// Exact path match against the priority table, falling back to the default.
    pub fn for_path(path: &str) -> Self {
        let (priority, changefreq) = match path {
            "/" => ("1.0", ChangeFreq::Weekly),
            "/pricing" => ("0.8", ChangeFreq::Monthly),
            "/about" | "/demo" => ("0.8", ChangeFreq::Weekly),
            "/blog" => ("0.7", ChangeFreq::Weekly),
            "/contact" => ("0.5", ChangeFreq::Weekly),
            _ => ("0.6", ChangeFreq::Weekly),
        };

        RouteMeta {
            priority,
            changefreq,
        }
    }
}

/// Deployment environment name, e.g. `production` or `deploy-preview`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Environment(String);

impl Environment {
    pub const DEFAULT: &'static str = "development";

    pub fn new(name: impl Into<String>) -> Self {
        Environment(name.into().trim().to_string())
    }

    pub fn name(&self) -> &str {
        &self.0
    }

    /// Search engines may crawl only production deployments.
    pub fn is_indexable(&self) -> bool {
        self.0.eq_ignore_ascii_case("production") || self.0.eq_ignore_ascii_case("prod")
    }
}

impl Default for Environment {
    fn default() -> Self {
        Environment::new(Self::DEFAULT)
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
