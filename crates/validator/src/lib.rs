//! Manifest and prerender output validation.
//!
//! Nothing here fails hard: every finding lands in a [`ValidationReport`]
//! and the caller decides what is fatal.

use rankbee_core::{PAGE_FILE, PRERENDER_MARKER, Route, load_manifest};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Default)]
pub struct ValidationReport {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub info: Vec<String>,
}

impl ValidationReport {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn merge(&mut self, other: ValidationReport) {
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
        self.info.extend(other.info);
    }
}

/// Load a manifest file and check it. Load failures become report errors.
pub fn validate_manifest_file(path: &Path) -> (ValidationReport, Vec<Route>) {
    match load_manifest(path) {
        Ok(routes) => (validate_manifest(&routes), routes),
        Err(e) => {
            let mut report = ValidationReport::default();
            report
                .errors
                .push(format!("Manifest {} could not be loaded: {}", path.display(), e));
            (report, Vec::new())
        }
    }
}

/// Check a parsed route list for problems the loader tolerates.
pub fn validate_manifest(routes: &[Route]) -> ValidationReport {
    let mut report = ValidationReport::default();

    if routes.is_empty() {
        report
            .warnings
            .push("Manifest is empty: sitemap will contain no pages".to_string());
        return report;
    }

    let mut seen: HashMap<&str, usize> = HashMap::new();
    for route in routes {
        *seen.entry(route.as_str()).or_default() += 1;
    }
    let mut duplicates: Vec<_> = seen.iter().filter(|(_, count)| **count > 1).collect();
    duplicates.sort();
    for (path, count) in duplicates {
        report
            .warnings
            .push(format!("Duplicate route {} ({} entries)", path, count));
    }

    if !routes.iter().any(Route::is_root) {
        report
            .warnings
            .push("Manifest has no root route \"/\"".to_string());
    }

    // Distinct routes that collapse onto the same file overwrite each other
    let mut targets: HashMap<PathBuf, &str> = HashMap::new();
    for route in routes {
        match route.output_path() {
            Ok(target) => {
                if let Some(previous) = targets.insert(target.clone(), route.as_str())
                    && previous != route.as_str()
                {
                    report.warnings.push(format!(
                        "Routes {} and {} both prerender to {}",
                        previous,
                        route,
                        target.display()
                    ));
                }
            }
            Err(e) => report.errors.push(e.to_string()),
        }

        if route.as_str().len() > 1 && route.as_str().ends_with('/') {
            report
                .warnings
                .push(format!("Route {} has a trailing slash", route));
        }
    }

    for route in routes.iter().filter(|r| r.is_auth()) {
        report
            .info
            .push(format!("{} is excluded from the sitemap", route));
    }

    report.info.push(format!(
        "{} routes, {} in sitemap",
        routes.len(),
        routes.iter().filter(|r| !r.is_auth()).count()
    ));

    report
}

/// Check a prerender output directory against the manifest.
pub fn validate_output(dist: &Path, routes: &[Route]) -> ValidationReport {
    let mut report = ValidationReport::default();

    if !dist.is_dir() {
        report
            .errors
            .push(format!("Output directory does not exist: {}", dist.display()));
        return report;
    }

    let mut expected = HashSet::new();
    for route in routes {
        let Ok(relative) = route.output_path() else {
            continue;
        };
        let file = dist.join(&relative);
        expected.insert(relative);

        match fs::read_to_string(&file) {
            Ok(html) if html.starts_with(PRERENDER_MARKER) => {}
            Ok(_) => report
                .warnings
                .push(format!("{} is not prerendered ({})", route, file.display())),
            Err(_) => report
                .warnings
                .push(format!("{} has no page at {}", route, file.display())),
        }
    }

    // Prerendered pages left over from routes that were since removed
    for entry in WalkDir::new(dist)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file() && e.file_name() == PAGE_FILE)
    {
        let Ok(relative) = entry.path().strip_prefix(dist) else {
            continue;
        };
        if expected.contains(relative) {
            continue;
        }
        let is_prerendered = fs::read_to_string(entry.path())
            .map(|html| html.starts_with(PRERENDER_MARKER))
            .unwrap_or(false);
        if is_prerendered {
            report.info.push(format!(
                "Stale prerendered page not in manifest: {}",
                relative.display()
            ));
        }
    }

    report
}
