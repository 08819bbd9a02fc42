//! Route manifest loading.
//!
//! The manifest is a JSON array of path strings and is the single source of
//! truth for which pages exist.

use crate::error::{Error, Result};
use crate::types::Route;
use std::fs;
use std::path::Path;

/// Parse a manifest from a string (useful for testing)
pub fn parse_manifest_str(content: &str) -> Result<Vec<Route>> {
    let value: serde_json::Value = serde_json::from_str(content)?;

    if !value.is_array() {
        return Err(Error::InvalidManifest(
            "expected a JSON array of route paths".to_string(),
        ));
    }

    Ok(serde_json::from_value(value)?)
}

/// Read and parse a manifest file. Unreadable files surface as `Error::IoError`,
/// malformed content as `Error::InvalidManifest`.
pub fn load_manifest<P: AsRef<Path>>(path: P) -> Result<Vec<Route>> {
    let content = fs::read_to_string(path.as_ref())?;
    parse_manifest_str(&content)
}

/// Like [`load_manifest`], but an unreadable file degrades to an empty list
/// with a warning. Malformed content is still an error.
pub fn load_manifest_lenient<P: AsRef<Path>>(path: P) -> Result<Vec<Route>> {
    match load_manifest(path.as_ref()) {
        Err(err) if err.is_unreadable() => {
            tracing::warn!(
                path = %path.as_ref().display(),
                error = %err,
                "route manifest unreadable, continuing with no routes"
            );
            Ok(Vec::new())
        }
        other => other,
    }
}

/// Never fails: any problem is logged and an empty list returned.
pub fn load_manifest_or_empty<P: AsRef<Path>>(path: P) -> Vec<Route> {
    load_manifest(path.as_ref()).unwrap_or_else(|err| {
        tracing::warn!(
            path = %path.as_ref().display(),
            error = %err,
            "route manifest unusable, continuing with no routes"
        );
        Vec::new()
    })
}
