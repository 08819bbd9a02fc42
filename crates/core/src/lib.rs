pub mod config;
pub mod error;
pub mod manifest;
pub mod types;

pub use config::{GhostConfig, SiteConfig};
pub use error::{Error, Result};
pub use manifest::{load_manifest, load_manifest_lenient, load_manifest_or_empty};
pub use types::*;
