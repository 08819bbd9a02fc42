use anyhow::{Context, Result};
use rankbee_core::{SiteConfig, load_manifest_lenient};
use rankbee_server::AppState;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

/// Serve the built site with the edge handlers and subscribe API until
/// interrupted.
pub async fn run(
    config: SiteConfig,
    manifest: &Path,
    static_dir: PathBuf,
    bind: SocketAddr,
) -> Result<()> {
    println!("Starting site server...");
    println!("   Site: {} ({})", config.site_url, config.environment);
    println!("   Static: {}", static_dir.display());

    if !static_dir.is_dir() {
        tracing::warn!(
            dir = %static_dir.display(),
            "static directory does not exist, only edge routes will answer"
        );
    }

    let routes = load_manifest_lenient(manifest)
        .with_context(|| format!("Invalid route manifest {}", manifest.display()))?;
    println!("   Routes: {}", routes.len());
    println!(
        "   Newsletter: {}",
        if config.ghost.is_some() { "configured" } else { "not configured" }
    );
    println!();
    println!("   Listening on http://{}", bind);
    println!("   Press Ctrl+C to stop");
    println!();

    let state = AppState::new(config, routes, static_dir);
    rankbee_server::serve(state, bind).await
}
