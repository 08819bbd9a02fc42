use anyhow::Result;
use rankbee_core::load_manifest_or_empty;
use rankbee_prerender::{RouteOutcome, RunOptions, ServerCommand};
use std::ffi::OsString;
use std::path::Path;

/// Start a preview server over `dist`, snapshot every manifest route into
/// it, and stop the server again.
///
/// Per-route failures are reported but do not fail the command; a server
/// that never comes up does.
pub async fn run(
    manifest: &Path,
    dist: &Path,
    port: u16,
    server_cmd: Option<String>,
    server_args: Vec<String>,
) -> Result<()> {
    println!("Prerendering site...");
    println!("   Dist: {}", dist.display());
    println!("   Manifest: {}", manifest.display());

    if !dist.is_dir() {
        anyhow::bail!(
            "Build output does not exist: {}\nBuild the site before prerendering",
            dist.display()
        );
    }

    let routes = load_manifest_or_empty(manifest);
    if routes.is_empty() {
        println!("⚠ No routes to prerender");
        return Ok(());
    }
    println!("   Routes: {}", routes.len());

    let command = match server_cmd {
        Some(program) => {
            let args = server_args.into_iter().map(OsString::from).collect();
            ServerCommand::external(program, args, port)
        }
        None => ServerCommand::self_serve(port, dist, manifest)?,
    };
    println!("   Server: {}", command.origin);
    println!();

    let report = rankbee_prerender::run(&command, &routes, dist, &RunOptions::default()).await?;

    for (route, outcome) in &report.outcomes {
        match outcome {
            RouteOutcome::Captured(path) => println!("   ✓ {} → {}", route, path.display()),
            RouteOutcome::Skipped { status } => {
                println!("   ⚠ {} skipped (HTTP {})", route, status)
            }
            RouteOutcome::Failed(reason) => println!("   ✗ {} failed: {}", route, reason),
        }
    }

    println!();
    println!(
        "✅ Prerender complete: {} captured, {} skipped, {} failed",
        report.captured(),
        report.skipped(),
        report.failed()
    );

    Ok(())
}
