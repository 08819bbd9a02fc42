mod commands;

use clap::{CommandFactory, Parser};
use clap_complete::{Shell, generate};
use rankbee_core::SiteConfig;
use std::io;
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser)]
#[command(name = "rankbee")]
#[command(version, long_about = None)]
#[command(about = "SEO artifacts, prerendering and edge server for the marketing site")]
struct Cli {
    /// Site configuration file (site.toml)
    #[arg(long, global = true, env = "RANKBEE_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Parser)]
enum Command {
    /// Generate robots.txt and sitemap.xml from the route manifest
    Seo {
        /// Route manifest (defaults to the configured manifest)
        #[arg(long)]
        manifest: Option<PathBuf>,

        /// Directory to write the artifacts into
        #[arg(short, long, default_value = "public")]
        out: PathBuf,
    },

    /// Snapshot every manifest route of a built site to static HTML
    Prerender {
        /// Route manifest (defaults to the configured manifest)
        #[arg(long)]
        manifest: Option<PathBuf>,

        /// Built site directory; snapshots are written here
        #[arg(long, default_value = "dist")]
        dist: PathBuf,

        /// Port the preview server listens on
        #[arg(short, long, default_value = "4173")]
        port: u16,

        /// Preview server program (defaults to `rankbee serve`)
        #[arg(long)]
        server_cmd: Option<String>,

        /// Argument passed to --server-cmd (repeatable)
        #[arg(long = "server-arg", allow_hyphen_values = true, requires = "server_cmd")]
        server_args: Vec<String>,
    },

    /// Serve the built site with edge SEO handlers and the subscribe API
    Serve {
        /// Route manifest (defaults to the configured manifest)
        #[arg(long)]
        manifest: Option<PathBuf>,

        /// Built site directory
        #[arg(long, default_value = "dist")]
        static_dir: PathBuf,

        /// Address to listen on
        #[arg(short, long, default_value = "127.0.0.1:8080")]
        bind: SocketAddr,
    },

    /// Check the route manifest and, optionally, prerendered output
    Validate {
        /// Route manifest (defaults to the configured manifest)
        #[arg(long)]
        manifest: Option<PathBuf>,

        /// Prerendered site directory to check against the manifest
        #[arg(long)]
        dist: Option<PathBuf>,
    },

    /// Scaffold site.toml and routes.json in a directory
    Init {
        /// Directory to initialize
        path: PathBuf,

        /// Public base URL of the site
        #[arg(long)]
        site_url: Option<String>,

        /// Overwrite existing files
        #[arg(long)]
        force: bool,
    },

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let load_config = || SiteConfig::load(cli.config.as_deref());

    match cli.command {
        Command::Seo { manifest, out } => {
            let config = load_config()?;
            let manifest = manifest.unwrap_or_else(|| config.manifest.clone());
            commands::seo::run(&config, &manifest, &out).await
        }
        Command::Prerender {
            manifest,
            dist,
            port,
            server_cmd,
            server_args,
        } => {
            let config = load_config()?;
            let manifest = manifest.unwrap_or_else(|| config.manifest.clone());
            commands::prerender::run(&manifest, &dist, port, server_cmd, server_args).await
        }
        Command::Serve {
            manifest,
            static_dir,
            bind,
        } => {
            let config = load_config()?;
            let manifest = manifest.unwrap_or_else(|| config.manifest.clone());
            commands::serve::run(config, &manifest, static_dir, bind).await
        }
        Command::Validate { manifest, dist } => {
            let config = load_config()?;
            let manifest = manifest.unwrap_or_else(|| config.manifest.clone());
            commands::validate::run(&manifest, dist.as_deref()).await
        }
        Command::Init {
            path,
            site_url,
            force,
        } => commands::init::run(&path, site_url.as_deref(), force).await,
        Command::Completions { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "rankbee", &mut io::stdout());
            Ok(())
        }
    }
}
