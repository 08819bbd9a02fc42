//! HTTP service for the marketing site: edge SEO artifacts, the newsletter
//! subscription proxy, and the built static site.

pub mod error;
pub mod ghost;
pub mod routes;
pub mod state;

pub use error::{SubscribeError, SubscribeResponse};
pub use ghost::{AdminKey, GhostClient, MemberOutcome, mint_admin_token};
pub use routes::router;
pub use state::AppState;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

/// Serve until Ctrl-C or SIGTERM, then drain in-flight requests.
pub async fn serve(state: AppState, bind: SocketAddr) -> Result<()> {
    let app = router(state).layer(TraceLayer::new_for_http());

    let listener = TcpListener::bind(bind)
        .await
        .with_context(|| format!("Failed to bind to {}", bind))?;
    let local = listener.local_addr()?;
    tracing::info!(addr = %local, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("shutdown signal received");
}
