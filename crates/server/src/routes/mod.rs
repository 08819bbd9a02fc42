//! HTTP route definitions.

mod health;
mod seo;
mod site;
mod subscribe;

pub use seo::{CACHE_POLICY, NOINDEX};

use crate::state::AppState;
use axum::Router;
use axum::routing::{any, get};

/// Build the site router.
///
/// - `GET /robots.txt`, `GET /sitemap.xml`, `GET /rss.xml`: edge SEO artifacts
/// - `GET /health`: health check
/// - `/api/subscribe`: newsletter signup (POST only, other methods get 405)
/// - everything else: the static site
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/robots.txt", get(seo::robots))
        .route("/sitemap.xml", get(seo::sitemap))
        .route("/rss.xml", get(seo::rss))
        .route("/health", get(health::health_check))
        .route("/api/subscribe", any(subscribe::subscribe))
        .fallback(site::site)
        .with_state(state)
}
