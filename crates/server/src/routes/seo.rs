//! Request-time SEO artifacts.

use crate::state::AppState;
use axum::extract::State;
use axum::http::{HeaderMap, HeaderName, HeaderValue, header};
use axum::response::{IntoResponse, Response};
use chrono::Utc;
use rankbee_generator::{robots_txt, rss_xml, sitemap_xml};

pub const CACHE_POLICY: &str = "public, max-age=0, s-maxage=3600, stale-while-revalidate=60";
pub const NOINDEX: &str = "noindex, nofollow";

const X_ROBOTS_TAG: HeaderName = HeaderName::from_static("x-robots-tag");

fn artifact(content_type: &'static str, indexable: bool, body: String) -> Response {
    let mut headers = HeaderMap::new();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type));
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static(CACHE_POLICY));
    if !indexable {
        headers.insert(X_ROBOTS_TAG, HeaderValue::from_static(NOINDEX));
    }
    (headers, body).into_response()
}

pub async fn robots(State(state): State<AppState>) -> Response {
    let config = state.config();
    let indexable = config.is_indexable();
    artifact(
        "text/plain; charset=utf-8",
        indexable,
        robots_txt(&config.site_url, indexable),
    )
}

pub async fn sitemap(State(state): State<AppState>) -> Response {
    let config = state.config();
    let body = sitemap_xml(&config.site_url, state.routes(), Utc::now());
    artifact("application/xml; charset=utf-8", config.is_indexable(), body)
}

pub async fn rss(State(state): State<AppState>) -> Response {
    let config = state.config();
    let body = rss_xml(&config.site_url, &config.site_name, Utc::now());
    artifact("application/rss+xml; charset=utf-8", true, body)
}
