//! Static site fallback.
//!
//! Manifest routes get their prerendered page when one exists and the SPA
//! shell otherwise. Everything else is a plain file lookup under the
//! static directory.

use crate::state::AppState;
use axum::extract::{Request, State};
use axum::response::{Html, IntoResponse, Response};
use rankbee_core::PAGE_FILE;
use tower::ServiceExt;
use tower_http::services::ServeDir;

pub async fn site(State(state): State<AppState>, request: Request) -> Response {
    if let Some(route) = state.route_for(request.uri().path()) {
        let mut candidates = Vec::with_capacity(2);
        if let Ok(relative) = route.output_path() {
            candidates.push(state.static_dir().join(relative));
        }
        candidates.push(state.static_dir().join(PAGE_FILE));

        for candidate in candidates {
            if let Ok(html) = tokio::fs::read_to_string(&candidate).await {
                return Html(html).into_response();
            }
        }
        tracing::debug!(route = %route, "no page or shell on disk for route");
    }

    match ServeDir::new(state.static_dir()).oneshot(request).await {
        Ok(response) => response.into_response(),
        Err(never) => match never {},
    }
}
