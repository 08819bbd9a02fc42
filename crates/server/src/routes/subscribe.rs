//! Newsletter signup proxy.

use crate::error::{SubscribeError, SubscribeResponse};
use crate::ghost::MemberOutcome;
use crate::state::AppState;
use anyhow::Context;
use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::Method;
use serde_json::Value;

fn non_blank<'a>(payload: &'a Value, field: &str) -> Option<&'a str> {
    payload
        .get(field)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

/// Handles every method on `/api/subscribe`; only POST is accepted.
pub async fn subscribe(
    State(state): State<AppState>,
    method: Method,
    body: Bytes,
) -> Result<Json<SubscribeResponse>, SubscribeError> {
    if method != Method::POST {
        return Err(SubscribeError::MethodNotAllowed);
    }

    let payload: Value = serde_json::from_slice(&body).context("Invalid subscribe request body")?;
    let email = non_blank(&payload, "email").ok_or(SubscribeError::MissingEmail)?;
    let name = non_blank(&payload, "name");

    let ghost = state.ghost().ok_or(SubscribeError::NotConfigured)?;

    match ghost.create_member(email, name).await? {
        MemberOutcome::Created => {
            tracing::info!("newsletter subscription created");
            Ok(Json(SubscribeResponse::ok()))
        }
        MemberOutcome::AlreadyExists => Err(SubscribeError::AlreadySubscribed),
        MemberOutcome::Rejected(status) => Err(SubscribeError::Upstream(status)),
    }
}
