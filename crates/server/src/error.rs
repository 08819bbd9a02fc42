//! Subscription endpoint errors and response formatting.

use axum::Json;
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::Serialize;

pub const GENERIC_FAILURE: &str = "Something went wrong. Please try again later.";
pub const ALREADY_SUBSCRIBED: &str = "This email is already subscribed to our newsletter.";

/// Body of every `/api/subscribe` response.
#[derive(Debug, Clone, Serialize)]
pub struct SubscribeResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SubscribeResponse {
    pub fn ok() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(message.into()),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SubscribeError {
    #[error("method not allowed")]
    MethodNotAllowed,

    #[error("email is required")]
    MissingEmail,

    #[error("newsletter CMS not configured")]
    NotConfigured,

    /// Not a failure for the caller; reported as a 200 with `success: false`.
    #[error("already subscribed")]
    AlreadySubscribed,

    #[error("upstream rejected request: {0}")]
    Upstream(StatusCode),

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for SubscribeError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::MethodNotAllowed => {
                (StatusCode::METHOD_NOT_ALLOWED, "Method not allowed".to_string())
            }
            Self::MissingEmail => (StatusCode::BAD_REQUEST, "Email is required".to_string()),
            Self::NotConfigured => {
                tracing::error!(
                    "subscription attempted without a valid newsletter CMS configuration"
                );
                (StatusCode::INTERNAL_SERVER_ERROR, GENERIC_FAILURE.to_string())
            }
            Self::AlreadySubscribed => (StatusCode::OK, ALREADY_SUBSCRIBED.to_string()),
            Self::Upstream(upstream) => {
                tracing::error!(status = upstream.as_u16(), "newsletter CMS rejected subscription");
                let reason = upstream.canonical_reason().unwrap_or("Unknown error");
                (StatusCode::BAD_GATEWAY, format!("Failed to subscribe: {}", reason))
            }
            Self::Internal(err) => {
                tracing::error!(error = %err, "subscription failed");
                (StatusCode::INTERNAL_SERVER_ERROR, GENERIC_FAILURE.to_string())
            }
        };

        let mut response = (status, Json(SubscribeResponse::failed(message))).into_response();
        if matches!(self, Self::MethodNotAllowed) {
            response
                .headers_mut()
                .insert(header::ALLOW, HeaderValue::from_static("POST"));
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (SubscribeError::MethodNotAllowed, StatusCode::METHOD_NOT_ALLOWED),
            (SubscribeError::MissingEmail, StatusCode::BAD_REQUEST),
            (SubscribeError::NotConfigured, StatusCode::INTERNAL_SERVER_ERROR),
            (SubscribeError::AlreadySubscribed, StatusCode::OK),
            (SubscribeError::Upstream(StatusCode::SERVICE_UNAVAILABLE), StatusCode::BAD_GATEWAY),
            (
                SubscribeError::Internal(anyhow::anyhow!("connection reset")),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (error, expected) in cases {
            assert_eq!(error.into_response().status(), expected);
        }
    }

    #[test]
    fn test_method_not_allowed_sets_allow() {
        let response = SubscribeError::MethodNotAllowed.into_response();
        assert_eq!(response.headers().get(header::ALLOW).unwrap(), "POST");
    }

    #[test]
    fn test_success_body_omits_error() {
        let body = serde_json::to_value(SubscribeResponse::ok()).unwrap();
        assert_eq!(body, serde_json::json!({"success": true}));
    }
}
