//! Error handling and HTTP error conversion
//!
//! Domain errors are translated to HTTP responses here, at the boundary.
//! Webhook senders get short plain-text messages that never reveal which
//! check failed internally; the OAuth endpoint answers in JSON.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use hook_relay_core::DispatchError;
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;

#[cfg(test)]
#[path = "errors_tests.rs"]
mod tests;

/// Body returned when `/oauth` is called without a `code` parameter.
pub const MISSING_CODE_MESSAGE: &str = "Looks like we're not getting code.";

/// Standard JSON error body.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub error: ErrorDetails,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorDetails {
    /// Machine-readable error code
    pub code: String,

    /// Human-readable error message
    pub message: String,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: ErrorDetails {
                code: code.into(),
                message: message.into(),
            },
        }
    }
}

/// Errors returned by the HTTP handlers.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    #[error("OAuth request without code")]
    MissingOAuthCode,

    #[error("OAuth client credentials are not configured")]
    OAuthNotConfigured,

    #[error("OAuth code exchange failed: {0}")]
    OAuthExchange(#[source] chat_client::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        log_error(&self, status);

        match self {
            ApiError::Dispatch(DispatchError::UnrecognizedHost { .. }) => {
                (status, "Unrecognized webhook source").into_response()
            }
            ApiError::Dispatch(DispatchError::SignatureMismatch) => {
                (status, "Invalid signature").into_response()
            }
            ApiError::Dispatch(DispatchError::MalformedPayload { .. }) => {
                (status, "Invalid payload").into_response()
            }
            ApiError::MissingOAuthCode => {
                (status, Json(json!({ "Error": MISSING_CODE_MESSAGE }))).into_response()
            }
            ApiError::OAuthNotConfigured => (
                status,
                Json(ErrorResponse::new(
                    "OAuthNotConfigured",
                    "OAuth is not configured on this relay",
                )),
            )
                .into_response(),
            ApiError::OAuthExchange(_) => (
                status,
                Json(ErrorResponse::new(
                    "UpstreamError",
                    "The OAuth provider could not be reached",
                )),
            )
                .into_response(),
        }
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Dispatch(_) => StatusCode::BAD_REQUEST,
            ApiError::MissingOAuthCode | ApiError::OAuthNotConfigured => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ApiError::OAuthExchange(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

/// Log error with appropriate level based on HTTP status
fn log_error(error: &ApiError, status: StatusCode) {
    match status {
        StatusCode::INTERNAL_SERVER_ERROR | StatusCode::BAD_GATEWAY => {
            tracing::error!("API error: {} - {}", status, error);
        }
        StatusCode::BAD_REQUEST | StatusCode::NOT_FOUND => {
            tracing::warn!("API error: {} - {}", status, error);
        }
        _ => {
            tracing::info!("API error: {} - {}", status, error);
        }
    }
}
