//! HTTP request handlers
//!
//! Handlers translate between HTTP and the relay pipeline. They do not
//! contain rendering logic.

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{header, HeaderMap, HeaderValue, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json,
};
use hook_relay_core::{Dispatch, InboundWebhook, SIGNATURE_HEADERS};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{errors::ApiError, AppState};

#[cfg(test)]
#[path = "handlers_tests.rs"]
mod tests;

/// Reply to `POST /command`.
pub const COMMAND_REPLY: &str = "Your ngrok tunnel is up and running!";

/// GET /
///
/// Tunnel probe. Echoes the request path.
pub async fn root_probe(uri: Uri) -> String {
    let path = uri.path_and_query().map_or("/", |p| p.as_str());
    format!("it is working! Path Hit: {path}")
}

/// POST /
///
/// Webhook intake. Pings are answered with `success`; everything else is
/// rendered, posted to the chat channel and answered with an empty `200`,
/// whether or not the channel accepted the message.
pub async fn receive_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, ApiError> {
    let user_agent = headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    // Raw bytes so a present but non-UTF-8 header still fails verification.
    let signature = SIGNATURE_HEADERS
        .iter()
        .find_map(|name| headers.get(*name))
        .map(HeaderValue::as_bytes);

    let webhook = InboundWebhook {
        user_agent,
        signature,
        body: &body,
    };

    match state.dispatcher.dispatch(&webhook)? {
        Dispatch::Ping { .. } => Ok((StatusCode::OK, "success").into_response()),
        Dispatch::Forward { host, message } => {
            match state.sink.post_message(&message).await {
                Ok(()) => info!(
                    host = %host,
                    attachments = message.attachments.len(),
                    "Message forwarded to chat channel"
                ),
                Err(e) => warn!(host = %host, error = %e, "Failed to forward message"),
            }
            Ok(StatusCode::OK.into_response())
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct OAuthQuery {
    pub code: Option<String>,
}

/// GET /oauth
///
/// Completes the chat application's OAuth flow by exchanging `code` for an
/// access token and relaying the provider's JSON answer unchanged.
pub async fn oauth_callback(
    State(state): State<AppState>,
    Query(query): Query<OAuthQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let code = query
        .code
        .filter(|c| !c.is_empty())
        .ok_or(ApiError::MissingOAuthCode)?;

    let oauth = state.oauth.as_ref().ok_or(ApiError::OAuthNotConfigured)?;

    let body = oauth
        .exchange_code(&code)
        .await
        .map_err(ApiError::OAuthExchange)?;

    Ok(Json(body))
}

/// POST /command
///
/// Slash command endpoint used to check that the tunnel is reachable.
pub async fn slash_command() -> &'static str {
    COMMAND_REPLY
}

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> Json<HealthCheckResponse> {
    Json(HealthCheckResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        hosts: state.dispatcher.registry().len(),
    })
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthCheckResponse {
    /// Always `healthy` while the process serves requests
    pub status: String,

    pub version: String,

    /// Current timestamp (RFC 3339)
    pub timestamp: String,

    /// Number of registered webhook hosts
    pub hosts: usize,
}
