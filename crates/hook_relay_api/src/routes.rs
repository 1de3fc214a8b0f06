//! HTTP routing configuration
//!
//! # Route Structure
//!
//! - GET    / - Tunnel probe
//! - POST   / - Webhook intake
//! - GET    /oauth - OAuth code exchange
//! - POST   /command - Slash command probe
//! - GET    /health - Health check

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use std::time::Duration;
use tower_http::{
    timeout::TimeoutLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};

use crate::{handlers, middleware as api_middleware, AppState};

#[cfg(test)]
#[path = "routes_tests.rs"]
mod tests;

/// Largest accepted request body. GitHub caps webhook payloads at 25 MB.
pub const MAX_BODY_BYTES: usize = 25 * 1024 * 1024;

/// Request timeout applied to every route.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Create the complete router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    // Headers stay out of the span: they carry webhook signatures
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new())
        .on_response(DefaultOnResponse::new());

    Router::new()
        .route(
            "/",
            get(handlers::root_probe).post(handlers::receive_webhook),
        )
        .route("/oauth", get(handlers::oauth_callback))
        .route("/command", post(handlers::slash_command))
        .route("/health", get(handlers::health_check))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(middleware::from_fn(api_middleware::tracing_middleware))
        .layer(TimeoutLayer::new(REQUEST_TIMEOUT))
        .layer(trace_layer)
        .with_state(state)
}
