//! Request tracing middleware

use axum::{
    extract::Request,
    http::{HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};
use tracing::Instrument;

#[cfg(test)]
#[path = "middleware_tests.rs"]
mod tests;

/// Response header carrying the request id.
pub static REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

/// Assigns a request id, logs start and completion inside a span carrying
/// it, and returns it in the `x-request-id` response header.
pub async fn tracing_middleware(request: Request, next: Next) -> Response {
    let request_id = uuid::Uuid::new_v4().to_string();
    let span = tracing::info_span!("request", request_id = %request_id);

    async move {
        tracing::info!(
            method = %request.method(),
            uri = %request.uri().path(),
            "Request started"
        );

        let mut response = next.run(request).await;

        tracing::info!(status = %response.status(), "Request completed");

        if let Ok(value) = HeaderValue::from_str(&request_id) {
            response
                .headers_mut()
                .insert(REQUEST_ID_HEADER.clone(), value);
        }

        response
    }
    .instrument(span)
    .await
}
