//! Shared fixtures for handler and routing tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{body::Body, http::Request, response::Response, Router};
use chat_client::{ChatMessage, MessageSink};
use config_manager::{HostConfig, HostRegistry, SignatureSource};
use hook_relay_core::Dispatcher;
use tower::ServiceExt;

use crate::{routes::create_router, AppState};

pub const GITHUB_UA: &str = "GitHub-Hookshot/044aadd";

/// Sink that keeps every message it is given.
#[derive(Default)]
pub struct RecordingSink {
    messages: Mutex<Vec<ChatMessage>>,
}

impl RecordingSink {
    pub fn messages(&self) -> Vec<ChatMessage> {
        self.messages.lock().unwrap().clone()
    }
}

#[async_trait]
impl MessageSink for RecordingSink {
    async fn post_message(&self, message: &ChatMessage) -> Result<(), chat_client::Error> {
        self.messages.lock().unwrap().push(message.clone());
        Ok(())
    }
}

/// Sink whose channel always rejects messages.
pub struct RejectingSink;

#[async_trait]
impl MessageSink for RejectingSink {
    async fn post_message(&self, _message: &ChatMessage) -> Result<(), chat_client::Error> {
        Err(chat_client::Error::UnexpectedStatus {
            status: 500,
            body: "channel_is_archived".to_string(),
        })
    }
}

pub fn test_registry() -> HostRegistry {
    HostRegistry::new(vec![
        HostConfig::new("github", "topsecret").with_logo("https://example.com/github.png"),
        HostConfig::new("coding.net", "coding-secret"),
        HostConfig::new("bitbucket-cloud", "cloud-secret"),
        HostConfig::new("bitbucket-server", "s3cr3t")
            .with_bitbucket_url("https://bitbucket.example.com"),
    ])
    .unwrap()
}

pub fn state_with_sink(sink: Arc<dyn MessageSink>) -> AppState {
    AppState::new(
        Dispatcher::new(test_registry(), SignatureSource::Canonical),
        sink,
        None,
    )
}

/// Router backed by a recording sink, and the sink.
pub fn recording_app() -> (Router, Arc<RecordingSink>) {
    let sink = Arc::new(RecordingSink::default());
    (create_router(state_with_sink(sink.clone())), sink)
}

pub async fn send(app: Router, request: Request<Body>) -> Response {
    app.oneshot(request).await.unwrap()
}

pub async fn body_text(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub fn webhook_request(user_agent: &str, signature: Option<&str>, body: &str) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/")
        .header("content-type", "application/json")
        .header("user-agent", user_agent);
    if let Some(signature) = signature {
        builder = builder.header("x-hub-signature", signature);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}
