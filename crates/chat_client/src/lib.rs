//! Crate for talking to a Slack-compatible chat platform.
//!
//! This crate provides:
//! - the [`models`] of chat messages and attachments
//! - a [`ChatClient`] that posts messages to a channel's incoming webhook URL
//! - an [`OAuthClient`] that exchanges an OAuth authorization code for an
//!   access token

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, error, info, instrument};
use url::Url;

pub mod errors;
pub use errors::Error;

pub mod models;
pub use models::{AttachmentField, ChatAttachment, ChatMessage};

pub mod oauth;
pub use oauth::OAuthClient;

// Reference the tests module in the separate file
#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;

/// Destination for rendered chat messages.
///
/// Implemented by [`ChatClient`]; other implementations can capture messages
/// instead of sending them.
#[async_trait]
pub trait MessageSink: Send + Sync {
    /// Delivers a message to the chat channel.
    ///
    /// # Errors
    ///
    /// Returns an error if the message could not be delivered. Delivery is
    /// attempted once.
    async fn post_message(&self, message: &ChatMessage) -> Result<(), Error>;
}

/// A client for a chat channel's incoming webhook.
#[derive(Debug, Clone)]
pub struct ChatClient {
    http: reqwest::Client,
    channel_url: Url,
}

impl ChatClient {
    /// Creates a client that posts to `channel_url`.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidUrl` if `channel_url` is not an absolute URL and
    /// `Error::ClientInit` if the HTTP client cannot be built.
    pub fn new(channel_url: &str, timeout: Duration) -> Result<Self, Error> {
        let channel_url = parse_url(channel_url)?;
        let http = build_http_client(timeout)?;
        Ok(Self { http, channel_url })
    }

    /// Creates a client that reuses an existing HTTP client.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidUrl` if `channel_url` is not an absolute URL.
    pub fn with_http_client(http: reqwest::Client, channel_url: &str) -> Result<Self, Error> {
        Ok(Self {
            http,
            channel_url: parse_url(channel_url)?,
        })
    }

    pub fn channel_url(&self) -> &Url {
        &self.channel_url
    }
}

#[async_trait]
impl MessageSink for ChatClient {
    #[instrument(skip(self, message), fields(attachments = message.attachments.len()))]
    async fn post_message(&self, message: &ChatMessage) -> Result<(), Error> {
        debug!("Posting message to chat channel");

        let response = self
            .http
            .post(self.channel_url.clone())
            .json(message)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to reach chat backend");
                Error::Transport(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(status = status.as_u16(), "Chat backend rejected message");
            return Err(Error::UnexpectedStatus {
                status: status.as_u16(),
                body,
            });
        }

        info!("Pushed message to chat channel");
        Ok(())
    }
}

/// Builds the shared HTTP client with the given request timeout.
///
/// # Errors
///
/// Returns `Error::ClientInit` if the TLS backend cannot be initialised.
pub fn build_http_client(timeout: Duration) -> Result<reqwest::Client, Error> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(concat!("hook-relay/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| Error::ClientInit(e.to_string()))
}

fn parse_url(url: &str) -> Result<Url, Error> {
    Url::parse(url).map_err(|e| Error::InvalidUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })
}
