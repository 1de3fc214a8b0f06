//! Hook relay HTTP service
//!
//! Receives repository-host webhooks on `POST /`, turns them into chat
//! messages with [`hook_relay_core::Dispatcher`] and posts them to the
//! configured chat channel.
//!
//! # Architecture
//!
//! This crate is the HTTP layer and handles:
//! - request/response translation
//! - mapping of domain errors to HTTP responses
//! - delivery of rendered messages through a [`MessageSink`]
//! - routing and server lifecycle
//!
//! The dependency flows: HTTP API → core, never the reverse.

use std::sync::Arc;
use std::time::Duration;

use chat_client::{build_http_client, ChatClient, MessageSink, OAuthClient};
use config_manager::RelayConfig;
use hook_relay_core::Dispatcher;

pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod server;

pub use errors::{ApiError, ErrorResponse};
pub use server::{ApiConfig, ApiServer};

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;

#[cfg(test)]
mod test_support;

/// Application state shared across handlers
///
/// Everything in here is immutable after start-up.
#[derive(Clone)]
pub struct AppState {
    /// Webhook pipeline holding the host registry
    pub dispatcher: Arc<Dispatcher>,

    /// Destination of rendered messages
    pub sink: Arc<dyn MessageSink>,

    /// OAuth code exchange, absent when no client credentials are configured
    pub oauth: Option<Arc<OAuthClient>>,
}

impl AppState {
    pub fn new(
        dispatcher: Dispatcher,
        sink: Arc<dyn MessageSink>,
        oauth: Option<OAuthClient>,
    ) -> Self {
        Self {
            dispatcher: Arc::new(dispatcher),
            sink,
            oauth: oauth.map(Arc::new),
        }
    }

    /// Builds the production state from a loaded configuration.
    ///
    /// The chat and OAuth clients share one connection pool.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built or one of the
    /// configured URLs is invalid.
    pub fn from_config(config: RelayConfig) -> Result<Self, chat_client::Error> {
        let timeout = Duration::from_secs(config.server.outbound_timeout_seconds);
        let http = build_http_client(timeout)?;

        let chat = ChatClient::with_http_client(http.clone(), &config.channel_url)?;

        let oauth = config
            .oauth
            .map(|settings| {
                OAuthClient::new(
                    http,
                    &settings.access_url,
                    settings.client_id,
                    settings.client_secret,
                )
            })
            .transpose()?;

        let dispatcher = Dispatcher::new(config.registry, config.signature_source);

        Ok(Self::new(dispatcher, Arc::new(chat), oauth))
    }
}
