//! The webhook processing pipeline.

use std::borrow::Cow;

use chat_client::ChatMessage;
use config_manager::{HostRegistry, SignatureSource};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::adapters::{Adapter, MessageAdapter};
use crate::errors::DispatchError;
use crate::events::WebhookEvent;
use crate::host::identify_host;
use crate::signature;

#[cfg(test)]
#[path = "dispatcher_tests.rs"]
mod tests;

/// The parts of an HTTP request the pipeline looks at.
#[derive(Debug, Clone, Copy)]
pub struct InboundWebhook<'a> {
    /// `User-Agent` header value, empty when absent.
    pub user_agent: &'a str,

    /// Raw value of the first signature header present.
    pub signature: Option<&'a [u8]>,

    /// Request body exactly as received.
    pub body: &'a [u8],
}

/// Outcome of a successfully processed webhook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    /// Connectivity check from the named host. Nothing is forwarded.
    Ping { host: String },

    /// A rendered message to post to the chat channel.
    Forward { host: String, message: ChatMessage },
}

/// Runs inbound webhooks through identification, verification and rendering.
///
/// Holds only immutable configuration and is shared between requests.
#[derive(Debug)]
pub struct Dispatcher {
    registry: HostRegistry,
    signature_source: SignatureSource,
}

impl Dispatcher {
    pub fn new(registry: HostRegistry, signature_source: SignatureSource) -> Self {
        Self {
            registry,
            signature_source,
        }
    }

    pub fn registry(&self) -> &HostRegistry {
        &self.registry
    }

    /// Processes one webhook.
    ///
    /// # Errors
    ///
    /// - `DispatchError::UnrecognizedHost` when the user agent does not map
    ///   to a registered host; no secret is touched in that case
    /// - `DispatchError::MalformedPayload` when the body is not JSON
    /// - `DispatchError::SignatureMismatch` when a signature header is present
    ///   and does not match
    pub fn dispatch(&self, webhook: &InboundWebhook<'_>) -> Result<Dispatch, DispatchError> {
        let name = identify_host(webhook.user_agent);
        let host = self.registry.find(&name).ok_or_else(|| {
            warn!(host = %name, "Webhook from unrecognized source");
            DispatchError::UnrecognizedHost { name: name.clone() }
        })?;

        let payload = parse_body(webhook.body)?;

        if let Some(header) = webhook.signature {
            let header = std::str::from_utf8(header).map_err(|_| {
                warn!(host = %host.name(), "Webhook signature header is not valid UTF-8");
                DispatchError::SignatureMismatch
            })?;

            let signed: Cow<'_, [u8]> = match self.signature_source {
                SignatureSource::Canonical => Cow::Owned(serde_json::to_vec(&payload).map_err(
                    |e| DispatchError::MalformedPayload {
                        reason: e.to_string(),
                    },
                )?),
                SignatureSource::Raw => Cow::Borrowed(webhook.body),
            };

            signature::verify(host, &signed, header).inspect_err(|_| {
                warn!(host = %host.name(), "Webhook signature mismatch");
            })?;
        } else {
            debug!(host = %host.name(), "Webhook carries no signature");
        }

        let event = WebhookEvent::classify(host.kind(), &payload);
        if matches!(event, WebhookEvent::Ping) {
            info!(host = %host.name(), "Ping received");
            return Ok(Dispatch::Ping {
                host: host.name().to_string(),
            });
        }

        let attachments = Adapter::for_kind(host.kind()).render(&event, host);
        debug!(
            host = %host.name(),
            event = event.kind_name(),
            attachments = attachments.len(),
            "Webhook rendered"
        );

        Ok(Dispatch::Forward {
            host: host.name().to_string(),
            message: ChatMessage::new(attachments),
        })
    }
}

/// Parses the request body. An empty body is treated as an empty object.
fn parse_body(body: &[u8]) -> Result<Value, DispatchError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Object(Default::default()));
    }

    serde_json::from_slice(body).map_err(|e| DispatchError::MalformedPayload {
        reason: e.to_string(),
    })
}
