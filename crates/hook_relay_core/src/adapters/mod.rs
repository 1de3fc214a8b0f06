//! Rendering of webhook events into chat attachments.
//!
//! Adapters are pure: the same event and host always produce the same
//! attachments, and nothing here performs I/O or reads the clock.

use chat_client::ChatAttachment;
use chrono::DateTime;
use config_manager::{HostConfig, HostKind};

use crate::events::WebhookEvent;

pub mod bitbucket_server;
pub mod generic;

pub use bitbucket_server::BitbucketServerAdapter;
pub use generic::GenericHostAdapter;

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;

pub(crate) const COLOR_GREEN: &str = "#36a64f";
pub(crate) const COLOR_BLUE: &str = "#439fe0";
pub(crate) const COLOR_PURPLE: &str = "#6f42c1";
pub(crate) const COLOR_RED: &str = "#d73a49";
pub(crate) const COLOR_ORANGE: &str = "#f2a33a";
pub(crate) const COLOR_GREY: &str = "#a0a0a0";

/// Longest body text copied into an attachment, in characters.
pub(crate) const MAX_BODY_CHARS: usize = 300;

/// Renders events of one family of hosts into chat attachments.
pub trait MessageAdapter {
    /// Produces the attachments for `event`.
    ///
    /// Events the adapter does not understand still yield one minimal
    /// attachment; only pings yield none.
    fn render(&self, event: &WebhookEvent, host: &HostConfig) -> Vec<ChatAttachment>;
}

/// The adapter for a [`HostKind`].
#[derive(Debug, Clone, Copy)]
pub enum Adapter {
    Generic(GenericHostAdapter),
    BitbucketServer(BitbucketServerAdapter),
}

impl Adapter {
    pub fn for_kind(kind: HostKind) -> Self {
        match kind {
            HostKind::Generic => Adapter::Generic(GenericHostAdapter),
            HostKind::BitbucketServer => Adapter::BitbucketServer(BitbucketServerAdapter),
        }
    }
}

impl MessageAdapter for Adapter {
    fn render(&self, event: &WebhookEvent, host: &HostConfig) -> Vec<ChatAttachment> {
        let attachments = match self {
            Adapter::Generic(adapter) => adapter.render(event, host),
            Adapter::BitbucketServer(adapter) => adapter.render(event, host),
        };

        attachments
            .into_iter()
            .map(|a| a.with_footer(host.name(), host.logo()))
            .collect()
    }
}

/// Attachment for events nobody knows how to present.
pub(crate) fn minimal_attachment(host: &HostConfig, hint: Option<&str>) -> ChatAttachment {
    let title = match hint {
        Some(event) => format!("Received a `{event}` event from {}", host.name()),
        None => format!("Received an event from {}", host.name()),
    };
    ChatAttachment::new(title, COLOR_GREY)
}

/// Shortens `text` to at most `max` characters, marking the cut with `…`.
pub(crate) fn truncate(text: &str, max: usize) -> String {
    let text = text.trim();
    if text.chars().count() <= max {
        return text.to_string();
    }
    let cut: String = text.chars().take(max.saturating_sub(1)).collect();
    format!("{}…", cut.trim_end())
}

/// First seven characters of a commit hash.
pub(crate) fn short_hash(hash: &str) -> &str {
    hash.char_indices().nth(7).map_or(hash, |(i, _)| &hash[..i])
}

/// Parses the timestamp formats hosts send into Unix seconds.
///
/// Accepts RFC 3339 (`2024-01-02T03:04:05Z`) and the compact offset form
/// Bitbucket Server uses (`2017-09-19T09:58:11+1000`).
pub(crate) fn parse_timestamp(value: &str) -> Option<i64> {
    DateTime::parse_from_rfc3339(value)
        .or_else(|_| DateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%z"))
        .map(|dt| dt.timestamp())
        .ok()
}
