//! Typed webhook events.
//!
//! A parsed JSON payload is classified into a [`WebhookEvent`] before it is
//! rendered. Classification never fails: payloads whose shape is not
//! recognised, or whose fields have unexpected types, become
//! [`WebhookEvent::Unknown`].

use config_manager::HostKind;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

pub mod bitbucket_server;
pub mod generic;

pub use bitbucket_server::BitbucketServerEvent;
pub use generic::{
    Account, BranchRef, Comment, Commit, CommitAuthor, Issue, IssueCommentEvent, IssueEvent,
    PullRequest, PullRequestEvent, PushEvent, RefEvent, Repository,
};

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;

/// Bitbucket Server event key sent by the "Test connection" button.
pub const BITBUCKET_PING_EVENT_KEY: &str = "diagnostics:ping";

/// A webhook payload classified by shape.
#[derive(Debug, Clone)]
pub enum WebhookEvent {
    /// Connectivity check; acknowledged and never forwarded.
    Ping,
    Push(Box<PushEvent>),
    /// Branch or tag created or deleted without a push.
    Ref(Box<RefEvent>),
    PullRequest(Box<PullRequestEvent>),
    Issue(Box<IssueEvent>),
    IssueComment(Box<IssueCommentEvent>),
    BitbucketServer(Box<BitbucketServerEvent>),
    /// Anything else. `hint` names the event when the payload says what it is.
    Unknown { hint: Option<String> },
}

impl WebhookEvent {
    /// Classifies a payload sent by a host of the given kind.
    pub fn classify(kind: HostKind, payload: &Value) -> Self {
        if is_ping(payload) {
            return WebhookEvent::Ping;
        }

        match kind {
            HostKind::BitbucketServer => match BitbucketServerEvent::deserialize(payload) {
                Ok(event) => WebhookEvent::BitbucketServer(Box::new(event)),
                Err(e) => {
                    debug!(error = %e, "Bitbucket Server payload did not match the expected shape");
                    WebhookEvent::unknown(payload)
                }
            },
            HostKind::Generic => classify_generic(payload),
        }
    }

    fn unknown(payload: &Value) -> Self {
        let hint = ["eventKey", "event", "object_kind", "action"]
            .iter()
            .find_map(|key| payload.get(*key).and_then(Value::as_str))
            .map(str::to_string);
        WebhookEvent::Unknown { hint }
    }

    /// Short name of the variant, for logs.
    pub fn kind_name(&self) -> &'static str {
        match self {
            WebhookEvent::Ping => "ping",
            WebhookEvent::Push(_) => "push",
            WebhookEvent::Ref(_) => "ref",
            WebhookEvent::PullRequest(_) => "pull_request",
            WebhookEvent::Issue(_) => "issue",
            WebhookEvent::IssueComment(_) => "issue_comment",
            WebhookEvent::BitbucketServer(_) => "bitbucket_server",
            WebhookEvent::Unknown { .. } => "unknown",
        }
    }
}

/// True for GitHub/Coding pings (truthy `zen`) and Bitbucket Server
/// `diagnostics:ping` events.
pub fn is_ping(payload: &Value) -> bool {
    if payload.get("zen").is_some_and(is_truthy) {
        return true;
    }

    payload.get("eventKey").and_then(Value::as_str) == Some(BITBUCKET_PING_EVENT_KEY)
}

/// Truthiness as webhook senders use it: `false`, `null`, `0`, and `""`
/// are false, everything else is true.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn classify_generic(payload: &Value) -> WebhookEvent {
    let has = |key: &str| payload.get(key).is_some_and(Value::is_object);

    let parsed = if has("pull_request") || has("merge_request") {
        PullRequestEvent::deserialize(payload)
            .map(|e| WebhookEvent::PullRequest(Box::new(e)))
    } else if has("issue") && has("comment") {
        IssueCommentEvent::deserialize(payload)
            .map(|e| WebhookEvent::IssueComment(Box::new(e)))
    } else if has("issue") {
        IssueEvent::deserialize(payload).map(|e| WebhookEvent::Issue(Box::new(e)))
    } else if is_ref_event(payload) {
        RefEvent::deserialize(payload).map(|e| WebhookEvent::Ref(Box::new(e)))
    } else if payload.get("ref").is_some_and(Value::is_string) {
        PushEvent::deserialize(payload).map(|e| WebhookEvent::Push(Box::new(e)))
    } else {
        return WebhookEvent::unknown(payload);
    };

    parsed.unwrap_or_else(|e| {
        debug!(error = %e, "Payload did not match the expected shape");
        WebhookEvent::unknown(payload)
    })
}

/// GitHub `create`/`delete` payloads: a string `ref` plus `ref_type`, and no
/// commit list.
fn is_ref_event(payload: &Value) -> bool {
    payload.get("ref").is_some_and(Value::is_string)
        && payload.get("ref_type").is_some_and(Value::is_string)
        && payload.get("commits").is_none()
}
