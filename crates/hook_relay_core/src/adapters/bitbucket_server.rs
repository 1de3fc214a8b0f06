//! Adapter for Bitbucket Server (Data Center) webhooks.
//!
//! Rendering is driven by `eventKey`. Links into the Bitbucket web UI are
//! built from the host's `repo_url`, falling back to `bitbucket_url`; without
//! either, only links carried by the payload are used.

use chat_client::{AttachmentField, ChatAttachment};
use config_manager::HostConfig;

use super::{
    minimal_attachment, parse_timestamp, short_hash, truncate, MessageAdapter, COLOR_BLUE,
    COLOR_GREEN, COLOR_GREY, COLOR_ORANGE, COLOR_PURPLE, COLOR_RED, MAX_BODY_CHARS,
};
use crate::events::bitbucket_server::{
    BitbucketParticipant, BitbucketPullRequest, BitbucketRepository, BitbucketUser, RefChange,
};
use crate::events::{BitbucketServerEvent, WebhookEvent};

#[cfg(test)]
#[path = "bitbucket_server_tests.rs"]
mod tests;

#[derive(Debug, Clone, Copy, Default)]
pub struct BitbucketServerAdapter;

impl MessageAdapter for BitbucketServerAdapter {
    fn render(&self, event: &WebhookEvent, host: &HostConfig) -> Vec<ChatAttachment> {
        match event {
            WebhookEvent::Ping => Vec::new(),
            WebhookEvent::BitbucketServer(event) => render_event(event, host),
            WebhookEvent::Unknown { hint } => vec![minimal_attachment(host, hint.as_deref())],
            other => vec![minimal_attachment(host, Some(other.kind_name()))],
        }
    }
}

fn render_event(event: &BitbucketServerEvent, host: &HostConfig) -> Vec<ChatAttachment> {
    let links = Links::new(host.link_base(), event.repository());
    let ts = event.date.as_deref().and_then(parse_timestamp);
    let key = event.event_key.as_str();

    let attachments = match key {
        "repo:refs_changed" => render_refs_changed(event, &links),
        "repo:comment:added" | "repo:comment:edited" | "repo:comment:deleted" => {
            vec![render_commit_comment(event, &links)]
        }
        "repo:forked" => vec![render_repository(event, &links, "forked")],
        "repo:modified" => vec![render_repository(event, &links, "modified")],
        _ if key.starts_with("pr:") => match &event.pull_request {
            Some(pr) => vec![render_pull_request(event, pr, host.link_base())],
            None => vec![minimal_attachment(host, Some(key))],
        },
        _ => vec![minimal_attachment(host, Some(key).filter(|k| !k.is_empty()))],
    };

    attachments
        .into_iter()
        .map(|a| a.with_timestamp(ts))
        .collect()
}

fn render_refs_changed(event: &BitbucketServerEvent, links: &Links) -> Vec<ChatAttachment> {
    let actor = event.actor_name();

    if event.changes.is_empty() {
        let title = format!("{}{actor} pushed", links.prefix());
        return vec![with_actor(
            ChatAttachment::new(title, COLOR_GREEN).with_title_link(links.repository()),
            event.actor.as_ref(),
        )];
    }

    event
        .changes
        .iter()
        .map(|change| render_change(event, change, links, actor))
        .collect()
}

fn render_change(
    event: &BitbucketServerEvent,
    change: &RefChange,
    links: &Links,
    actor: &str,
) -> ChatAttachment {
    let ref_name = change.ref_name().unwrap_or("unknown ref");
    let ref_kind = if change.target.as_ref().is_some_and(|r| r.is_tag()) {
        "tag"
    } else {
        "branch"
    };
    let from = change.from_hash.as_deref().map(short_hash).unwrap_or_default();
    let to = change.to_hash.as_deref().unwrap_or_default();

    let (title, color, link) = match change.change_type() {
        "ADD" => (
            format!("{}{actor} created {ref_kind} {ref_name}", links.prefix()),
            COLOR_GREEN,
            links.commit(to),
        ),
        "DELETE" => (
            format!("{}{actor} deleted {ref_kind} {ref_name}", links.prefix()),
            COLOR_RED,
            // The ref is gone; its last commit is still browsable.
            links.browse(change.from_hash.as_deref().unwrap_or_default()),
        ),
        _ => (
            format!("{}{actor} pushed to {ref_name}", links.prefix()),
            COLOR_GREEN,
            links.commit(to),
        ),
    };

    let text = if change.is_delete() {
        format!("{}: {from}", change.change_type())
    } else {
        format!("{}: {from}..{}", change.change_type(), short_hash(to))
    };

    with_actor(
        ChatAttachment::new(title, color)
            .with_title_link(link)
            .with_text(text),
        event.actor.as_ref(),
    )
}

fn render_pull_request(
    event: &BitbucketServerEvent,
    pr: &BitbucketPullRequest,
    link_base: Option<&str>,
) -> ChatAttachment {
    let key = event.event_key.as_str();
    let (verb, color) = pull_request_verb(key);
    let links = Links::new(link_base, pr.target_repository().or(event.repository()));

    let title = format!(
        "{}Pull request #{} {verb}: {}",
        links.prefix(),
        pr.id.unwrap_or_default(),
        pr.title.as_deref().unwrap_or_default()
    );

    let link = pr
        .self_link()
        .map(str::to_string)
        .or_else(|| pr.id.and_then(|id| links.pull_request(id)));

    let mut attachment = with_actor(
        ChatAttachment::new(title, color).with_title_link(link),
        event.actor.as_ref(),
    );

    if let Some(source) = pr.from_ref.as_ref().and_then(|r| r.name()) {
        attachment = attachment.with_field(AttachmentField::new("Source", source, true));
    }
    if let Some(target) = pr.to_ref.as_ref().and_then(|r| r.name()) {
        attachment = attachment.with_field(AttachmentField::new("Target", target, true));
    }

    if key.starts_with("pr:reviewer:") {
        if let Some(reviewer) = event.participant.as_ref() {
            attachment = attachment.with_field(reviewer_field(reviewer, event));
        }
    }

    let text = if key.starts_with("pr:comment:") {
        event.comment.as_ref().and_then(|c| c.text.as_deref())
    } else if key == "pr:opened" {
        pr.description.as_deref()
    } else {
        None
    };
    if let Some(text) = text.filter(|t| !t.trim().is_empty()) {
        attachment = attachment.with_text(truncate(text, MAX_BODY_CHARS));
    }

    attachment
}

fn pull_request_verb(event_key: &str) -> (&str, &'static str) {
    match event_key {
        "pr:opened" => ("opened", COLOR_BLUE),
        "pr:merged" => ("merged", COLOR_PURPLE),
        "pr:declined" => ("declined", COLOR_RED),
        "pr:deleted" => ("deleted", COLOR_RED),
        "pr:modified" => ("updated", COLOR_GREY),
        "pr:from_ref_updated" => ("updated with new commits", COLOR_GREY),
        "pr:reviewer:approved" => ("approved", COLOR_GREEN),
        "pr:reviewer:unapproved" => ("unapproved", COLOR_GREY),
        "pr:reviewer:needs_work" => ("marked as needs work", COLOR_ORANGE),
        "pr:reviewer:updated" => ("reviewers updated", COLOR_GREY),
        "pr:comment:added" => ("commented", COLOR_GREY),
        "pr:comment:edited" => ("comment edited", COLOR_GREY),
        "pr:comment:deleted" => ("comment deleted", COLOR_GREY),
        other => (other.trim_start_matches("pr:"), COLOR_GREY),
    }
}

fn reviewer_field(reviewer: &BitbucketParticipant, event: &BitbucketServerEvent) -> AttachmentField {
    let name = reviewer
        .user
        .as_ref()
        .and_then(BitbucketUser::label)
        .unwrap_or_else(|| event.actor_name());
    let status = reviewer.status.as_deref().unwrap_or("UNAPPROVED");
    let value = match event.previous_status.as_deref() {
        Some(previous) if previous != status => format!("{name}: {previous} → {status}"),
        _ => format!("{name}: {status}"),
    };
    AttachmentField::new("Reviewer", value, false)
}

fn render_commit_comment(event: &BitbucketServerEvent, links: &Links) -> ChatAttachment {
    let commit = event.commit.as_deref().unwrap_or_default();
    let verb = match event.event_key.as_str() {
        "repo:comment:edited" => "edited a comment on",
        "repo:comment:deleted" => "deleted a comment on",
        _ => "commented on",
    };
    let title = format!(
        "{}{} {verb} commit `{}`",
        links.prefix(),
        event.actor_name(),
        short_hash(commit)
    );

    let text = event
        .comment
        .as_ref()
        .and_then(|c| c.text.as_deref())
        .map(|t| truncate(t, MAX_BODY_CHARS))
        .unwrap_or_default();

    with_actor(
        ChatAttachment::new(title, COLOR_GREY)
            .with_title_link(links.commit(commit))
            .with_text(text),
        event.actor.as_ref(),
    )
}

fn render_repository(event: &BitbucketServerEvent, links: &Links, verb: &str) -> ChatAttachment {
    let title = format!("{}Repository {verb} by {}", links.prefix(), event.actor_name());

    let mut attachment = ChatAttachment::new(title, COLOR_GREY).with_title_link(links.browse(""));

    if let (Some(old), Some(new)) = (
        event.old.as_ref().and_then(BitbucketRepository::label),
        event.new.as_ref().and_then(BitbucketRepository::label),
    ) {
        if old != new {
            attachment = attachment.with_text(format!("Renamed from {old} to {new}"));
        }
    }

    with_actor(attachment, event.actor.as_ref())
}

fn with_actor(attachment: ChatAttachment, actor: Option<&BitbucketUser>) -> ChatAttachment {
    attachment.with_author(
        actor.and_then(BitbucketUser::label).unwrap_or_default(),
        None,
    )
}

/// Web UI links for one repository.
struct Links {
    repository: Option<String>,
    label: Option<String>,
}

impl Links {
    fn new(base: Option<&str>, repository: Option<&BitbucketRepository>) -> Self {
        let repo_path = repository.and_then(|r| match (r.project_key(), r.slug()) {
            (Some(key), Some(slug)) => Some(format!("projects/{key}/repos/{slug}")),
            _ => None,
        });

        Self {
            repository: base
                .zip(repo_path)
                .map(|(base, path)| format!("{base}/{path}")),
            label: repository.and_then(BitbucketRepository::label),
        }
    }

    /// `[KEY/slug] ` or nothing.
    fn prefix(&self) -> String {
        self.label
            .as_deref()
            .map(|l| format!("[{l}] "))
            .unwrap_or_default()
    }

    fn repository(&self) -> Option<String> {
        self.repository.clone()
    }

    /// Source browser at `revision`, or at the default branch.
    fn browse(&self, revision: &str) -> Option<String> {
        self.repository.as_ref().map(|r| {
            if revision.is_empty() {
                format!("{r}/browse")
            } else {
                format!("{r}/browse?at={revision}")
            }
        })
    }

    fn commit(&self, hash: &str) -> Option<String> {
        if hash.is_empty() {
            return self.repository();
        }
        self.repository
            .as_ref()
            .map(|r| format!("{r}/commits/{hash}"))
    }

    fn pull_request(&self, id: u64) -> Option<String> {
        self.repository
            .as_ref()
            .map(|r| format!("{r}/pull-requests/{id}/overview"))
    }
}
