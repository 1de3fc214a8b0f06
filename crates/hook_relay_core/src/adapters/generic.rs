//! Adapter for GitHub-style hosts: GitHub, Coding.net, Bitbucket Cloud and
//! anything else that is not Bitbucket Server.

use chat_client::{AttachmentField, ChatAttachment};
use config_manager::HostConfig;

use super::{
    minimal_attachment, parse_timestamp, short_hash, truncate, MessageAdapter, COLOR_BLUE,
    COLOR_GREEN, COLOR_GREY, COLOR_PURPLE, COLOR_RED, MAX_BODY_CHARS,
};
use crate::events::{
    Account, IssueCommentEvent, IssueEvent, PullRequestEvent, PushEvent, RefEvent, Repository,
    WebhookEvent,
};

#[cfg(test)]
#[path = "generic_tests.rs"]
mod tests;

/// Commit lines listed before the rest are summarised.
const MAX_COMMIT_LINES: usize = 10;

#[derive(Debug, Clone, Copy, Default)]
pub struct GenericHostAdapter;

impl MessageAdapter for GenericHostAdapter {
    fn render(&self, event: &WebhookEvent, host: &HostConfig) -> Vec<ChatAttachment> {
        match event {
            WebhookEvent::Ping => Vec::new(),
            WebhookEvent::Push(push) => vec![render_push(push)],
            WebhookEvent::Ref(event) => vec![render_ref(event)],
            WebhookEvent::PullRequest(pr) => vec![render_pull_request(pr)],
            WebhookEvent::Issue(issue) => vec![render_issue(issue)],
            WebhookEvent::IssueComment(comment) => vec![render_issue_comment(comment)],
            WebhookEvent::BitbucketServer(event) => {
                vec![minimal_attachment(host, Some(event.event_key.as_str()))]
            }
            WebhookEvent::Unknown { hint } => vec![minimal_attachment(host, hint.as_deref())],
        }
    }
}

fn render_push(push: &PushEvent) -> ChatAttachment {
    let (ref_kind, ref_name) = describe_ref(&push.git_ref);
    let repo = push.repository.as_ref().and_then(Repository::label);
    let author = push.author().unwrap_or_default();

    let (title, color) = if push.is_deleted() {
        (
            format!("{}{ref_kind} {ref_name} deleted", repo_prefix(repo)),
            COLOR_RED,
        )
    } else if push.commits.is_empty() {
        let verb = if push.is_created() { "created" } else { "updated" };
        (
            format!("{}{ref_kind} {ref_name} {verb}", repo_prefix(repo)),
            COLOR_GREEN,
        )
    } else {
        let count = push.commits.len();
        let noun = if count == 1 { "commit" } else { "commits" };
        let scope = match repo {
            Some(repo) => format!("[{repo}:{ref_name}]"),
            None => format!("[{ref_name}]"),
        };
        (format!("{scope} {count} new {noun}"), COLOR_GREEN)
    };

    let fallback = if author.is_empty() {
        title.clone()
    } else {
        format!("{title} by {author}")
    };

    let link = push
        .compare
        .clone()
        .filter(|c| !c.is_empty())
        .or_else(|| push.repository.as_ref().and_then(Repository::link).map(str::to_string));

    let actor = push.actor();

    ChatAttachment::new(title, color)
        .with_fallback(fallback)
        .with_author(author, actor.and_then(Account::link).map(str::to_string))
        .with_author_icon(actor.and_then(Account::avatar).map(str::to_string))
        .with_title_link(link)
        .with_text(commit_lines(push))
        .with_timestamp(push.timestamp().and_then(parse_timestamp))
}

fn render_ref(event: &RefEvent) -> ChatAttachment {
    let (verb, color) = if event.is_created() {
        ("created", COLOR_GREEN)
    } else {
        ("deleted", COLOR_RED)
    };
    let (ref_kind, ref_name) = describe_ref(&event.git_ref);
    let ref_kind = if event.ref_type.is_empty() {
        ref_kind
    } else {
        event.ref_type.as_str()
    };

    let title = format!(
        "{}{ref_kind} {ref_name} {verb}",
        repo_prefix(event.repository.as_ref().and_then(Repository::label))
    );

    let actor = event.sender.as_ref();
    let author = actor.and_then(Account::display_name).unwrap_or_default();
    let fallback = if author.is_empty() {
        title.clone()
    } else {
        format!("{title} by {author}")
    };

    let mut attachment = ChatAttachment::new(title, color)
        .with_fallback(fallback)
        .with_author(author, actor.and_then(Account::link).map(str::to_string))
        .with_author_icon(actor.and_then(Account::avatar).map(str::to_string))
        .with_title_link(
            event
                .repository
                .as_ref()
                .and_then(Repository::link)
                .map(str::to_string),
        );

    if event.is_created() {
        if let Some(description) = event.description.as_deref().filter(|d| !d.is_empty()) {
            attachment = attachment.with_text(truncate(description, MAX_BODY_CHARS));
        }
    }

    attachment
}

fn commit_lines(push: &PushEvent) -> String {
    let mut lines: Vec<String> = push
        .commits
        .iter()
        .take(MAX_COMMIT_LINES)
        .map(|commit| {
            let mut line = String::new();
            if let Some(hash) = commit.hash() {
                let sha = short_hash(hash);
                match commit.link() {
                    Some(url) => line.push_str(&format!("<{url}|`{sha}`> ")),
                    None => line.push_str(&format!("`{sha}` ")),
                }
            }
            line.push_str(commit.summary());
            if let Some(author) = commit.author_name() {
                line.push_str(&format!(" - {author}"));
            }
            line
        })
        .collect();

    let remaining = push.commits.len().saturating_sub(MAX_COMMIT_LINES);
    if remaining > 0 {
        lines.push(format!("… and {remaining} more"));
    }

    lines.join("\n")
}

fn render_pull_request(event: &PullRequestEvent) -> ChatAttachment {
    let pr = &event.pull_request;
    let action = event.effective_action();
    let title = format!(
        "{}Pull request {}{action}: {}",
        repo_prefix(event.repository.as_ref().and_then(Repository::label)),
        number_label(event.number()),
        pr.title.as_deref().unwrap_or_default()
    );

    let color = match action {
        "opened" | "reopened" | "create" | "created" => COLOR_BLUE,
        "merged" | "merge" => COLOR_PURPLE,
        "closed" | "close" | "refuse" | "declined" => COLOR_RED,
        _ => COLOR_GREY,
    };

    let actor = event.actor();
    let mut attachment = ChatAttachment::new(title, color)
        .with_author(
            actor.and_then(Account::display_name).unwrap_or_default(),
            actor.and_then(Account::link).map(str::to_string),
        )
        .with_author_icon(actor.and_then(Account::avatar).map(str::to_string))
        .with_title_link(pr.link().map(str::to_string))
        .with_timestamp(pr.updated_at.as_deref().and_then(parse_timestamp));

    if matches!(action, "opened" | "create" | "created") {
        if let Some(body) = pr.body.as_deref().filter(|b| !b.trim().is_empty()) {
            attachment = attachment.with_text(truncate(body, MAX_BODY_CHARS));
        }
    }

    if let Some(source) = pr.source_branch() {
        attachment = attachment.with_field(AttachmentField::new("Source", source, true));
    }
    if let Some(target) = pr.target_branch() {
        attachment = attachment.with_field(AttachmentField::new("Target", target, true));
    }

    attachment
}

fn render_issue(event: &IssueEvent) -> ChatAttachment {
    let issue = &event.issue;
    let action = event.action.as_deref().unwrap_or("updated");
    let title = format!(
        "{}Issue {}{action}: {}",
        repo_prefix(event.repository.as_ref().and_then(Repository::label)),
        number_label(issue.number),
        issue.title.as_deref().unwrap_or_default()
    );

    let color = match action {
        "opened" | "reopened" => COLOR_BLUE,
        "closed" => COLOR_RED,
        _ => COLOR_GREY,
    };

    let actor = event.sender.as_ref().or(issue.user.as_ref());
    ChatAttachment::new(title, color)
        .with_author(
            actor.and_then(Account::display_name).unwrap_or_default(),
            actor.and_then(Account::link).map(str::to_string),
        )
        .with_title_link(issue.html_url.clone())
        .with_text(truncate(issue.body.as_deref().unwrap_or_default(), MAX_BODY_CHARS))
}

fn render_issue_comment(event: &IssueCommentEvent) -> ChatAttachment {
    let issue = &event.issue;
    let title = format!(
        "{}New comment on {}{}",
        repo_prefix(event.repository.as_ref().and_then(Repository::label)),
        number_label(issue.number),
        issue.title.as_deref().unwrap_or_default()
    );

    let actor = event
        .comment
        .user
        .as_ref()
        .or(event.sender.as_ref());

    ChatAttachment::new(title, COLOR_GREY)
        .with_author(
            actor.and_then(Account::display_name).unwrap_or_default(),
            actor.and_then(Account::link).map(str::to_string),
        )
        .with_author_icon(actor.and_then(Account::avatar).map(str::to_string))
        .with_title_link(
            event
                .comment
                .html_url
                .clone()
                .or_else(|| issue.html_url.clone()),
        )
        .with_text(truncate(
            event.comment.body.as_deref().unwrap_or_default(),
            MAX_BODY_CHARS,
        ))
        .with_timestamp(event.comment.created_at.as_deref().and_then(parse_timestamp))
}

/// Splits a git ref into its kind and short name.
fn describe_ref(git_ref: &str) -> (&'static str, &str) {
    if let Some(tag) = git_ref.strip_prefix("refs/tags/") {
        ("tag", tag)
    } else {
        ("branch", git_ref.strip_prefix("refs/heads/").unwrap_or(git_ref))
    }
}

fn repo_prefix(repo: Option<&str>) -> String {
    repo.map(|r| format!("[{r}] ")).unwrap_or_default()
}

fn number_label(number: Option<u64>) -> String {
    number.map(|n| format!("#{n} ")).unwrap_or_default()
}
