//! Payload shapes of GitHub-style hosts.
//!
//! GitHub, Coding.net and Bitbucket Cloud use overlapping but not identical
//! field names. Every field is optional and alternative spellings are kept as
//! separate fields; the accessor methods pick whichever one the host sent.

use serde::Deserialize;

/// A user as sent in `sender`, `user`, `pull_request.user` and similar.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Account {
    pub login: Option<String>,
    pub name: Option<String>,
    pub global_key: Option<String>,
    pub avatar_url: Option<String>,
    pub avatar: Option<String>,
    pub html_url: Option<String>,
    pub web_url: Option<String>,
}

impl Account {
    pub fn display_name(&self) -> Option<&str> {
        non_empty(&self.login)
            .or_else(|| non_empty(&self.name))
            .or_else(|| non_empty(&self.global_key))
    }

    pub fn avatar(&self) -> Option<&str> {
        non_empty(&self.avatar_url).or_else(|| non_empty(&self.avatar))
    }

    pub fn link(&self) -> Option<&str> {
        non_empty(&self.html_url).or_else(|| non_empty(&self.web_url))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Repository {
    pub name: Option<String>,
    pub full_name: Option<String>,
    pub html_url: Option<String>,
    pub web_url: Option<String>,
}

impl Repository {
    /// `owner/name` when available, else the bare name.
    pub fn label(&self) -> Option<&str> {
        non_empty(&self.full_name).or_else(|| non_empty(&self.name))
    }

    pub fn link(&self) -> Option<&str> {
        non_empty(&self.html_url).or_else(|| non_empty(&self.web_url))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CommitAuthor {
    pub name: Option<String>,
    pub email: Option<String>,
    pub username: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Commit {
    pub id: Option<String>,
    pub sha: Option<String>,
    pub message: Option<String>,
    pub short_message: Option<String>,
    pub url: Option<String>,
    pub web_url: Option<String>,
    pub timestamp: Option<String>,
    pub author: Option<CommitAuthor>,
    pub committer: Option<CommitAuthor>,
}

impl Commit {
    pub fn hash(&self) -> Option<&str> {
        non_empty(&self.id).or_else(|| non_empty(&self.sha))
    }

    /// First line of the commit message.
    pub fn summary(&self) -> &str {
        non_empty(&self.message)
            .or_else(|| non_empty(&self.short_message))
            .and_then(|m| m.lines().next())
            .unwrap_or_default()
    }

    pub fn link(&self) -> Option<&str> {
        non_empty(&self.url).or_else(|| non_empty(&self.web_url))
    }

    pub fn author_name(&self) -> Option<&str> {
        let from: fn(&Option<CommitAuthor>) -> Option<&str> = |person| {
            person
                .as_ref()
                .and_then(|p| non_empty(&p.name).or_else(|| non_empty(&p.username)))
        };
        from(&self.author).or_else(|| from(&self.committer))
    }
}

/// Pusher as GitHub sends it (`{name, email}`).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Pusher {
    pub name: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PushEvent {
    #[serde(rename = "ref")]
    pub git_ref: String,
    pub before: Option<String>,
    pub after: Option<String>,
    pub compare: Option<String>,
    pub created: Option<bool>,
    pub deleted: Option<bool>,
    pub forced: Option<bool>,
    pub commits: Vec<Commit>,
    pub head_commit: Option<Commit>,
    pub repository: Option<Repository>,
    pub pusher: Option<Pusher>,
    pub sender: Option<Account>,
    /// Coding.net puts the pushing user here.
    pub user: Option<Account>,
}

impl PushEvent {
    /// Who pushed: pusher name, then sender, then the first commit author.
    pub fn author(&self) -> Option<&str> {
        self.pusher
            .as_ref()
            .and_then(|p| non_empty(&p.name))
            .or_else(|| self.actor().and_then(Account::display_name))
            .or_else(|| self.commits.first().and_then(Commit::author_name))
    }

    /// The account that triggered the push, when the host sends one.
    pub fn actor(&self) -> Option<&Account> {
        self.sender.as_ref().or(self.user.as_ref())
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted.unwrap_or(false) || self.after.as_deref().is_some_and(is_zero_hash)
    }

    pub fn is_created(&self) -> bool {
        self.created.unwrap_or(false) || self.before.as_deref().is_some_and(is_zero_hash)
    }

    /// Timestamp of the newest commit, as sent by the host.
    pub fn timestamp(&self) -> Option<&str> {
        self.head_commit
            .as_ref()
            .or(self.commits.last())
            .and_then(|c| non_empty(&c.timestamp))
    }
}

/// Branch or tag created or deleted outside a push (GitHub `create` and
/// `delete` events). These carry `ref_type` and no commit list.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RefEvent {
    /// Short ref name, without `refs/heads/` or `refs/tags/`.
    #[serde(rename = "ref")]
    pub git_ref: String,
    /// `branch` or `tag`
    pub ref_type: String,
    /// Only sent with `create`.
    pub master_branch: Option<String>,
    pub description: Option<String>,
    pub pusher_type: Option<String>,
    pub repository: Option<Repository>,
    pub sender: Option<Account>,
}

impl RefEvent {
    /// `create` events name the default branch, `delete` events do not.
    pub fn is_created(&self) -> bool {
        self.master_branch.is_some()
    }
}

/// `ref` of a pull request side (`head`/`base`).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BranchRef {
    #[serde(rename = "ref")]
    pub git_ref: Option<String>,
    pub label: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PullRequest {
    pub number: Option<u64>,
    pub iid: Option<u64>,
    pub title: Option<String>,
    pub body: Option<String>,
    pub html_url: Option<String>,
    pub web_url: Option<String>,
    pub state: Option<String>,
    pub merged: Option<bool>,
    pub user: Option<Account>,
    pub head: Option<BranchRef>,
    pub base: Option<BranchRef>,
    pub source_branch: Option<String>,
    pub target_branch: Option<String>,
    pub updated_at: Option<String>,
}

impl PullRequest {
    pub fn number(&self) -> Option<u64> {
        self.number.or(self.iid)
    }

    pub fn link(&self) -> Option<&str> {
        non_empty(&self.html_url).or_else(|| non_empty(&self.web_url))
    }

    pub fn source_branch(&self) -> Option<&str> {
        self.head
            .as_ref()
            .and_then(|h| non_empty(&h.git_ref))
            .or_else(|| non_empty(&self.source_branch))
    }

    pub fn target_branch(&self) -> Option<&str> {
        self.base
            .as_ref()
            .and_then(|b| non_empty(&b.git_ref))
            .or_else(|| non_empty(&self.target_branch))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PullRequestEvent {
    pub action: Option<String>,
    pub number: Option<u64>,
    #[serde(alias = "merge_request")]
    pub pull_request: PullRequest,
    pub repository: Option<Repository>,
    pub sender: Option<Account>,
    pub user: Option<Account>,
}

impl PullRequestEvent {
    pub fn number(&self) -> Option<u64> {
        self.pull_request.number().or(self.number)
    }

    /// The action, with a closed-and-merged pull request reported as `merged`.
    pub fn effective_action(&self) -> &str {
        let action = non_empty(&self.action)
            .or_else(|| non_empty(&self.pull_request.state))
            .unwrap_or("updated");

        if action == "closed" && self.pull_request.merged == Some(true) {
            "merged"
        } else {
            action
        }
    }

    pub fn actor(&self) -> Option<&Account> {
        self.sender
            .as_ref()
            .or(self.user.as_ref())
            .or(self.pull_request.user.as_ref())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Issue {
    pub number: Option<u64>,
    pub title: Option<String>,
    pub body: Option<String>,
    pub html_url: Option<String>,
    pub state: Option<String>,
    pub user: Option<Account>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct IssueEvent {
    pub action: Option<String>,
    pub issue: Issue,
    pub repository: Option<Repository>,
    pub sender: Option<Account>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Comment {
    pub body: Option<String>,
    pub html_url: Option<String>,
    pub user: Option<Account>,
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct IssueCommentEvent {
    pub action: Option<String>,
    pub issue: Issue,
    pub comment: Comment,
    pub repository: Option<Repository>,
    pub sender: Option<Account>,
}

pub(crate) fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

fn is_zero_hash(hash: &str) -> bool {
    !hash.is_empty() && hash.bytes().all(|b| b == b'0')
}
