//! Payload shapes of Bitbucket Server (Data Center) webhooks.
//!
//! Every Bitbucket Server payload carries an `eventKey` such as
//! `repo:refs_changed` or `pr:opened`; the remaining members depend on it.

use serde::Deserialize;

use super::generic::non_empty;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BitbucketUser {
    pub name: Option<String>,
    pub display_name: Option<String>,
    pub email_address: Option<String>,
    pub slug: Option<String>,
}

impl BitbucketUser {
    pub fn label(&self) -> Option<&str> {
        non_empty(&self.display_name).or_else(|| non_empty(&self.name))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BitbucketProject {
    pub key: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BitbucketRepository {
    pub slug: Option<String>,
    pub name: Option<String>,
    pub project: Option<BitbucketProject>,
}

impl BitbucketRepository {
    pub fn project_key(&self) -> Option<&str> {
        self.project.as_ref().and_then(|p| non_empty(&p.key))
    }

    pub fn slug(&self) -> Option<&str> {
        non_empty(&self.slug).or_else(|| non_empty(&self.name))
    }

    /// `KEY/slug`, or whichever half is known.
    pub fn label(&self) -> Option<String> {
        match (self.project_key(), self.slug()) {
            (Some(key), Some(slug)) => Some(format!("{key}/{slug}")),
            (Some(only), None) | (None, Some(only)) => Some(only.to_string()),
            (None, None) => None,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BitbucketRef {
    pub id: Option<String>,
    pub display_id: Option<String>,
    #[serde(rename = "type")]
    pub ref_type: Option<String>,
    pub latest_commit: Option<String>,
    pub repository: Option<BitbucketRepository>,
}

impl BitbucketRef {
    /// Short branch or tag name.
    pub fn name(&self) -> Option<&str> {
        non_empty(&self.display_id).or_else(|| {
            non_empty(&self.id).map(|id| {
                id.strip_prefix("refs/heads/")
                    .or_else(|| id.strip_prefix("refs/tags/"))
                    .unwrap_or(id)
            })
        })
    }

    pub fn is_tag(&self) -> bool {
        self.ref_type.as_deref() == Some("TAG")
    }
}

/// One entry of `changes` in a `repo:refs_changed` event.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RefChange {
    #[serde(rename = "ref")]
    pub target: Option<BitbucketRef>,
    pub ref_id: Option<String>,
    pub from_hash: Option<String>,
    pub to_hash: Option<String>,
    #[serde(rename = "type")]
    pub change_type: Option<String>,
}

impl RefChange {
    pub fn ref_name(&self) -> Option<&str> {
        self.target.as_ref().and_then(BitbucketRef::name).or_else(|| {
            non_empty(&self.ref_id).map(|id| id.strip_prefix("refs/heads/").unwrap_or(id))
        })
    }

    pub fn change_type(&self) -> &str {
        non_empty(&self.change_type).unwrap_or("UPDATE")
    }

    pub fn is_delete(&self) -> bool {
        self.change_type() == "DELETE"
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BitbucketHref {
    pub href: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BitbucketLinks {
    #[serde(rename = "self")]
    pub self_links: Vec<BitbucketHref>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BitbucketParticipant {
    pub user: Option<BitbucketUser>,
    pub role: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BitbucketPullRequest {
    pub id: Option<u64>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub state: Option<String>,
    pub author: Option<BitbucketParticipant>,
    pub from_ref: Option<BitbucketRef>,
    pub to_ref: Option<BitbucketRef>,
    pub links: Option<BitbucketLinks>,
}

impl BitbucketPullRequest {
    /// Link to the pull request when the payload carries one.
    pub fn self_link(&self) -> Option<&str> {
        self.links
            .as_ref()
            .and_then(|l| l.self_links.first())
            .and_then(|h| non_empty(&h.href))
    }

    /// Repository the pull request targets.
    pub fn target_repository(&self) -> Option<&BitbucketRepository> {
        self.to_ref.as_ref().and_then(|r| r.repository.as_ref())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BitbucketComment {
    pub id: Option<u64>,
    pub text: Option<String>,
    pub author: Option<BitbucketUser>,
}

/// A Bitbucket Server webhook payload.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BitbucketServerEvent {
    pub event_key: String,
    pub date: Option<String>,
    pub actor: Option<BitbucketUser>,
    pub repository: Option<BitbucketRepository>,
    pub changes: Vec<RefChange>,
    pub pull_request: Option<BitbucketPullRequest>,
    pub comment: Option<BitbucketComment>,
    /// Commit hash of `repo:comment:*` events.
    pub commit: Option<String>,
    /// Reviewer of `pr:reviewer:*` events.
    pub participant: Option<BitbucketParticipant>,
    pub previous_status: Option<String>,
    /// Repository after a `repo:modified` event.
    pub new: Option<BitbucketRepository>,
    /// Repository before a `repo:modified` event.
    pub old: Option<BitbucketRepository>,
}

impl BitbucketServerEvent {
    pub fn actor_name(&self) -> &str {
        self.actor
            .as_ref()
            .and_then(BitbucketUser::label)
            .unwrap_or("Someone")
    }

    /// The repository the event is about.
    pub fn repository(&self) -> Option<&BitbucketRepository> {
        self.repository
            .as_ref()
            .or(self.new.as_ref())
            .or_else(|| self.pull_request.as_ref().and_then(|pr| pr.target_repository()))
    }
}
