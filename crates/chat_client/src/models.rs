//! # Models
//!
//! Message structures understood by Slack-compatible incoming webhooks.
//!
//! A [`ChatMessage`] is a list of [`ChatAttachment`]s. Attachments use the
//! legacy "secondary attachment" layout: a colored bar, an author line, a
//! linked title, free text, short key/value fields and a footer.

use serde::{Deserialize, Serialize};

#[cfg(test)]
#[path = "models_tests.rs"]
mod tests;

/// A message posted to the chat channel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub attachments: Vec<ChatAttachment>,
}

impl ChatMessage {
    pub fn new(attachments: Vec<ChatAttachment>) -> Self {
        Self { attachments }
    }

    pub fn is_empty(&self) -> bool {
        self.attachments.is_empty()
    }
}

/// A short key/value pair displayed in a table inside an attachment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentField {
    pub title: String,
    pub value: String,

    /// Whether the field is narrow enough to sit next to another one
    #[serde(default)]
    pub short: bool,
}

impl AttachmentField {
    pub fn new(title: impl Into<String>, value: impl Into<String>, short: bool) -> Self {
        Self {
            title: title.into(),
            value: value.into(),
            short,
        }
    }
}

/// One rendered notification.
///
/// Optional members are omitted from the JSON when unset so the chat
/// platform applies its own defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatAttachment {
    /// Plain-text summary for clients that cannot render attachments
    pub fallback: String,

    /// Hex color of the side bar, e.g. `#36a64f`
    pub color: String,

    /// Line above the attachment; never set by the relay but accepted on input
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pretext: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_link: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_icon: Option<String>,

    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title_link: Option<String>,

    #[serde(default)]
    pub text: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<AttachmentField>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub footer: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub footer_icon: Option<String>,

    /// Unix timestamp shown next to the footer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ts: Option<i64>,

    /// Members whose content is formatted as markdown
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub mrkdwn_in: Vec<String>,
}

impl ChatAttachment {
    /// Creates an attachment with a title and a bar color.
    ///
    /// The fallback text defaults to the title.
    pub fn new(title: impl Into<String>, color: impl Into<String>) -> Self {
        let title = title.into();
        Self {
            fallback: title.clone(),
            color: color.into(),
            title,
            mrkdwn_in: vec!["text".to_string()],
            ..Default::default()
        }
    }

    pub fn with_fallback(mut self, fallback: impl Into<String>) -> Self {
        self.fallback = fallback.into();
        self
    }

    /// Sets the author line. Empty names are ignored.
    pub fn with_author(mut self, name: impl Into<String>, link: Option<String>) -> Self {
        let name = name.into();
        if !name.is_empty() {
            self.author_name = Some(name);
            self.author_link = link.filter(|l| !l.is_empty());
        }
        self
    }

    pub fn with_author_icon(mut self, icon: Option<String>) -> Self {
        self.author_icon = icon.filter(|i| !i.is_empty());
        self
    }

    pub fn with_title_link(mut self, link: Option<String>) -> Self {
        self.title_link = link.filter(|l| !l.is_empty());
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn with_field(mut self, field: AttachmentField) -> Self {
        self.fields.push(field);
        self
    }

    /// Sets the footer text and icon. An empty icon is omitted.
    pub fn with_footer(mut self, footer: impl Into<String>, icon: impl Into<String>) -> Self {
        let icon = icon.into();
        self.footer = Some(footer.into());
        self.footer_icon = (!icon.is_empty()).then_some(icon);
        self
    }

    pub fn with_timestamp(mut self, ts: Option<i64>) -> Self {
        self.ts = ts;
        self
    }
}
