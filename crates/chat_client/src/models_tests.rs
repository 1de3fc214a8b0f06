//! Tests for chat message models.

use super::*;
use serde_json::json;

#[test]
fn test_minimal_attachment_omits_optional_members() {
    let attachment = ChatAttachment::new("Build finished", "#36a64f");

    let value = serde_json::to_value(&attachment).unwrap();

    assert_eq!(
        value,
        json!({
            "fallback": "Build finished",
            "color": "#36a64f",
            "title": "Build finished",
            "text": "",
            "mrkdwn_in": ["text"]
        })
    );
}

#[test]
fn test_builder_sets_all_members() {
    let attachment = ChatAttachment::new("[repo:main] 1 new commit", "#36a64f")
        .with_fallback("1 new commit")
        .with_author("alice", Some("https://github.com/alice".to_string()))
        .with_author_icon(Some("https://avatars.example.com/alice".to_string()))
        .with_title_link(Some("https://github.com/org/repo".to_string()))
        .with_text("`abc1234` fix bug - alice")
        .with_field(AttachmentField::new("Branch", "main", true))
        .with_footer("github", "https://example.com/github.png")
        .with_timestamp(Some(1_700_000_000));

    let value = serde_json::to_value(&attachment).unwrap();

    assert_eq!(value["fallback"], "1 new commit");
    assert!(value.get("pretext").is_none());
    assert_eq!(value["author_name"], "alice");
    assert_eq!(value["author_link"], "https://github.com/alice");
    assert_eq!(value["author_icon"], "https://avatars.example.com/alice");
    assert_eq!(value["title_link"], "https://github.com/org/repo");
    assert_eq!(value["text"], "`abc1234` fix bug - alice");
    assert_eq!(
        value["fields"],
        json!([{ "title": "Branch", "value": "main", "short": true }])
    );
    assert_eq!(value["footer"], "github");
    assert_eq!(value["footer_icon"], "https://example.com/github.png");
    assert_eq!(value["ts"], 1_700_000_000);
}

#[test]
fn test_empty_author_is_ignored() {
    let attachment =
        ChatAttachment::new("t", "#000000").with_author("", Some("https://x".to_string()));

    assert!(attachment.author_name.is_none());
    assert!(attachment.author_link.is_none());
}

#[test]
fn test_empty_links_are_ignored() {
    let attachment = ChatAttachment::new("t", "#000000")
        .with_title_link(Some(String::new()))
        .with_author_icon(Some(String::new()))
        .with_footer("github", "");

    assert!(attachment.title_link.is_none());
    assert!(attachment.author_icon.is_none());
    assert_eq!(attachment.footer.as_deref(), Some("github"));
    assert!(attachment.footer_icon.is_none());
}

#[test]
fn test_message_serializes_attachments_array() {
    let message = ChatMessage::new(vec![ChatAttachment::new("one", "#111111")]);

    let value = serde_json::to_value(&message).unwrap();

    assert!(value["attachments"].is_array());
    assert_eq!(value["attachments"][0]["title"], "one");
    assert!(!message.is_empty());
    assert!(ChatMessage::default().is_empty());
}
