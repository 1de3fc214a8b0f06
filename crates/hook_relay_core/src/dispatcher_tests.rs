use super::*;
use config_manager::HostConfig;
use serde_json::json;

const GITHUB_UA: &str = "GitHub-Hookshot/044aadd";
const BITBUCKET_SERVER_UA: &str =
    "Atlassian HttpClient 0.23.0 / Bitbucket-5.15.0 (5015000) / Default";

fn registry() -> HostRegistry {
    HostRegistry::new(vec![
        HostConfig::new("github", "topsecret").with_logo("https://example.com/github.png"),
        HostConfig::new("coding.net", "coding-secret"),
        HostConfig::new("bitbucket-cloud", "cloud-secret"),
        HostConfig::new("bitbucket-server", "s3cr3t")
            .with_bitbucket_url("https://bitbucket.example.com"),
    ])
    .unwrap()
}

fn dispatcher() -> Dispatcher {
    Dispatcher::new(registry(), SignatureSource::Canonical)
}

fn webhook<'a>(user_agent: &'a str, signature: Option<&'a str>, body: &'a [u8]) -> InboundWebhook<'a> {
    InboundWebhook {
        user_agent,
        signature: signature.map(str::as_bytes),
        body,
    }
}

#[test]
fn test_github_push_is_forwarded() {
    let body = json!({
        "ref": "refs/heads/main",
        "commits": [{ "message": "fix bug", "author": { "name": "alice" } }]
    })
    .to_string();

    let result = dispatcher()
        .dispatch(&webhook(GITHUB_UA, None, body.as_bytes()))
        .unwrap();

    match result {
        Dispatch::Forward { host, message } => {
            assert_eq!(host, "github");
            assert_eq!(message.attachments.len(), 1);
            let attachment = &message.attachments[0];
            assert!(attachment.title.contains("main"));
            assert_eq!(attachment.author_name.as_deref(), Some("alice"));
            assert!(attachment.text.contains("fix bug"));
            assert_eq!(attachment.footer.as_deref(), Some("github"));
        }
        other => panic!("Expected forward, got {other:?}"),
    }
}

#[test]
fn test_github_branch_deletion_is_not_reported_as_update() {
    let body = json!({
        "ref": "feature-x",
        "ref_type": "branch",
        "pusher_type": "user",
        "repository": { "full_name": "o/r" },
        "sender": { "login": "alice" }
    })
    .to_string();

    let result = dispatcher()
        .dispatch(&webhook("GitHub-Hookshot/abc", None, body.as_bytes()))
        .unwrap();

    match result {
        Dispatch::Forward { message, .. } => {
            assert_eq!(message.attachments[0].title, "[o/r] branch feature-x deleted");
        }
        other => panic!("Expected forward, got {other:?}"),
    }
}

#[test]
fn test_zen_ping_is_acknowledged() {
    let body = br#"{"zen":"Design for failure.","hook_id":1}"#;

    let result = dispatcher()
        .dispatch(&webhook(GITHUB_UA, None, body))
        .unwrap();

    assert_eq!(
        result,
        Dispatch::Ping {
            host: "github".to_string()
        }
    );
}

#[test]
fn test_bitbucket_server_signed_ping() {
    let body = br#"{"eventKey":"diagnostics:ping"}"#;
    let signature = "sha256=8df12f4e60b5925c4a4891c05ed3a3d6e8adc9a675ea8326a5dd2f9ef1343ae4";

    let result = dispatcher()
        .dispatch(&webhook(BITBUCKET_SERVER_UA, Some(signature), body))
        .unwrap();

    assert_eq!(
        result,
        Dispatch::Ping {
            host: "bitbucket-server".to_string()
        }
    );
}

#[test]
fn test_unrecognized_source_is_rejected() {
    let result = dispatcher().dispatch(&webhook("curl/8.0", None, b"{}"));

    assert_eq!(
        result,
        Err(DispatchError::UnrecognizedHost {
            name: "8.0".to_string()
        })
    );
}

#[test]
fn test_missing_user_agent_is_rejected() {
    let result = dispatcher().dispatch(&webhook("", None, b"{}"));

    assert!(matches!(result, Err(DispatchError::UnrecognizedHost { .. })));
}

/// The host check runs before the body is looked at.
#[test]
fn test_unrecognized_source_wins_over_malformed_body() {
    let result = dispatcher().dispatch(&webhook("Gogs", Some("sha1=00"), b"not json"));

    assert!(matches!(result, Err(DispatchError::UnrecognizedHost { .. })));
}

#[test]
fn test_wrong_signature_is_rejected() {
    let result = dispatcher().dispatch(&webhook(
        "Bitbucket-Server/7.0",
        Some("sha1=0000000000000000000000000000000000000000"),
        br#"{"a":1}"#,
    ));

    assert_eq!(result, Err(DispatchError::SignatureMismatch));
}

#[test]
fn test_non_utf8_signature_is_rejected() {
    let result = dispatcher().dispatch(&InboundWebhook {
        user_agent: GITHUB_UA,
        signature: Some(&b"sha1=\xff\xfe"[..]),
        body: br#"{"a":1}"#,
    });

    assert_eq!(result, Err(DispatchError::SignatureMismatch));
}

#[test]
fn test_valid_signature_is_accepted() {
    let result = dispatcher().dispatch(&webhook(
        GITHUB_UA,
        Some("sha1=c64d87a91faebeb6857cfd112ed67e2268ef084c"),
        br#"{"a":1}"#,
    ));

    assert!(matches!(result, Ok(Dispatch::Forward { .. })));
}

#[test]
fn test_canonical_signature_ignores_whitespace() {
    // Signature computed over the compact form {"a":1}
    let result = dispatcher().dispatch(&webhook(
        GITHUB_UA,
        Some("sha1=c64d87a91faebeb6857cfd112ed67e2268ef084c"),
        b"{\n  \"a\": 1\n}",
    ));

    assert!(result.is_ok());
}

#[test]
fn test_canonical_signature_preserves_key_order() {
    let result = dispatcher().dispatch(&webhook(
        GITHUB_UA,
        Some("sha1=bc08311e0ff485d8c2901aecdda569c420725116"),
        br#"{"b": 1, "a": 2}"#,
    ));

    assert!(result.is_ok());
}

#[test]
fn test_raw_signature_source_hashes_body_bytes() {
    let dispatcher = Dispatcher::new(registry(), SignatureSource::Raw);
    let body = br#"{"a": 1}"#;

    let raw = dispatcher.dispatch(&webhook(
        GITHUB_UA,
        Some("sha1=94fc1ca10dd36783b8f0bf776ebade45857b6811"),
        body,
    ));
    assert!(raw.is_ok());

    let canonical = dispatcher.dispatch(&webhook(
        GITHUB_UA,
        Some("sha1=c64d87a91faebeb6857cfd112ed67e2268ef084c"),
        body,
    ));
    assert_eq!(canonical, Err(DispatchError::SignatureMismatch));
}

#[test]
fn test_coding_signature_uses_host_secret() {
    // Signed with the GitHub secret, sent by Coding.net
    let result = dispatcher().dispatch(&webhook(
        "Coding.net Hook",
        Some("sha1=c64d87a91faebeb6857cfd112ed67e2268ef084c"),
        br#"{"a":1}"#,
    ));

    assert_eq!(result, Err(DispatchError::SignatureMismatch));
}

#[test]
fn test_malformed_body_is_rejected() {
    let result = dispatcher().dispatch(&webhook(GITHUB_UA, None, b"payload=%7B%7D"));

    assert!(matches!(result, Err(DispatchError::MalformedPayload { .. })));
}

#[test]
fn test_empty_body_is_empty_object() {
    let result = dispatcher()
        .dispatch(&webhook(
            GITHUB_UA,
            Some("sha1=9681efe39b62970e8cd3b4ffa4bd673fd830c3cc"),
            b"",
        ))
        .unwrap();

    match result {
        Dispatch::Forward { message, .. } => {
            assert_eq!(message.attachments[0].title, "Received an event from github");
        }
        other => panic!("Expected forward, got {other:?}"),
    }
}

#[test]
fn test_bitbucket_server_event_uses_bitbucket_adapter() {
    let body = json!({
        "eventKey": "pr:opened",
        "pullRequest": {
            "id": 1,
            "title": "Feature",
            "toRef": { "displayId": "master", "repository": { "slug": "repo", "project": { "key": "PRJ" } } }
        }
    })
    .to_string();

    let result = dispatcher()
        .dispatch(&webhook(BITBUCKET_SERVER_UA, None, body.as_bytes()))
        .unwrap();

    match result {
        Dispatch::Forward { host, message } => {
            assert_eq!(host, "bitbucket-server");
            assert_eq!(
                message.attachments[0].title_link.as_deref(),
                Some("https://bitbucket.example.com/projects/PRJ/repos/repo/pull-requests/1/overview")
            );
        }
        other => panic!("Expected forward, got {other:?}"),
    }
}

#[test]
fn test_dispatch_is_repeatable() {
    let body = json!({
        "action": "opened",
        "pull_request": { "number": 3, "title": "Docs", "head": { "ref": "docs" }, "base": { "ref": "main" } }
    })
    .to_string();
    let dispatcher = dispatcher();
    let inbound = webhook(GITHUB_UA, None, body.as_bytes());

    assert_eq!(
        dispatcher.dispatch(&inbound).unwrap(),
        dispatcher.dispatch(&inbound).unwrap()
    );
}
