use super::*;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn sample_message() -> ChatMessage {
    ChatMessage::new(vec![ChatAttachment::new("[repo:main] 1 new commit", "#36a64f")
        .with_text("fix bug - alice")])
}

#[tokio::test]
async fn test_post_message_sends_attachments_as_json() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/services/T000/B000/XXXX"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({
            "attachments": [{
                "fallback": "[repo:main] 1 new commit",
                "color": "#36a64f",
                "title": "[repo:main] 1 new commit",
                "text": "fix bug - alice",
                "mrkdwn_in": ["text"]
            }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = ChatClient::new(
        &format!("{}/services/T000/B000/XXXX", mock_server.uri()),
        Duration::from_secs(5),
    )
    .unwrap();

    client
        .post_message(&sample_message())
        .await
        .expect("message should be delivered");
}

#[tokio::test]
async fn test_post_message_reports_rejection() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(404).set_body_string("no_service"))
        .mount(&mock_server)
        .await;

    let client = ChatClient::new(&mock_server.uri(), Duration::from_secs(5)).unwrap();

    let result = client.post_message(&sample_message()).await;

    match result {
        Err(Error::UnexpectedStatus { status, body }) => {
            assert_eq!(status, 404);
            assert_eq!(body, "no_service");
        }
        other => panic!("Expected UnexpectedStatus, got {other:?}"),
    }
}

#[tokio::test]
async fn test_post_message_reports_transport_failure() {
    // Nothing listens on port 9 of localhost
    let client = ChatClient::new("http://127.0.0.1:9/hook", Duration::from_secs(2)).unwrap();

    let result = client.post_message(&sample_message()).await;

    assert!(matches!(result, Err(Error::Transport(_))));
}

#[test]
fn test_new_rejects_invalid_url() {
    let result = ChatClient::new("hooks.slack.com/services", Duration::from_secs(5));

    assert!(matches!(result, Err(Error::InvalidUrl { .. })));
}

#[test]
fn test_channel_url_is_kept() {
    let client = ChatClient::new(
        "https://hooks.slack.com/services/T000/B000/XXXX",
        Duration::from_secs(5),
    )
    .unwrap();

    assert_eq!(
        client.channel_url().as_str(),
        "https://hooks.slack.com/services/T000/B000/XXXX"
    );
}
