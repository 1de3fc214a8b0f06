use super::*;
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> OAuthClient {
    let http = crate::build_http_client(Duration::from_secs(5)).unwrap();
    OAuthClient::new(
        http,
        &format!("{}/api/oauth.access", server.uri()),
        "1234.5678",
        SecretString::from("client-secret".to_string()),
    )
    .unwrap()
}

#[tokio::test]
async fn test_exchange_code_sends_credentials_and_relays_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/oauth.access"))
        .and(query_param("code", "abc"))
        .and(query_param("client_id", "1234.5678"))
        .and(query_param("client_secret", "client-secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ok": true,
            "access_token": "xoxp-token",
            "scope": "incoming-webhook"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let body = client_for(&mock_server).exchange_code("abc").await.unwrap();

    assert_eq!(body["ok"], true);
    assert_eq!(body["access_token"], "xoxp-token");
}

#[tokio::test]
async fn test_exchange_code_passes_through_logical_failure() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/oauth.access"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "ok": false, "error": "invalid_code" })),
        )
        .mount(&mock_server)
        .await;

    let body = client_for(&mock_server)
        .exchange_code("expired")
        .await
        .unwrap();

    assert_eq!(body, json!({ "ok": false, "error": "invalid_code" }));
}

#[tokio::test]
async fn test_exchange_code_maps_error_status() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/oauth.access"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&mock_server)
        .await;

    let result = client_for(&mock_server).exchange_code("abc").await;

    match result {
        Err(Error::UnexpectedStatus { status, body }) => {
            assert_eq!(status, 503);
            assert_eq!(body, "maintenance");
        }
        other => panic!("Expected UnexpectedStatus, got {other:?}"),
    }
}

#[tokio::test]
async fn test_exchange_code_rejects_non_json_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/oauth.access"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
        .mount(&mock_server)
        .await;

    let result = client_for(&mock_server).exchange_code("abc").await;

    assert!(matches!(result, Err(Error::Deserialization(_))));
}

#[test]
fn test_new_rejects_relative_url() {
    let http = crate::build_http_client(Duration::from_secs(5)).unwrap();
    let result = OAuthClient::new(
        http,
        "/api/oauth.access",
        "id",
        SecretString::from("secret".to_string()),
    );

    assert!(matches!(result, Err(Error::InvalidUrl { .. })));
}
