//! Tests for fetching JWK Sets over HTTP.

mod common;

use std::time::Duration;

use common::*;
use serde_json::json;
use tracker_jwt::{FetchError, KeyFetcher};
use url::Url;
use wiremock::{MockServer, ResponseTemplate};

fn fetcher(server: &MockServer) -> KeyFetcher {
    let url = Url::parse(&format!("{}{JWKS_PATH}", server.uri())).unwrap();
    KeyFetcher::new(url, Duration::from_millis(500)).unwrap()
}

#[tokio::test]
async fn test_fetch_decodes_every_key() {
    let server = MockServer::start().await;
    serve_jwks(&server, jwks(&[("key1", &KEY_1), ("key2", &KEY_2)])).await;

    let keys = fetcher(&server).fetch().await.unwrap();
    assert_eq!(keys.len(), 2);
    assert!(keys.contains("key1"));
    assert!(keys.contains("key2"));
}

#[tokio::test]
async fn test_fetch_with_custom_client() {
    let server = MockServer::start().await;
    serve_jwks(&server, jwks(&[("key2", &KEY_2)])).await;

    let url = Url::parse(&format!("{}{JWKS_PATH}", server.uri())).unwrap();
    let client = reqwest::Client::builder()
        .user_agent("tracker-jwt-test")
        .build()
        .unwrap();
    let fetcher = KeyFetcher::with_client(client, url.clone());
    assert_eq!(fetcher.url(), &url);

    let keys = fetcher.fetch().await.unwrap();
    assert_eq!(keys.kids().count(), 1);
    assert!(keys.contains("key2"));

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests[0].headers["user-agent"], "tracker-jwt-test");
}

#[tokio::test]
async fn test_fetch_rejects_empty_set() {
    let server = MockServer::start().await;
    serve_jwks(&server, json!({"keys": []})).await;

    let err = fetcher(&server).fetch().await.unwrap_err();
    assert!(matches!(err, FetchError::NoKeys { .. }));
}

#[tokio::test]
async fn test_fetch_rejects_error_status() {
    let server = MockServer::start().await;
    serve(&server, ResponseTemplate::new(404)).await;

    match fetcher(&server).fetch().await.unwrap_err() {
        FetchError::Status { status, .. } => assert_eq!(status, 404),
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_fetch_times_out() {
    let server = MockServer::start().await;
    serve(
        &server,
        ResponseTemplate::new(200)
            .set_body_json(jwks(&[("key1", &KEY_1)]))
            .set_delay(Duration::from_secs(3)),
    )
    .await;

    let err = fetcher(&server).fetch().await.unwrap_err();
    assert!(matches!(err, FetchError::Request { .. }));
}
