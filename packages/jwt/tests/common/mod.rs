//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::future::Future;
use std::time::Duration;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use once_cell::sync::Lazy;
use rsa::pkcs1v15::SigningKey;
use rsa::pkcs8::DecodePrivateKey;
use rsa::sha2::Sha256;
use rsa::signature::{SignatureEncoding, Signer};
use rsa::RsaPrivateKey;
use serde_json::{json, Value};
use tracker_jwt::jwks::{Jwk, JwkSet};
use tracker_jwt::{AnnounceRequest, Config, InfoHash, Params, JWT_PARAM};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const ISSUER: &str = "tracker.example";
pub const AUDIENCE: &str = "swarm-1";
pub const JWKS_PATH: &str = "/.well-known/jwks.json";

pub static KEY_1: Lazy<RsaPrivateKey> = Lazy::new(|| {
    RsaPrivateKey::from_pkcs8_pem(include_str!("../fixtures/issuer_key_1.pem")).unwrap()
});

pub static KEY_2: Lazy<RsaPrivateKey> = Lazy::new(|| {
    RsaPrivateKey::from_pkcs8_pem(include_str!("../fixtures/issuer_key_2.pem")).unwrap()
});

/// JWK Set document publishing the public halves of `keys`.
pub fn jwks(keys: &[(&str, &RsaPrivateKey)]) -> Value {
    let set = JwkSet {
        keys: keys
            .iter()
            .map(|(kid, key)| Jwk::rsa(*kid, &key.to_public_key()))
            .collect(),
    };
    serde_json::to_value(set).unwrap()
}

/// Claims valid for `info_hash` under the default config.
pub fn claims_for(info_hash: &InfoHash) -> Value {
    json!({
        "iss": ISSUER,
        "aud": [AUDIENCE],
        "infohash": info_hash.to_hex(),
    })
}

/// RS256-sign `claims` with `key`, putting `kid` in the header when given.
pub fn sign_token(kid: Option<&str>, claims: &Value, key: &RsaPrivateKey) -> String {
    let header = match kid {
        Some(kid) => json!({"alg": "RS256", "typ": "JWT", "kid": kid}),
        None => json!({"alg": "RS256", "typ": "JWT"}),
    };
    let input = format!(
        "{}.{}",
        URL_SAFE_NO_PAD.encode(serde_json::to_vec(&header).unwrap()),
        URL_SAFE_NO_PAD.encode(serde_json::to_vec(claims).unwrap()),
    );
    let signature = SigningKey::<Sha256>::new(key.clone()).sign(input.as_bytes());
    format!("{input}.{}", URL_SAFE_NO_PAD.encode(signature.to_vec()))
}

/// Announce for `info_hash`, with `jwt` set when `token` is given.
pub fn announce(info_hash: InfoHash, token: Option<&str>) -> AnnounceRequest {
    let mut params = Params::new();
    params.insert("port", "6881");
    if let Some(token) = token {
        params.insert(JWT_PARAM, token);
    }
    AnnounceRequest {
        info_hash,
        params: Some(params),
    }
}

pub fn config(server: &MockServer, interval: Duration) -> Config {
    Config::new(
        ISSUER,
        AUDIENCE,
        format!("{}{JWKS_PATH}", server.uri()),
        interval,
    )
    .with_fetch_timeout(Duration::from_secs(2))
}

/// Replace whatever the server returns for the JWKS path.
pub async fn serve(server: &MockServer, response: ResponseTemplate) {
    server.reset().await;
    Mock::given(method("GET"))
        .and(path(JWKS_PATH))
        .respond_with(response)
        .mount(server)
        .await;
}

pub async fn serve_jwks(server: &MockServer, body: Value) {
    serve(server, ResponseTemplate::new(200).set_body_json(body)).await;
}

pub async fn request_count(server: &MockServer) -> usize {
    server
        .received_requests()
        .await
        .map(|requests| requests.len())
        .unwrap_or_default()
}

/// Poll `condition` every 10ms until it holds, panicking after `timeout`.
pub async fn eventually<F, Fut>(timeout: Duration, mut condition: F)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    let deadline = tokio::time::Instant::now() + timeout;
    while !condition().await {
        assert!(
            tokio::time::Instant::now() < deadline,
            "condition not met within {timeout:?}"
        );
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}
