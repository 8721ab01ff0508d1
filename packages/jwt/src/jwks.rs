//! JWK Set retrieval and decoding.
//!
//! A fetch is all-or-nothing: one key that cannot be decoded fails the
//! whole set, so a half-understood key set is never installed.

use std::collections::HashMap;
use std::time::Duration;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rsa::{BigUint, RsaPublicKey};
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::error::{FetchError, FetchResult};
use crate::keystore::KeySet;

/// Largest RSA modulus accepted from a JWK Set.
pub const MAX_RSA_MODULUS_BITS: usize = 8192;

/// A JSON Web Key (RFC 7517).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Jwk {
    /// Key type (e.g., "RSA", "EC")
    pub kty: String,

    /// Key ID
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kid: Option<String>,

    /// Algorithm (e.g., "RS256")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alg: Option<String>,

    /// Public key use (e.g., "sig")
    #[serde(default, rename = "use", skip_serializing_if = "Option::is_none")]
    pub use_: Option<String>,

    /// RSA modulus (base64url)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub n: Option<String>,

    /// RSA public exponent (base64url)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub e: Option<String>,

    /// EC curve name (e.g., "P-256")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crv: Option<String>,

    /// EC x coordinate (base64url)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<String>,

    /// EC y coordinate (base64url)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<String>,
}

impl Jwk {
    /// Build an RSA JWK from its public components.
    pub fn rsa(kid: impl Into<String>, key: &RsaPublicKey) -> Self {
        use rsa::traits::PublicKeyParts;

        Self {
            kty: "RSA".to_string(),
            kid: Some(kid.into()),
            alg: Some("RS256".to_string()),
            use_: Some("sig".to_string()),
            n: Some(URL_SAFE_NO_PAD.encode(key.n().to_bytes_be())),
            e: Some(URL_SAFE_NO_PAD.encode(key.e().to_bytes_be())),
            ..Self::default()
        }
    }
}

/// JSON Web Key Set document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwkSet {
    /// Array of JSON Web Keys
    pub keys: Vec<Jwk>,
}

/// A decoded public key.
#[derive(Debug, Clone)]
pub enum VerificationKey {
    /// RSA public key
    Rsa(RsaPublicKey),
    /// NIST P-256 public key
    EcP256(p256::ecdsa::VerifyingKey),
    /// NIST P-384 public key
    EcP384(p384::ecdsa::VerifyingKey),
}

impl VerificationKey {
    /// JWK key type this key was decoded from.
    pub fn kty(&self) -> &'static str {
        match self {
            VerificationKey::Rsa(_) => "RSA",
            VerificationKey::EcP256(_) | VerificationKey::EcP384(_) => "EC",
        }
    }
}

/// Decode a single JWK into a public key.
///
/// # Errors
/// Returns [`FetchError::Key`] for unsupported key types or curves, missing
/// or badly encoded parameters, and parameters that do not form a valid key.
pub fn decode_jwk(jwk: &Jwk) -> FetchResult<VerificationKey> {
    let kid = jwk.kid.as_deref();
    match jwk.kty.as_str() {
        "RSA" => {
            let n = required_param(kid, "n", jwk.n.as_deref())?;
            let e = required_param(kid, "e", jwk.e.as_deref())?;
            let key = RsaPublicKey::new_with_max_size(
                BigUint::from_bytes_be(&n),
                BigUint::from_bytes_be(&e),
                MAX_RSA_MODULUS_BITS,
            )
            .map_err(|e| FetchError::key(kid, format!("invalid RSA key: {e}")))?;
            Ok(VerificationKey::Rsa(key))
        }
        "EC" => decode_ec(kid, jwk),
        other => Err(FetchError::key(kid, format!("unsupported key type: {other}"))),
    }
}

fn decode_ec(kid: Option<&str>, jwk: &Jwk) -> FetchResult<VerificationKey> {
    let crv = jwk.crv.as_deref().unwrap_or("<none>");
    let coordinate_len = match crv {
        "P-256" => 32,
        "P-384" => 48,
        other => return Err(FetchError::key(kid, format!("unsupported EC curve: {other}"))),
    };

    let x = required_param(kid, "x", jwk.x.as_deref())?;
    let y = required_param(kid, "y", jwk.y.as_deref())?;
    if x.len() != coordinate_len || y.len() != coordinate_len {
        return Err(FetchError::key(
            kid,
            format!("{crv} coordinates must be {coordinate_len} bytes"),
        ));
    }

    // Uncompressed SEC1 point: 0x04 || x || y
    let mut point = Vec::with_capacity(1 + 2 * coordinate_len);
    point.push(0x04);
    point.extend_from_slice(&x);
    point.extend_from_slice(&y);

    let key = if crv == "P-384" {
        p384::ecdsa::VerifyingKey::from_sec1_bytes(&point).map(VerificationKey::EcP384)
    } else {
        p256::ecdsa::VerifyingKey::from_sec1_bytes(&point).map(VerificationKey::EcP256)
    };
    key.map_err(|e| FetchError::key(kid, format!("invalid {crv} point: {e}")))
}

fn required_param(kid: Option<&str>, name: &str, value: Option<&str>) -> FetchResult<Vec<u8>> {
    let value = value.ok_or_else(|| FetchError::key(kid, format!("missing parameter {name}")))?;
    URL_SAFE_NO_PAD
        .decode(value)
        .map_err(|e| FetchError::key(kid, format!("invalid base64url in {name}: {e}")))
}

/// Decode every key of a set, failing on the first bad one.
///
/// Keys must carry a `kid`; a later key wins over an earlier one with the
/// same `kid`.
///
/// # Errors
/// Returns [`FetchError::Key`] if any key lacks a `kid` or fails to decode.
pub fn decode_jwk_set(set: &JwkSet) -> FetchResult<KeySet> {
    let mut keys = HashMap::with_capacity(set.keys.len());
    for jwk in &set.keys {
        let kid = jwk
            .kid
            .as_deref()
            .ok_or_else(|| FetchError::key(None, "missing kid"))?;
        keys.insert(kid.to_string(), decode_jwk(jwk)?);
    }
    Ok(KeySet::new(keys))
}

/// Fetches the JWK Set from the configured endpoint.
#[derive(Debug, Clone)]
pub struct KeyFetcher {
    client: reqwest::Client,
    url: Url,
}

impl KeyFetcher {
    /// Create a fetcher whose requests are bounded by `timeout`.
    ///
    /// # Errors
    /// Returns [`FetchError::Request`] if the HTTP client cannot be built.
    pub fn new(url: Url, timeout: Duration) -> FetchResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|source| FetchError::Request {
                url: url.to_string(),
                source,
            })?;

        Ok(Self { client, url })
    }

    /// Create a fetcher with a custom HTTP client.
    pub fn with_client(client: reqwest::Client, url: Url) -> Self {
        Self { client, url }
    }

    /// Endpoint this fetcher reads.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Perform one round-trip to the endpoint. No retries.
    ///
    /// # Errors
    /// Returns [`FetchError`] if the request fails, the status is not a
    /// success, the body is not a JWK Set, the set is empty, or any key
    /// fails to decode.
    pub async fn fetch(&self) -> FetchResult<KeySet> {
        debug!(jwk_set_url = %self.url, "performing fetch of JWKs");

        let response = self
            .client
            .get(self.url.clone())
            .send()
            .await
            .map_err(|source| FetchError::Request {
                url: self.url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: self.url.to_string(),
                status,
            });
        }

        let body = response.bytes().await.map_err(|source| FetchError::Request {
            url: self.url.to_string(),
            source,
        })?;
        let set: JwkSet = serde_json::from_slice(&body)?;
        if set.keys.is_empty() {
            return Err(FetchError::NoKeys {
                url: self.url.to_string(),
            });
        }

        let keys = decode_jwk_set(&set)?;
        debug!(
            jwk_set_url = %self.url,
            key_count = keys.len(),
            "successfully fetched JWK Set"
        );
        Ok(keys)
    }
}
