//! Error types for the JWT announce gate.
//!
//! Errors are split by who can act on them. [`ConfigError`] and
//! [`FetchError`] belong to the operator, [`InvalidReason`] is kept for
//! diagnostics only, and [`HookError`] is the one type that crosses into
//! the tracker's request pipeline.

use thiserror::Error;

/// Result type for hook lifecycle and request handling.
pub type HookResult<T> = Result<T, HookError>;

/// Result type for key set retrieval.
pub type FetchResult<T> = Result<T, FetchError>;

/// Invalid configuration, reported at startup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// `jwk_set_url` could not be parsed.
    #[error("invalid jwk_set_url {url:?}: {message}")]
    InvalidUrl {
        /// The configured value
        url: String,
        /// Parser message
        message: String,
    },

    /// `jwk_set_url` uses a scheme other than http or https.
    #[error("unsupported jwk_set_url scheme: {0}")]
    UnsupportedScheme(String),

    /// A duration that must be positive was zero.
    #[error("{0} must be greater than zero")]
    ZeroDuration(&'static str),

    /// A required string value was empty.
    #[error("{0} must not be empty")]
    Empty(&'static str),
}

/// Failure to retrieve or decode the JWK Set.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The HTTP round-trip failed or timed out.
    #[error("failed to fetch JWK Set from {url}: {source}")]
    Request {
        /// Endpoint URL
        url: String,
        /// Transport error
        #[source]
        source: reqwest::Error,
    },

    /// The endpoint answered with a non-success status.
    #[error("JWK Set endpoint {url} returned HTTP {status}")]
    Status {
        /// Endpoint URL
        url: String,
        /// Response status
        status: reqwest::StatusCode,
    },

    /// The body was not a JWK Set document.
    #[error("failed to decode JWK JSON: {0}")]
    Decode(#[from] serde_json::Error),

    /// The document listed no keys.
    #[error("JWK Set from {url} contains no keys")]
    NoKeys {
        /// Endpoint URL
        url: String,
    },

    /// One key in the set could not be turned into a public key.
    #[error("failed to decode JWK {kid:?} into public key: {message}")]
    Key {
        /// Key identifier, when the key carried one
        kid: Option<String>,
        /// What was wrong with the key
        message: String,
    },
}

impl FetchError {
    /// Create a key decoding error
    pub fn key(kid: Option<&str>, message: impl Into<String>) -> Self {
        Self::Key {
            kid: kid.map(str::to_owned),
            message: message.into(),
        }
    }
}

/// Why a token was rejected.
///
/// Never shown to clients; every variant maps to
/// [`HookError::InvalidCredential`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum InvalidReason {
    /// The token is not a well-formed compact JWS.
    #[error("malformed token")]
    MalformedToken,
    /// Missing or unequal `iss` claim.
    #[error("unequal or missing issuer")]
    IssuerMismatch,
    /// Missing `aud` claim or configured audience not listed.
    #[error("unequal or missing audience")]
    AudienceMismatch,
    /// Missing `infohash` claim or bound to another swarm.
    #[error("unequal or missing infohash")]
    ResourceMismatch,
    /// No `kid` in the protected header.
    #[error("missing kid")]
    MissingKeyId,
    /// `kid` is not in the current key set.
    #[error("signed by unknown kid")]
    UnknownKey,
    /// Signature did not verify against the resolved key.
    #[error("invalid signature")]
    SignatureInvalid,
}

/// Errors surfaced by [`crate::JwtHook`].
#[derive(Debug, Error)]
pub enum HookError {
    /// Configuration rejected at startup.
    #[error("invalid JWT middleware config: {0}")]
    Config(#[from] ConfigError),

    /// The startup fetch failed, so the hook never became ready.
    #[error("failed to fetch initial JWK Set: {0}")]
    InitialFetch(#[source] FetchError),

    /// The announce carried no `jwt` parameter.
    #[error("unapproved request: missing jwt")]
    MissingCredential,

    /// The announce carried a `jwt` that failed validation.
    #[error("unapproved request: invalid jwt")]
    InvalidCredential,
}

impl HookError {
    /// Whether the error is attributable to the client and safe to return
    /// in a tracker failure response.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            HookError::MissingCredential | HookError::InvalidCredential
        )
    }
}

impl From<InvalidReason> for HookError {
    fn from(_: InvalidReason) -> Self {
        HookError::InvalidCredential
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_REASONS: [InvalidReason; 7] = [
        InvalidReason::MalformedToken,
        InvalidReason::IssuerMismatch,
        InvalidReason::AudienceMismatch,
        InvalidReason::ResourceMismatch,
        InvalidReason::MissingKeyId,
        InvalidReason::UnknownKey,
        InvalidReason::SignatureInvalid,
    ];

    #[test]
    fn test_every_reason_collapses_to_invalid_credential() {
        for reason in ALL_REASONS {
            let err = HookError::from(reason);
            assert!(matches!(err, HookError::InvalidCredential));
            assert_eq!(err.to_string(), "unapproved request: invalid jwt");
        }
    }

    #[test]
    fn test_client_error_classification() {
        assert!(HookError::MissingCredential.is_client_error());
        assert!(HookError::InvalidCredential.is_client_error());
        assert!(!HookError::Config(ConfigError::ZeroDuration("interval")).is_client_error());
        assert!(!HookError::InitialFetch(FetchError::key(None, "bad")).is_client_error());
    }

    #[test]
    fn test_fetch_key_error_names_kid() {
        let err = FetchError::key(Some("key1"), "RSA key missing modulus");
        assert!(err.to_string().contains("key1"));
        assert!(err.to_string().contains("missing modulus"));
    }
}
