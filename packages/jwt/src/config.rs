//! Middleware configuration.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

/// Default bound on a single JWK Set round-trip.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Everything the middleware needs to fetch JWKs and verify JWTs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Required `iss` claim value.
    pub issuer: String,
    /// Value that must appear in the `aud` claim.
    pub audience: String,
    /// JWK Set endpoint.
    pub jwk_set_url: String,
    /// Time between key set refreshes, in seconds.
    #[serde(with = "duration_secs")]
    pub jwk_set_update_interval: Duration,
    /// Timeout for each key set request, in seconds.
    #[serde(with = "duration_secs", default = "default_fetch_timeout")]
    pub jwk_set_fetch_timeout: Duration,
}

fn default_fetch_timeout() -> Duration {
    DEFAULT_FETCH_TIMEOUT
}

impl Config {
    /// Create a config with the default fetch timeout.
    pub fn new(
        issuer: impl Into<String>,
        audience: impl Into<String>,
        jwk_set_url: impl Into<String>,
        jwk_set_update_interval: Duration,
    ) -> Self {
        Self {
            issuer: issuer.into(),
            audience: audience.into(),
            jwk_set_url: jwk_set_url.into(),
            jwk_set_update_interval,
            jwk_set_fetch_timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }

    /// Set the per-request fetch timeout.
    #[must_use]
    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.jwk_set_fetch_timeout = timeout;
        self
    }

    /// Check the config and return the parsed endpoint URL.
    ///
    /// # Errors
    /// Returns [`ConfigError`] for empty identities, an unparseable or
    /// non-HTTP URL, or a zero duration.
    pub fn validate(&self) -> Result<Url, ConfigError> {
        if self.issuer.is_empty() {
            return Err(ConfigError::Empty("issuer"));
        }
        if self.audience.is_empty() {
            return Err(ConfigError::Empty("audience"));
        }
        if self.jwk_set_update_interval.is_zero() {
            return Err(ConfigError::ZeroDuration("jwk_set_update_interval"));
        }
        if self.jwk_set_fetch_timeout.is_zero() {
            return Err(ConfigError::ZeroDuration("jwk_set_fetch_timeout"));
        }

        let url = Url::parse(&self.jwk_set_url).map_err(|e| ConfigError::InvalidUrl {
            url: self.jwk_set_url.clone(),
            message: e.to_string(),
        })?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(ConfigError::UnsupportedScheme(other.to_string())),
        }
    }
}

/// Whole-second durations.
mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        u64::deserialize(deserializer).map(Duration::from_secs)
    }
}
