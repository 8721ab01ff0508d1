//! The slice of tracker requests the middleware looks at.

use std::collections::HashMap;
use std::fmt;

/// Length of a BitTorrent v1 infohash.
pub const INFO_HASH_LEN: usize = 20;

/// Identifier of a swarm.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct InfoHash([u8; INFO_HASH_LEN]);

impl InfoHash {
    /// Wrap raw infohash bytes.
    pub const fn new(bytes: [u8; INFO_HASH_LEN]) -> Self {
        Self(bytes)
    }

    /// Raw bytes.
    pub fn as_bytes(&self) -> &[u8; INFO_HASH_LEN] {
        &self.0
    }

    /// Lower-case hexadecimal form, as carried in the `infohash` claim.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl From<[u8; INFO_HASH_LEN]> for InfoHash {
    fn from(bytes: [u8; INFO_HASH_LEN]) -> Self {
        Self(bytes)
    }
}

impl TryFrom<&[u8]> for InfoHash {
    type Error = std::array::TryFromSliceError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        <[u8; INFO_HASH_LEN]>::try_from(bytes).map(Self)
    }
}

impl fmt::Debug for InfoHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "InfoHash({})", self.to_hex())
    }
}

impl fmt::Display for InfoHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Named query parameters of a request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params(HashMap<String, String>);

impl Params {
    /// Empty parameter map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a string parameter.
    pub fn string(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Set a parameter, replacing any previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }
}

impl<K, V> FromIterator<(K, V)> for Params
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// An announce: resource-scoped, needs a credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnounceRequest {
    /// Swarm being announced to
    pub info_hash: InfoHash,
    /// Query parameters, absent when the transport supplied none
    pub params: Option<Params>,
}

/// A scrape: passes through without a credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrapeRequest {
    /// Swarms being scraped
    pub info_hashes: Vec<InfoHash>,
    /// Query parameters, absent when the transport supplied none
    pub params: Option<Params>,
}
