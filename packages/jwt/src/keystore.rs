//! The current set of verification keys.
//!
//! Readers take a snapshot with a pointer load and never wait on the
//! writer; the writer installs a whole new set with a pointer swap.

use arc_swap::ArcSwap;
use std::collections::HashMap;
use std::sync::Arc;

use crate::jwks::VerificationKey;

/// Immutable `kid -> key` mapping.
#[derive(Debug, Clone, Default)]
pub struct KeySet {
    keys: HashMap<String, VerificationKey>,
}

impl KeySet {
    /// Wrap an already decoded mapping.
    pub fn new(keys: HashMap<String, VerificationKey>) -> Self {
        Self { keys }
    }

    /// Key for `kid`, if published.
    pub fn get(&self, kid: &str) -> Option<&VerificationKey> {
        self.keys.get(kid)
    }

    /// Whether `kid` is published.
    pub fn contains(&self, kid: &str) -> bool {
        self.keys.contains_key(kid)
    }

    /// Number of keys.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Whether the set holds no keys.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Published key identifiers, in no particular order.
    pub fn kids(&self) -> impl Iterator<Item = &str> {
        self.keys.keys().map(String::as_str)
    }
}

impl FromIterator<(String, VerificationKey)> for KeySet {
    fn from_iter<I: IntoIterator<Item = (String, VerificationKey)>>(iter: I) -> Self {
        Self {
            keys: iter.into_iter().collect(),
        }
    }
}

/// Holder of the current [`KeySet`].
#[derive(Debug)]
pub struct KeyStore {
    current: ArcSwap<KeySet>,
}

impl KeyStore {
    /// Create a store with `initial` as the current set.
    pub fn new(initial: KeySet) -> Self {
        Self {
            current: ArcSwap::from_pointee(initial),
        }
    }

    /// Snapshot of the current set.
    ///
    /// The snapshot stays valid and unchanged for as long as it is held,
    /// even across a concurrent [`KeyStore::replace`].
    pub fn read(&self) -> Arc<KeySet> {
        self.current.load_full()
    }

    /// Install `keys` as the current set.
    pub fn replace(&self, keys: KeySet) {
        self.current.store(Arc::new(keys));
    }
}
