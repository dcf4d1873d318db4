//! In-memory store for testing and ephemeral use.
//!
//! [`InMemoryStore`] keeps all entries in a `HashMap` protected by a
//! `RwLock`. It implements both [`RawStore`] and [`MutableStore`] and is
//! suitable for unit tests, short-lived processes, and as a scratch layer.

use std::collections::HashMap;
use std::sync::RwLock;

use prefkit_types::{PreferenceKey, RawValue};
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::traits::{MutableStore, RawStore};

/// An in-memory implementation of [`MutableStore`].
///
/// Data is lost when the store is dropped.
pub struct InMemoryStore {
    entries: RwLock<HashMap<PreferenceKey, RawValue>>,
}

impl InMemoryStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Create a store seeded with `entries`.
    pub fn with_entries<K, I>(entries: I) -> Self
    where
        K: Into<PreferenceKey>,
        I: IntoIterator<Item = (K, RawValue)>,
    {
        let map = entries.into_iter().map(|(k, v)| (k.into(), v)).collect();
        Self {
            entries: RwLock::new(map),
        }
    }

    /// Number of entries currently stored.
    pub fn len(&self) -> usize {
        self.entries.read().map(|map| map.len()).unwrap_or(0)
    }

    /// Returns `true` if the store holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove every entry.
    pub fn clear(&self) -> StoreResult<()> {
        self.entries
            .write()
            .map_err(|_| StoreError::LockPoisoned)?
            .clear();
        Ok(())
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RawStore for InMemoryStore {
    fn raw_value(&self, key: &PreferenceKey) -> StoreResult<Option<RawValue>> {
        let map = self.entries.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(map.get(key).cloned())
    }

    fn exists(&self, key: &PreferenceKey) -> StoreResult<bool> {
        let map = self.entries.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(map.contains_key(key))
    }

    fn keys(&self, prefix: &str) -> StoreResult<Vec<PreferenceKey>> {
        let map = self.entries.read().map_err(|_| StoreError::LockPoisoned)?;
        let mut keys: Vec<PreferenceKey> =
            map.keys().filter(|k| k.is_under(prefix)).cloned().collect();
        keys.sort();
        Ok(keys)
    }
}

impl MutableStore for InMemoryStore {
    fn write(&self, key: &PreferenceKey, value: Option<RawValue>) -> StoreResult<()> {
        let mut map = self.entries.write().map_err(|_| StoreError::LockPoisoned)?;
        match value {
            Some(raw) => {
                debug!(%key, "write");
                map.insert(key.clone(), raw);
            }
            None => {
                debug!(%key, "write of nothing removes key");
                map.remove(key);
            }
        }
        Ok(())
    }

    fn delete(&self, key: &PreferenceKey) -> StoreResult<bool> {
        let mut map = self.entries.write().map_err(|_| StoreError::LockPoisoned)?;
        let existed = map.remove(key).is_some();
        debug!(%key, existed, "delete");
        Ok(existed)
    }
}

impl std::fmt::Debug for InMemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryStore")
            .field("entry_count", &self.len())
            .finish()
    }
}
