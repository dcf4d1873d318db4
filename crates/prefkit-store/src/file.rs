//! JSON file-backed store.
//!
//! The whole store is one JSON object on disk, mapping key paths to raw
//! values:
//!
//! ```text
//! {
//!   "app/net/retries": 3,
//!   "app/ui/theme": "dark"
//! }
//! ```
//!
//! The document is loaded once on open and kept in memory. Every successful
//! write or delete rewrites the file through a temporary file in the same
//! directory followed by a rename, so readers never observe a torn file.

use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use prefkit_types::{PreferenceKey, RawValue};
use tracing::{debug, warn};

use crate::error::{StoreError, StoreResult};
use crate::traits::{MutableStore, RawStore};

type Entries = BTreeMap<PreferenceKey, RawValue>;

/// A [`MutableStore`] persisted as a single JSON document.
pub struct JsonFileStore {
    path: PathBuf,
    entries: RwLock<Entries>,
    read_only: bool,
}

impl JsonFileStore {
    /// Open or create a store at `path`.
    ///
    /// A missing file is an empty store; the file is created on first write.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        Self::open_with(path.as_ref(), false)
    }

    /// Open an existing store that rejects writes with [`StoreError::ReadOnly`].
    ///
    /// Fails with [`StoreError::Io`] of kind `NotFound` when `path` does not
    /// exist.
    pub fn open_read_only(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("read-only store file {} does not exist", path.display()),
            )
            .into());
        }
        Self::open_with(path, true)
    }

    fn open_with(path: &Path, read_only: bool) -> StoreResult<Self> {
        let entries = if path.exists() {
            load(path)?
        } else {
            Entries::new()
        };
        debug!(?path, read_only, entries = entries.len(), "opened json file store");

        Ok(Self {
            path: path.to_path_buf(),
            entries: RwLock::new(entries),
            read_only,
        })
    }

    /// The file this store persists to.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns `true` if the store rejects writes.
    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// Apply `change` under the write lock and persist. The in-memory state
    /// is rolled back when persisting fails.
    fn mutate<R>(&self, key: &PreferenceKey, change: impl FnOnce(&mut Entries) -> R) -> StoreResult<R> {
        if self.read_only {
            return Err(StoreError::ReadOnly);
        }

        let mut entries = self.entries.write().map_err(|_| StoreError::LockPoisoned)?;
        let previous = entries.get(key).cloned();
        let result = change(&mut *entries);

        if let Err(e) = persist(&self.path, &entries) {
            match previous {
                Some(raw) => entries.insert(key.clone(), raw),
                None => entries.remove(key),
            };
            return Err(e);
        }
        Ok(result)
    }
}

impl RawStore for JsonFileStore {
    fn raw_value(&self, key: &PreferenceKey) -> StoreResult<Option<RawValue>> {
        let entries = self.entries.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn exists(&self, key: &PreferenceKey) -> StoreResult<bool> {
        let entries = self.entries.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(entries.contains_key(key))
    }

    fn keys(&self, prefix: &str) -> StoreResult<Vec<PreferenceKey>> {
        let entries = self.entries.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(entries.keys().filter(|k| k.is_under(prefix)).cloned().collect())
    }
}

impl MutableStore for JsonFileStore {
    fn write(&self, key: &PreferenceKey, value: Option<RawValue>) -> StoreResult<()> {
        self.mutate(key, |entries| match value {
            Some(raw) => {
                entries.insert(key.clone(), raw);
            }
            None => {
                entries.remove(key);
            }
        })?;
        debug!(%key, path = ?self.path, "persisted write");
        Ok(())
    }

    fn delete(&self, key: &PreferenceKey) -> StoreResult<bool> {
        let existed = self.mutate(key, |entries| entries.remove(key).is_some())?;
        debug!(%key, existed, path = ?self.path, "persisted delete");
        Ok(existed)
    }

    fn flush(&self) -> StoreResult<()> {
        if self.read_only {
            return Ok(());
        }
        let entries = self.entries.read().map_err(|_| StoreError::LockPoisoned)?;
        persist(&self.path, &entries)
    }
}

impl std::fmt::Debug for JsonFileStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let count = self.entries.read().map(|e| e.len()).unwrap_or(0);
        f.debug_struct("JsonFileStore")
            .field("path", &self.path)
            .field("read_only", &self.read_only)
            .field("entry_count", &count)
            .finish()
    }
}

fn load(path: &Path) -> StoreResult<Entries> {
    let text = fs::read_to_string(path)?;
    if text.trim().is_empty() {
        return Ok(Entries::new());
    }

    let document: RawValue = serde_json::from_str(&text).map_err(|e| StoreError::Corrupt {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    let RawValue::Object(map) = document else {
        return Err(StoreError::Corrupt {
            path: path.to_path_buf(),
            reason: "top-level value is not an object".into(),
        });
    };

    let mut entries = Entries::new();
    for (name, raw) in map {
        match PreferenceKey::parse(&name) {
            Ok(key) => {
                entries.insert(key, raw);
            }
            Err(e) => warn!(?path, error = %e, "skipping entry with invalid key"),
        }
    }
    Ok(entries)
}

fn persist(path: &Path, entries: &Entries) -> StoreResult<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;

    let bytes = serde_json::to_vec_pretty(entries)?;
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(&bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| StoreError::Io(e.error))?;
    Ok(())
}
