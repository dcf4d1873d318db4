//! Capability contracts every backing store implements.
//!
//! Reading and writing are separate traits so that mutability is decided by
//! the type a caller holds: code that only needs to read asks for a
//! [`RawStore`], code that writes asks for a [`MutableStore`].

use std::sync::Arc;

use prefkit_types::{PreferenceKey, RawValue};

use crate::error::StoreResult;

/// Read-only key-value lookup.
///
/// Implementations must be thread-safe (`Send + Sync`); each individual call
/// is expected to be safe under concurrent use. Sequences of calls are not
/// atomic.
pub trait RawStore: Send + Sync {
    /// Read the raw value stored at `key`.
    ///
    /// Returns `Ok(None)` if the key does not exist.
    /// Returns `Err` when the backend cannot perform the read.
    fn raw_value(&self, key: &PreferenceKey) -> StoreResult<Option<RawValue>>;

    /// Check whether `key` exists in the store.
    fn exists(&self, key: &PreferenceKey) -> StoreResult<bool> {
        Ok(self.raw_value(key)?.is_some())
    }

    /// List every key at or under `prefix`, sorted.
    ///
    /// Pass `""` to list all keys.
    fn keys(&self, prefix: &str) -> StoreResult<Vec<PreferenceKey>>;
}

/// Key-value store that also accepts writes and deletes.
pub trait MutableStore: RawStore {
    /// Write `value` at `key`. Writing `None` removes the key.
    fn write(&self, key: &PreferenceKey, value: Option<RawValue>) -> StoreResult<()>;

    /// Delete `key`. Returns `true` if the key existed.
    fn delete(&self, key: &PreferenceKey) -> StoreResult<bool>;

    /// Persist any buffered state. The default does nothing.
    fn flush(&self) -> StoreResult<()> {
        Ok(())
    }
}

impl<S: RawStore + ?Sized> RawStore for Arc<S> {
    fn raw_value(&self, key: &PreferenceKey) -> StoreResult<Option<RawValue>> {
        (**self).raw_value(key)
    }

    fn exists(&self, key: &PreferenceKey) -> StoreResult<bool> {
        (**self).exists(key)
    }

    fn keys(&self, prefix: &str) -> StoreResult<Vec<PreferenceKey>> {
        (**self).keys(prefix)
    }
}

impl<S: MutableStore + ?Sized> MutableStore for Arc<S> {
    fn write(&self, key: &PreferenceKey, value: Option<RawValue>) -> StoreResult<()> {
        (**self).write(key, value)
    }

    fn delete(&self, key: &PreferenceKey) -> StoreResult<bool> {
        (**self).delete(key)
    }

    fn flush(&self) -> StoreResult<()> {
        (**self).flush()
    }
}
