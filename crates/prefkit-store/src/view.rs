//! Read-only projection of a store.

use prefkit_types::{PreferenceKey, RawValue};

use crate::error::StoreResult;
use crate::traits::RawStore;

/// Wraps any store and exposes only its [`RawStore`] capability.
///
/// Handing out a `ReadOnlyView` lets a component read shared preferences
/// without the type system allowing it to write them.
#[derive(Debug, Clone)]
pub struct ReadOnlyView<S> {
    inner: S,
}

impl<S: RawStore> ReadOnlyView<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: RawStore> RawStore for ReadOnlyView<S> {
    fn raw_value(&self, key: &PreferenceKey) -> StoreResult<Option<RawValue>> {
        self.inner.raw_value(key)
    }

    fn exists(&self, key: &PreferenceKey) -> StoreResult<bool> {
        self.inner.exists(key)
    }

    fn keys(&self, prefix: &str) -> StoreResult<Vec<PreferenceKey>> {
        self.inner.keys(prefix)
    }
}
