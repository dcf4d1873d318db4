//! Typed read/write views and derivation operators.
//!
//! A [`MutablePreference`] is configuration only: a store handle, a key, a
//! transformation and an optional change callback. All state lives in the
//! store. Derivation operators ([`did_set`], [`ensure`], [`when_nil`],
//! [`transform`]) return new views and leave the receiver untouched.
//!
//! Read-modify-write sequences ([`apply`], [`transform`], and the extra reads
//! made to feed a change callback) are not atomic. A concurrent writer to the
//! same key wins or loses at the store level.
//!
//! [`did_set`]: MutablePreference::did_set
//! [`ensure`]: MutablePreference::ensure
//! [`when_nil`]: MutablePreference::when_nil
//! [`transform`]: MutablePreference::transform
//! [`apply`]: MutablePreference::apply

use std::fmt;
use std::sync::Arc;

use prefkit_store::{MutableStore, RawStore, StoreResult};
use prefkit_types::{PreferenceKey, PreferenceValue};
use tracing::debug;

use crate::preference::{ReadOnlyPreference, ReadPreference};
use crate::transformation::Transformation;

/// Callback invoked with `(new, old)` after a successful write or clear.
pub type ChangeCallback<T> = Arc<dyn Fn(Option<&T>, Option<&T>) + Send + Sync>;

/// A typed read/write view of one key in a [`MutableStore`].
pub struct MutablePreference<T> {
    store: Arc<dyn MutableStore>,
    key: PreferenceKey,
    transformation: Transformation<T>,
    on_change: Option<ChangeCallback<T>>,
}

impl<T> Clone for MutablePreference<T> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            key: self.key.clone(),
            transformation: self.transformation.clone(),
            on_change: self.on_change.clone(),
        }
    }
}

impl<T> fmt::Debug for MutablePreference<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MutablePreference")
            .field("key", &self.key)
            .field("transformation", &self.transformation)
            .field("observed", &self.on_change.is_some())
            .finish()
    }
}

impl<T: PreferenceValue> MutablePreference<T> {
    /// A view of `key` through the identity transformation.
    pub fn new(store: Arc<dyn MutableStore>, key: impl Into<PreferenceKey>) -> Self {
        Self::with_transformation(store, key, Transformation::identity())
    }

    /// A view of `key` through `transformation`.
    pub fn with_transformation(
        store: Arc<dyn MutableStore>,
        key: impl Into<PreferenceKey>,
        transformation: Transformation<T>,
    ) -> Self {
        Self {
            store,
            key: key.into(),
            transformation,
            on_change: None,
        }
    }

    pub fn transformation(&self) -> &Transformation<T> {
        &self.transformation
    }

    /// Replace the transformation. Requires exclusive access, so it cannot
    /// race a read through the same view.
    pub fn set_transformation(&mut self, transformation: Transformation<T>) {
        self.transformation = transformation;
    }

    /// Write `value`. Writing `None` deletes the key.
    ///
    /// When a callback is registered it receives `(new, old)`, both read
    /// back through the transformation, after the store accepted the write.
    pub fn set(&self, value: Option<T>) -> StoreResult<()> {
        self.notify_around(|| {
            self.transformation
                .set(&self.key, value.as_ref(), &*self.store)
        })
    }

    /// Delete the raw key.
    pub fn clear(&self) -> StoreResult<()> {
        self.notify_around(|| {
            let existed = self.store.delete(&self.key)?;
            debug!(key = %self.key, existed, "cleared preference");
            Ok(())
        })
    }

    /// Replace the value with `f(current)`.
    pub fn apply<F>(&self, f: F) -> StoreResult<()>
    where
        F: FnOnce(Option<T>) -> Option<T>,
    {
        let current = self.value()?;
        self.set(f(current))
    }

    /// A new view of the same binding that reports changes to `callback`.
    ///
    /// The receiver keeps its own callback (or lack of one).
    pub fn did_set<F>(&self, callback: F) -> Self
    where
        F: Fn(Option<&T>, Option<&T>) + Send + Sync + 'static,
    {
        Self {
            on_change: Some(Arc::new(callback)),
            ..self.clone()
        }
    }

    /// Migrate the stored value to a new type.
    ///
    /// Reads the current value once, maps it with `f`, and writes the result
    /// through a fresh identity transformation at the same key. This
    /// overwrites the slot the receiver reads from.
    pub fn transform<U, F>(&self, f: F) -> StoreResult<MutablePreference<U>>
    where
        U: PreferenceValue,
        F: FnOnce(Option<T>) -> Option<U>,
    {
        self.transform_with(Transformation::identity(), f)
    }

    /// Like [`MutablePreference::transform`] with an explicit transformation
    /// for the new type.
    pub fn transform_with<U, F>(
        &self,
        transformation: Transformation<U>,
        f: F,
    ) -> StoreResult<MutablePreference<U>>
    where
        U: PreferenceValue,
        F: FnOnce(Option<T>) -> Option<U>,
    {
        let current = self.value()?;
        let migrated = MutablePreference::with_transformation(
            Arc::clone(&self.store),
            self.key.clone(),
            transformation,
        );
        migrated.set(f(current))?;
        debug!(
            key = %self.key,
            from = std::any::type_name::<T>(),
            to = std::any::type_name::<U>(),
            "migrated preference"
        );
        Ok(migrated)
    }

    /// A new view whose reads yield `default` whenever `when` holds for the
    /// value read through this view's transformation.
    ///
    /// `when` receives `None` for absent or unconvertible values. Only reads
    /// are affected: the stored value is never rewritten.
    pub fn ensure<W>(&self, when: W, default: T) -> Self
    where
        T: Clone,
        W: Fn(Option<&T>) -> bool + Send + Sync + 'static,
    {
        let transformation = Transformation::adjusted(self.transformation.clone(), move |value| {
            if when(value.as_ref()) {
                Some(default.clone())
            } else {
                value
            }
        });
        debug!(key = %self.key, "derived defaulted preference");
        Self {
            transformation,
            ..self.clone()
        }
    }

    /// A new view that reads `default` when the value is absent.
    pub fn when_nil(&self, default: T) -> Self
    where
        T: Clone,
    {
        self.ensure(|value| value.is_none(), default)
    }

    /// A read-only view of the same key and transformation.
    pub fn read_only(&self) -> ReadOnlyPreference<T> {
        let store: Arc<dyn RawStore> = Arc::new(Arc::clone(&self.store));
        ReadOnlyPreference::with_transformation(store, self.key.clone(), self.transformation.clone())
    }

    fn notify_around<W>(&self, write: W) -> StoreResult<()>
    where
        W: FnOnce() -> StoreResult<()>,
    {
        let Some(callback) = &self.on_change else {
            return write();
        };
        let old = self.value()?;
        write()?;
        let new = self.value()?;
        callback(new.as_ref(), old.as_ref());
        Ok(())
    }
}

impl<T: PreferenceValue> ReadPreference for MutablePreference<T> {
    type Value = T;

    fn key(&self) -> &PreferenceKey {
        &self.key
    }

    fn value(&self) -> StoreResult<Option<T>> {
        self.transformation.get(&self.key, &*self.store)
    }

    fn has_value(&self) -> StoreResult<bool> {
        self.store.exists(&self.key)
    }
}
