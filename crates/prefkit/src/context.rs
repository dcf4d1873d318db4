//! Process-wide store configuration.
//!
//! A host application opens one [`PreferenceContext`] at startup and builds
//! preferences from it instead of threading a store handle through every
//! constructor. The context is an ordinary value: there is no global lookup,
//! and [`PreferenceContext::close`] is the explicit teardown.

use std::sync::Arc;

use prefkit_store::{MutableStore, RawStore, StoreConfig, StoreResult};
use prefkit_types::{PreferenceKey, PreferenceValue};
use tracing::{debug, info};

use crate::mutable::MutablePreference;
use crate::preference::ReadOnlyPreference;
use crate::transformation::Transformation;

/// The default store and key namespace for a process.
#[derive(Clone)]
pub struct PreferenceContext {
    store: Arc<dyn MutableStore>,
    namespace: Option<String>,
}

impl PreferenceContext {
    /// Open the store described by `config`.
    pub fn open(config: &StoreConfig) -> StoreResult<Self> {
        let store = config.open()?;
        let namespace = config.namespace.clone().filter(|ns| !ns.is_empty());
        info!(namespace = ?namespace, "preference context opened");
        Ok(Self { store, namespace })
    }

    /// Use an existing store with no namespace.
    pub fn with_store(store: Arc<dyn MutableStore>) -> Self {
        Self {
            store,
            namespace: None,
        }
    }

    /// Put every key created through this context under `namespace`.
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into()).filter(|ns| !ns.is_empty());
        self
    }

    pub fn store(&self) -> &Arc<dyn MutableStore> {
        &self.store
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// The full key for `name` in this context's namespace.
    pub fn key(&self, name: &str) -> PreferenceKey {
        match &self.namespace {
            Some(ns) => PreferenceKey::namespaced(ns, name),
            None => PreferenceKey::new(name),
        }
    }

    /// A read/write preference for `name` through the identity transformation.
    pub fn preference<T: PreferenceValue>(&self, name: &str) -> MutablePreference<T> {
        MutablePreference::new(Arc::clone(&self.store), self.key(name))
    }

    /// A read/write preference for `name` through `transformation`.
    pub fn preference_with<T: PreferenceValue>(
        &self,
        name: &str,
        transformation: Transformation<T>,
    ) -> MutablePreference<T> {
        MutablePreference::with_transformation(Arc::clone(&self.store), self.key(name), transformation)
    }

    /// A read-only preference for `name` through the identity transformation.
    pub fn read_only<T: PreferenceValue>(&self, name: &str) -> ReadOnlyPreference<T> {
        let store: Arc<dyn RawStore> = Arc::new(Arc::clone(&self.store));
        ReadOnlyPreference::new(store, self.key(name))
    }

    /// Every key stored under this context's namespace.
    pub fn keys(&self) -> StoreResult<Vec<PreferenceKey>> {
        self.store.keys(self.namespace.as_deref().unwrap_or(""))
    }

    /// Flush the store and release this handle.
    ///
    /// Preferences built from the context keep their own store handles and
    /// stay usable; closing only guarantees buffered state has been written.
    pub fn close(self) -> StoreResult<()> {
        self.store.flush()?;
        debug!(namespace = ?self.namespace, "preference context closed");
        Ok(())
    }
}

impl std::fmt::Debug for PreferenceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreferenceContext")
            .field("namespace", &self.namespace)
            .finish_non_exhaustive()
    }
}
