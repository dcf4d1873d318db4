//! Typed, composable preference accessors over untyped key-value stores.
//!
//! A preference is a view: a store handle, a [`PreferenceKey`], and a
//! [`Transformation`] converting between the store's raw values and a typed
//! value. Views hold no state of their own; every read goes to the store.
//!
//! # Key Types
//!
//! - [`Transformation`] — Bidirectional raw/typed converter, composable
//! - [`ReadOnlyPreference`] — Typed read view over a [`RawStore`]
//! - [`MutablePreference`] — Typed read/write view over a [`MutableStore`]
//!   with change callbacks and derivation operators
//! - [`PreferenceContext`] — Default store and namespace for a process
//!
//! # Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use prefkit::prelude::*;
//!
//! fn main() -> StoreResult<()> {
//!     let ctx = PreferenceContext::with_store(Arc::new(InMemoryStore::new()));
//!
//!     let retries = ctx.preference::<i64>("retries");
//!     let timeout = ctx.preference::<i64>("timeout").when_nil(30);
//!
//!     retries.set(Some(3))?;
//!     assert_eq!(timeout.value()?, Some(30));
//!     assert!(!timeout.has_value()?);
//!
//!     let total = operation(&retries, &timeout, |a, b| a + b)?;
//!     assert_eq!(total, Some(33));
//!
//!     ctx.close()
//! }
//! ```
//!
//! # Errors
//!
//! A raw value that does not convert reads as `None` while `has_value`
//! still reports `true`. Failures of the backing store are returned as
//! [`StoreError`] unchanged, and a failed write never fires a change
//! callback.

pub mod context;
pub mod mutable;
pub mod preference;
pub mod transformation;

pub use context::PreferenceContext;
pub use mutable::{ChangeCallback, MutablePreference};
pub use preference::{operation, ReadOnlyPreference, ReadPreference};
pub use transformation::{Adjust, Backward, Forward, Transformation};

pub use prefkit_store::{
    InMemoryStore, JsonFileStore, MutableStore, RawStore, ReadOnlyView, StoreConfig, StoreError,
    StoreResult,
};
pub use prefkit_types::{PreferenceKey, PreferenceValue, RawValue};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::context::PreferenceContext;
    pub use crate::mutable::MutablePreference;
    pub use crate::preference::{operation, ReadOnlyPreference, ReadPreference};
    pub use crate::transformation::Transformation;
    pub use prefkit_store::{InMemoryStore, MutableStore, RawStore, StoreError, StoreResult};
    pub use prefkit_types::{PreferenceKey, PreferenceValue};
}

#[cfg(test)]
mod tests {
    use super::prelude::*;
    use std::sync::Arc;

    #[test]
    fn preferences_are_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}

        assert_send_sync::<MutablePreference<String>>();
        assert_send_sync::<ReadOnlyPreference<u32>>();
        assert_send_sync::<Transformation<Vec<u8>>>();
        assert_send_sync::<PreferenceContext>();
    }

    #[test]
    fn views_work_across_threads() {
        let store = Arc::new(InMemoryStore::new());
        let counter = MutablePreference::<u64>::new(store, "counter");
        counter.set(Some(0)).unwrap();

        let handles: Vec<_> = (1..=4u64)
            .map(|i| {
                let pref = counter.clone();
                std::thread::spawn(move || pref.set(Some(i)).unwrap())
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        // last write wins; every candidate is a value some thread wrote
        let value = counter.value().unwrap().unwrap();
        assert!((1..=4).contains(&value));
    }
}
