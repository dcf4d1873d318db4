//! Typed read views over a raw store.

use std::fmt;
use std::sync::Arc;

use prefkit_store::{RawStore, StoreResult};
use prefkit_types::{PreferenceKey, PreferenceValue};

use crate::transformation::Transformation;

/// Read access shared by every preference view.
///
/// Values are recomputed from the store on every call; nothing is cached.
pub trait ReadPreference {
    /// The typed value this preference yields.
    type Value: PreferenceValue;

    /// The key this preference reads.
    fn key(&self) -> &PreferenceKey;

    /// Read the current value through the transformation.
    ///
    /// `Ok(None)` means the key is absent or its raw value does not convert.
    fn value(&self) -> StoreResult<Option<Self::Value>>;

    /// Whether the store holds the raw key, regardless of whether the raw
    /// value converts.
    fn has_value(&self) -> StoreResult<bool>;

    /// `true` iff [`ReadPreference::value`] is `None`.
    fn is_empty(&self) -> StoreResult<bool> {
        Ok(self.value()?.is_none())
    }
}

/// A typed, read-only view of one key in a [`RawStore`].
///
/// Constructing a view never touches the store.
pub struct ReadOnlyPreference<T> {
    store: Arc<dyn RawStore>,
    key: PreferenceKey,
    transformation: Transformation<T>,
}

impl<T> Clone for ReadOnlyPreference<T> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            key: self.key.clone(),
            transformation: self.transformation.clone(),
        }
    }
}

impl<T> fmt::Debug for ReadOnlyPreference<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReadOnlyPreference")
            .field("key", &self.key)
            .field("transformation", &self.transformation)
            .finish()
    }
}

impl<T: PreferenceValue> ReadOnlyPreference<T> {
    /// A view of `key` read through the identity transformation.
    pub fn new(store: Arc<dyn RawStore>, key: impl Into<PreferenceKey>) -> Self {
        Self::with_transformation(store, key, Transformation::identity())
    }

    /// A view of `key` read through `transformation`.
    pub fn with_transformation(
        store: Arc<dyn RawStore>,
        key: impl Into<PreferenceKey>,
        transformation: Transformation<T>,
    ) -> Self {
        Self {
            store,
            key: key.into(),
            transformation,
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
}

impl<T: PreferenceValue> ReadPreference for ReadOnlyPreference<T> {
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

/// Combine the values of two preferences.
///
/// Returns `combine(a, b)` only when both preferences currently hold a
/// value; otherwise `None`. Store failures from either read propagate.
pub fn operation<A, B, F>(a: &A, b: &B, combine: F) -> StoreResult<Option<A::Value>>
where
    A: ReadPreference,
    B: ReadPreference<Value = A::Value>,
    F: FnOnce(A::Value, A::Value) -> A::Value,
{
    let (Some(lhs), Some(rhs)) = (a.value()?, b.value()?) else {
        return Ok(None);
    };
    Ok(Some(combine(lhs, rhs)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use prefkit_store::{InMemoryStore, MutableStore};
    use serde_json::json;

    fn store_with(entries: Vec<(&str, serde_json::Value)>) -> Arc<InMemoryStore> {
        Arc::new(InMemoryStore::with_entries(entries))
    }

    #[test]
    fn reads_typed_value() {
        let store = store_with(vec![("retries", json!(3))]);
        let pref = ReadOnlyPreference::<u32>::new(store, "retries");
        assert_eq!(pref.value().unwrap(), Some(3));
        assert!(pref.has_value().unwrap());
        assert!(!pref.is_empty().unwrap());
    }

    #[test]
    fn absent_key_is_empty() {
        let pref = ReadOnlyPreference::<u32>::new(store_with(vec![]), "retries");
        assert_eq!(pref.value().unwrap(), None);
        assert!(!pref.has_value().unwrap());
        assert!(pref.is_empty().unwrap());
    }

    #[test]
    fn unconvertible_value_is_present_but_empty() {
        let store = store_with(vec![("retries", json!("three"))]);
        let pref = ReadOnlyPreference::<u32>::new(store, "retries");
        assert!(pref.has_value().unwrap());
        assert_eq!(pref.value().unwrap(), None);
        assert!(pref.is_empty().unwrap());
    }

    #[test]
    fn reads_reflect_current_store_state() {
        let store = store_with(vec![]);
        let pref = ReadOnlyPreference::<String>::new(store.clone(), "theme");
        assert_eq!(pref.value().unwrap(), None);

        store
            .write(&PreferenceKey::from("theme"), Some(json!("dark")))
            .unwrap();
        assert_eq!(pref.value().unwrap(), Some("dark".to_string()));
    }

    #[test]
    fn custom_transformation_applies() {
        let store = store_with(vec![("port", json!("8080"))]);
        let pref = ReadOnlyPreference::with_transformation(
            store,
            "port",
            Transformation::<u16>::string_parsed(),
        );
        assert_eq!(pref.value().unwrap(), Some(8080));
    }

    #[test]
    fn transformation_can_be_swapped() {
        let store = store_with(vec![("port", json!("8080"))]);
        let mut pref = ReadOnlyPreference::<u16>::new(store, "port");
        assert_eq!(pref.value().unwrap(), None);

        pref.set_transformation(Transformation::string_parsed());
        assert_eq!(pref.value().unwrap(), Some(8080));
    }

    #[test]
    fn operation_requires_both_values() {
        let store = store_with(vec![("a", json!(2))]);
        let a = ReadOnlyPreference::<i64>::new(store.clone(), "a");
        let b = ReadOnlyPreference::<i64>::new(store.clone(), "b");

        assert_eq!(operation(&a, &b, |x, y| x * y).unwrap(), None);
        assert_eq!(operation(&b, &a, |x, y| x * y).unwrap(), None);

        store.write(&PreferenceKey::from("b"), Some(json!(5))).unwrap();
        assert_eq!(operation(&a, &b, |x, y| x * y).unwrap(), Some(10));
    }

    #[test]
    fn operation_combines_booleans() {
        let store = store_with(vec![("x", json!(true)), ("y", json!(false))]);
        let x = ReadOnlyPreference::<bool>::new(store.clone(), "x");
        let y = ReadOnlyPreference::<bool>::new(store, "y");
        assert_eq!(operation(&x, &y, |p, q| p && q).unwrap(), Some(false));
        assert_eq!(operation(&x, &y, |p, q| p || q).unwrap(), Some(true));
    }

    #[test]
    fn debug_omits_store() {
        let pref = ReadOnlyPreference::<u32>::new(store_with(vec![]), "retries");
        assert_eq!(
            format!("{pref:?}"),
            "ReadOnlyPreference { key: PreferenceKey(retries), transformation: Identity }"
        );
    }
}
