//! Conversion between raw stored values and typed values.
//!
//! Backing stores persist [`RawValue`]s and never interpret them. A typed
//! view over a raw value is the "identity cast": the raw value either has the
//! shape of the requested type or it does not, in which case the conversion
//! yields `None` instead of failing.

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::trace;

/// The type-erased value a backing store persists and returns.
pub type RawValue = serde_json::Value;

/// A value that can be read from and written to a backing store.
///
/// Blanket-implemented for every serde type that can cross threads.
pub trait PreferenceValue: Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Interpret a raw value as `Self`. Returns `None` when the shapes differ.
    fn from_raw(raw: &RawValue) -> Option<Self> {
        match serde_json::from_value(raw.clone()) {
            Ok(value) => Some(value),
            Err(e) => {
                trace!(target_type = std::any::type_name::<Self>(), error = %e, "raw value not convertible");
                None
            }
        }
    }

    /// Render `self` as a raw value. Returns `None` when serialization fails.
    fn to_raw(&self) -> Option<RawValue> {
        match serde_json::to_value(self) {
            Ok(raw) => Some(raw),
            Err(e) => {
                trace!(source_type = std::any::type_name::<Self>(), error = %e, "value not representable as raw");
                None
            }
        }
    }
}

impl<T> PreferenceValue for T where T: Serialize + DeserializeOwned + Send + Sync + 'static {}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde::Deserialize;
    use serde_json::json;
    use std::collections::HashMap;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Window {
        width: u32,
        height: u32,
    }

    #[test]
    fn matching_shape_converts() {
        assert_eq!(i64::from_raw(&json!(5)), Some(5));
        assert_eq!(String::from_raw(&json!("dark")), Some("dark".to_string()));
        assert_eq!(bool::from_raw(&json!(true)), Some(true));
    }

    #[test]
    fn mismatched_shape_is_none() {
        assert_eq!(i64::from_raw(&json!("five")), None);
        assert_eq!(String::from_raw(&json!(5)), None);
        assert_eq!(u8::from_raw(&json!(300)), None);
    }

    #[test]
    fn structs_convert_through_objects() {
        let raw = json!({ "width": 800, "height": 600 });
        let window = Window::from_raw(&raw).unwrap();
        assert_eq!(window, Window { width: 800, height: 600 });
        assert_eq!(window.to_raw(), Some(raw));
    }

    #[test]
    fn non_string_map_keys_are_not_representable() {
        let mut map = HashMap::new();
        map.insert(vec![1u8], 1u8);
        assert_eq!(map.to_raw(), None);
    }

    proptest! {
        #[test]
        fn integers_roundtrip(v in any::<i64>()) {
            prop_assert_eq!(i64::from_raw(&v.to_raw().unwrap()), Some(v));
        }

        #[test]
        fn strings_roundtrip(s in ".*") {
            prop_assert_eq!(String::from_raw(&s.to_raw().unwrap()), Some(s.clone()));
        }
    }
}
