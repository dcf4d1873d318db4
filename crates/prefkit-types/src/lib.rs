//! Foundation types for prefkit.
//!
//! This crate provides the identifier and value types shared by every other
//! prefkit crate: the key that names a slot in a backing store, and the
//! conversion between the store's type-erased raw values and typed Rust
//! values.
//!
//! # Key Types
//!
//! - [`PreferenceKey`] — Path-like identifier for a stored entry
//! - [`RawValue`] — The type-erased value a backing store persists
//! - [`PreferenceValue`] — Conversion between [`RawValue`] and typed values

pub mod error;
pub mod key;
pub mod value;

pub use error::TypeError;
pub use key::{validate_key, PreferenceKey, MAX_KEY_LENGTH, NAMESPACE_SEPARATOR};
pub use value::{PreferenceValue, RawValue};
