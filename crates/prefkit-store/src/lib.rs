//! Backing store capabilities for prefkit.
//!
//! A backing store is an untyped, string-keyed key-value store. It never
//! interprets the values it holds; typed access lives in the `prefkit` crate.
//!
//! # Capabilities
//!
//! - [`RawStore`] — read a raw value by key, check existence, list keys
//! - [`MutableStore`] — additionally write and delete
//!
//! # Backends
//!
//! - [`InMemoryStore`] — `HashMap`-based store for tests and embedding
//! - [`JsonFileStore`] — single JSON document on disk, atomically rewritten
//! - [`ReadOnlyView`] — read-only projection of any store
//!
//! # Design Rules
//!
//! 1. Each call is individually thread-safe; sequences of calls are not atomic.
//! 2. Writing `None` is a delete.
//! 3. Backend failures are returned as [`StoreError`], never swallowed.

pub mod config;
pub mod error;
pub mod file;
pub mod memory;
pub mod traits;
pub mod view;

pub use config::{Backend, StoreConfig};
pub use error::{StoreError, StoreResult};
pub use file::JsonFileStore;
pub use memory::InMemoryStore;
pub use traits::{MutableStore, RawStore};
pub use view::ReadOnlyView;
