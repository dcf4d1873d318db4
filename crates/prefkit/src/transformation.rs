//! Bidirectional conversion between raw stored values and typed values.
//!
//! A [`Transformation`] is a pair of pure functions:
//!
//! ```text
//! forward:  Option<&RawValue> -> Option<T>     (read path)
//! backward: Option<&T>        -> Option<RawValue>  (write path)
//! ```
//!
//! Conversion failure is `None`, never an error. Transformations compose:
//! `compose(left, right)` reads through `right` first, then hands the typed
//! value to `left`; writes run in the opposite order. Only a keyed layer
//! sitting on the left sees the intermediate value as raw (its identity
//! rendering). Identity and adjustment layers pass it along untouched, so a
//! value with no raw form (an infinite `f64`, say) survives them.
//! Composition with [`Transformation::Identity`] on either side collapses
//! to the other operand.

use std::fmt;
use std::fmt::Display;
use std::str::FromStr;
use std::sync::Arc;

use prefkit_store::{MutableStore, RawStore, StoreResult};
use prefkit_types::{PreferenceKey, PreferenceValue, RawValue};
use tracing::debug;

/// Read half of a keyed transformation.
pub type Forward<T> = Arc<dyn Fn(Option<&RawValue>) -> Option<T> + Send + Sync>;

/// Write half of a keyed transformation.
pub type Backward<T> = Arc<dyn Fn(Option<&T>) -> Option<RawValue> + Send + Sync>;

/// Typed read adjustment of an adjusted transformation.
pub type Adjust<T> = Arc<dyn Fn(Option<T>) -> Option<T> + Send + Sync>;

/// Converter between a store's raw values and `T`.
pub enum Transformation<T> {
    /// The identity cast: the raw value is read as `T` when its shape
    /// matches, and `T` is written as its raw rendering.
    Identity,
    /// Custom forward/backward functions.
    Keyed {
        forward: Forward<T>,
        backward: Backward<T>,
    },
    /// `inner` with `adjust` applied to every typed read. Writes go
    /// through `inner` unchanged.
    Adjusted {
        inner: Box<Transformation<T>>,
        adjust: Adjust<T>,
    },
    /// `left` applied after `right` on reads, before `right` on writes.
    Composed {
        left: Box<Transformation<T>>,
        right: Box<Transformation<T>>,
    },
}

impl<T> Clone for Transformation<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Identity => Self::Identity,
            Self::Keyed { forward, backward } => Self::Keyed {
                forward: Arc::clone(forward),
                backward: Arc::clone(backward),
            },
            Self::Adjusted { inner, adjust } => Self::Adjusted {
                inner: inner.clone(),
                adjust: Arc::clone(adjust),
            },
            Self::Composed { left, right } => Self::Composed {
                left: left.clone(),
                right: right.clone(),
            },
        }
    }
}

impl<T> Default for Transformation<T> {
    fn default() -> Self {
        Self::Identity
    }
}

impl<T> fmt::Debug for Transformation<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Identity => f.write_str("Identity"),
            Self::Keyed { .. } => f.write_str("Keyed"),
            Self::Adjusted { inner, .. } => f
                .debug_struct("Adjusted")
                .field("inner", inner)
                .finish_non_exhaustive(),
            Self::Composed { left, right } => f
                .debug_struct("Composed")
                .field("left", left)
                .field("right", right)
                .finish(),
        }
    }
}

impl<T> Transformation<T> {
    /// The identity transformation.
    pub fn identity() -> Self {
        Self::Identity
    }

    /// A transformation from custom functions. Both must be pure.
    pub fn keyed<F, B>(forward: F, backward: B) -> Self
    where
        F: Fn(Option<&RawValue>) -> Option<T> + Send + Sync + 'static,
        B: Fn(Option<&T>) -> Option<RawValue> + Send + Sync + 'static,
    {
        Self::Keyed {
            forward: Arc::new(forward),
            backward: Arc::new(backward),
        }
    }

    /// `inner` with a typed adjustment on reads.
    ///
    /// `adjust` sees exactly what `inner` read, including values that have
    /// no raw rendering.
    pub fn adjusted<F>(inner: Self, adjust: F) -> Self
    where
        F: Fn(Option<T>) -> Option<T> + Send + Sync + 'static,
    {
        Self::Adjusted {
            inner: Box::new(inner),
            adjust: Arc::new(adjust),
        }
    }

    /// Compose two transformations, eliding identity operands.
    ///
    /// Observably equivalent to [`Transformation::nest`]. A keyed `left`
    /// receives the intermediate value as `T`'s identity rendering, so it
    /// should read and write `T`-shaped raw values; `right` owns the stored
    /// format.
    pub fn compose(left: Self, right: Self) -> Self {
        match (left, right) {
            (Self::Identity, other) | (other, Self::Identity) => other,
            (left, right) => Self::nest(left, right),
        }
    }

    /// Compose two transformations without eliding identity operands.
    pub fn nest(left: Self, right: Self) -> Self {
        Self::Composed {
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Returns `true` for [`Transformation::Identity`].
    pub fn is_identity(&self) -> bool {
        matches!(self, Self::Identity)
    }

    /// Number of non-composite layers in this transformation.
    pub fn depth(&self) -> usize {
        match self {
            Self::Identity | Self::Keyed { .. } => 1,
            Self::Adjusted { inner, .. } => inner.depth() + 1,
            Self::Composed { left, right } => left.depth() + right.depth(),
        }
    }

    /// Identity, or a composition of nothing but identities.
    fn is_passthrough(&self) -> bool {
        match self {
            Self::Identity => true,
            Self::Composed { left, right } => left.is_passthrough() && right.is_passthrough(),
            Self::Keyed { .. } | Self::Adjusted { .. } => false,
        }
    }
}

impl<T: PreferenceValue> Transformation<T> {
    /// Convert a raw value (or its absence) to `T`.
    pub fn forward(&self, raw: Option<&RawValue>) -> Option<T> {
        match self {
            Self::Identity => raw.and_then(T::from_raw),
            Self::Keyed { forward, .. } => forward(raw),
            Self::Adjusted { inner, adjust } => adjust(inner.forward(raw)),
            Self::Composed { left, right } if right.is_passthrough() => left.forward(raw),
            Self::Composed { left, right } => left.refine(right.forward(raw)),
        }
    }

    /// Read an already typed value through this transformation as the left
    /// side of a composition.
    fn refine(&self, value: Option<T>) -> Option<T> {
        match self {
            Self::Identity => value,
            Self::Keyed { forward, .. } => {
                let raw = value.and_then(|v| v.to_raw());
                forward(raw.as_ref())
            }
            Self::Adjusted { inner, adjust } => adjust(inner.refine(value)),
            Self::Composed { left, right } => left.refine(right.refine(value)),
        }
    }

    /// Convert `T` (or its absence) to a raw value.
    pub fn backward(&self, value: Option<&T>) -> Option<RawValue> {
        match self {
            Self::Identity => value.and_then(T::to_raw),
            Self::Keyed { backward, .. } => backward(value),
            Self::Adjusted { inner, .. } => inner.backward(value),
            Self::Composed { left, right } if right.is_passthrough() => left.backward(value),
            Self::Composed { left, right } => left.backward_onto(right, value),
        }
    }

    /// Write `value` through this transformation and then through
    /// `store_side`.
    fn backward_onto(&self, store_side: &Self, value: Option<&T>) -> Option<RawValue> {
        match self {
            Self::Identity => store_side.backward(value),
            Self::Adjusted { inner, .. } => inner.backward_onto(store_side, value),
            Self::Keyed { backward, .. } => {
                let mid = backward(value).and_then(|raw| T::from_raw(&raw));
                store_side.backward(mid.as_ref())
            }
            Self::Composed { left, right } => {
                let rest = Self::nest((**right).clone(), store_side.clone());
                left.backward_onto(&rest, value)
            }
        }
    }

    /// Read `key` from `store` through this transformation.
    pub fn get<S>(&self, key: &PreferenceKey, store: &S) -> StoreResult<Option<T>>
    where
        S: RawStore + ?Sized,
    {
        let raw = store.raw_value(key)?;
        Ok(self.forward(raw.as_ref()))
    }

    /// Write `value` at `key` through this transformation.
    ///
    /// When the value is absent or has no raw rendering, the key is deleted.
    pub fn set<S>(&self, key: &PreferenceKey, value: Option<&T>, store: &S) -> StoreResult<()>
    where
        S: MutableStore + ?Sized,
    {
        match self.backward(value) {
            Some(raw) => store.write(key, Some(raw)),
            None => {
                if value.is_some() {
                    debug!(%key, "value has no raw form, deleting key");
                }
                store.delete(key).map(|_| ())
            }
        }
    }

    /// A read-only adjustment applied to the typed value.
    ///
    /// Writes go through the identity cast unchanged.
    pub fn post_read<F>(adjust: F) -> Self
    where
        F: Fn(Option<T>) -> Option<T> + Send + Sync + 'static,
    {
        Self::adjusted(Self::Identity, adjust)
    }

    /// Store `T` as a JSON-encoded string.
    pub fn json_encoded() -> Self {
        Self::keyed(
            |raw| {
                let text = raw?.as_str()?;
                serde_json::from_str(text).ok()
            },
            |value| {
                let text = serde_json::to_string(value?).ok()?;
                Some(RawValue::String(text))
            },
        )
    }

    /// Read and write through an intermediate type `U`.
    ///
    /// The raw value is read as `U` by the identity cast and then converted
    /// with `to`; writes convert with `from` and store `U`'s raw rendering.
    pub fn mapped<U, To, From>(to: To, from: From) -> Self
    where
        U: PreferenceValue,
        To: Fn(U) -> Option<T> + Send + Sync + 'static,
        From: Fn(&T) -> Option<U> + Send + Sync + 'static,
    {
        Self::keyed(
            move |raw| raw.and_then(U::from_raw).and_then(&to),
            move |value| value.and_then(&from).and_then(|u| u.to_raw()),
        )
    }
}

impl<T> Transformation<T>
where
    T: PreferenceValue + FromStr + Display,
{
    /// Store `T` as its `Display` string and read it back with `FromStr`.
    ///
    /// Raw numbers and booleans are accepted on reads by rendering them
    /// first, so a slot written by another tool as `5` still reads.
    pub fn string_parsed() -> Self {
        Self::keyed(
            |raw| match raw? {
                RawValue::String(text) => text.parse().ok(),
                RawValue::Number(n) => n.to_string().parse().ok(),
                RawValue::Bool(b) => b.to_string().parse().ok(),
                _ => None,
            },
            |value| value.map(|v| RawValue::String(v.to_string())),
        )
    }
}
