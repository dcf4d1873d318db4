use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Maximum key length in bytes.
pub const MAX_KEY_LENGTH: usize = 512;

/// Separator between namespace components and the key name.
pub const NAMESPACE_SEPARATOR: char = '/';

/// Identifier for a slot in a backing store.
///
/// A key is a name, optionally prefixed by a `/`-separated namespace
/// (`app/ui/theme` has namespace `app/ui` and name `theme`). Equality,
/// ordering and hashing all use the full path, so two keys built differently
/// but naming the same path are the same key.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PreferenceKey(String);

impl PreferenceKey {
    /// Create a key in the root namespace without validation.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Create a key inside `namespace` without validation.
    pub fn namespaced(namespace: &str, name: &str) -> Self {
        if namespace.is_empty() {
            return Self::new(name);
        }
        Self(format!("{namespace}{NAMESPACE_SEPARATOR}{name}"))
    }

    /// Parse and validate a full key path.
    pub fn parse(path: &str) -> Result<Self, TypeError> {
        validate_key(path)?;
        Ok(Self(path.to_string()))
    }

    /// Move this key under an additional outer namespace.
    pub fn in_namespace(&self, namespace: &str) -> Self {
        Self::namespaced(namespace, &self.0)
    }

    /// The full path of the key.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The last path component.
    pub fn name(&self) -> &str {
        match self.0.rsplit_once(NAMESPACE_SEPARATOR) {
            Some((_, name)) => name,
            None => &self.0,
        }
    }

    /// Everything before the last separator, if any.
    pub fn namespace(&self) -> Option<&str> {
        self.0.rsplit_once(NAMESPACE_SEPARATOR).map(|(ns, _)| ns)
    }

    /// Returns `true` if this key lives at or under `prefix`.
    ///
    /// The prefix is matched on whole components: `app` matches `app/theme`
    /// but not `apple`. An empty prefix matches every key.
    pub fn is_under(&self, prefix: &str) -> bool {
        let prefix = prefix.trim_end_matches(NAMESPACE_SEPARATOR);
        if prefix.is_empty() || self.0 == prefix {
            return true;
        }
        self.0
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.starts_with(NAMESPACE_SEPARATOR))
    }
}

impl fmt::Debug for PreferenceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PreferenceKey({})", self.0)
    }
}

impl fmt::Display for PreferenceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PreferenceKey {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for PreferenceKey {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl AsRef<str> for PreferenceKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Validate a full key path, returning `Ok(())` if it is well-formed.
///
/// # Examples
///
/// ```
/// use prefkit_types::validate_key;
///
/// assert!(validate_key("retries").is_ok());
/// assert!(validate_key("app/ui/theme").is_ok());
/// assert!(validate_key("").is_err());
/// assert!(validate_key("app//theme").is_err());
/// ```
pub fn validate_key(path: &str) -> Result<(), TypeError> {
    let invalid = |reason: &str| TypeError::InvalidKey {
        key: path.to_string(),
        reason: reason.to_string(),
    };

    if path.is_empty() {
        return Err(invalid("key must not be empty"));
    }
    if path.len() > MAX_KEY_LENGTH {
        return Err(invalid(&format!(
            "key exceeds maximum length of {MAX_KEY_LENGTH} bytes"
        )));
    }
    if path.starts_with(NAMESPACE_SEPARATOR) || path.ends_with(NAMESPACE_SEPARATOR) {
        return Err(invalid("must not start or end with '/'"));
    }
    if path.contains("//") {
        return Err(invalid("must not contain empty path components"));
    }
    if let Some(ch) = path.chars().find(|c| c.is_whitespace() || c.is_control()) {
        return Err(invalid(&format!("contains forbidden character: {ch:?}")));
    }
    Ok(())
}
