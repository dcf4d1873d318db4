use std::path::PathBuf;

use prefkit_types::TypeError;

/// Errors from backing store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The store was opened read-only or denies writes.
    #[error("store is read-only")]
    ReadOnly,

    /// I/O error from the underlying storage backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization or deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// The persisted document is malformed.
    #[error("corrupt store file {path:?}: {reason}")]
    Corrupt { path: PathBuf, reason: String },

    /// A lock guarding the store was poisoned by a panicking writer.
    #[error("store lock poisoned")]
    LockPoisoned,

    /// Invalid store configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// A key failed validation.
    #[error(transparent)]
    InvalidKey(#[from] TypeError),
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corrupt_display_names_file() {
        let err = StoreError::Corrupt {
            path: PathBuf::from("prefs.json"),
            reason: "not an object".into(),
        };
        assert_eq!(err.to_string(), "corrupt store file \"prefs.json\": not an object");
    }

    #[test]
    fn invalid_key_is_transparent() {
        use prefkit_types::PreferenceKey;

        let err: StoreError = PreferenceKey::parse("").unwrap_err().into();
        assert!(err.to_string().contains("must not be empty"));
    }

    #[test]
    fn json_errors_become_serialization() {
        let json_err = serde_json::from_str::<u32>("nope").unwrap_err();
        let err: StoreError = json_err.into();
        assert!(matches!(err, StoreError::Serialization(_)));
    }
}
