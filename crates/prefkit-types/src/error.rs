use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid preference key {key:?}: {reason}")]
    InvalidKey { key: String, reason: String },
}
