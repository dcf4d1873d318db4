//! Store configuration.
//!
//! A host application describes its backing store once, typically in a TOML
//! file, and opens it at startup:
//!
//! ```toml
//! backend = "json_file"
//! path = "prefs.json"
//! read_only = false
//! namespace = "app"
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{StoreError, StoreResult};
use crate::file::JsonFileStore;
use crate::memory::InMemoryStore;
use crate::traits::MutableStore;

/// Which bundled backend to open.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Backend {
    /// Non-durable [`InMemoryStore`].
    #[default]
    Memory,
    /// [`JsonFileStore`] at [`StoreConfig::path`].
    JsonFile,
}

/// Configuration for the default backing store.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Backend to open.
    pub backend: Backend,
    /// File path, required by [`Backend::JsonFile`].
    pub path: Option<PathBuf>,
    /// Open the backend so that writes fail with [`StoreError::ReadOnly`].
    pub read_only: bool,
    /// Namespace prepended to every key created through a context.
    pub namespace: Option<String>,
}

impl StoreConfig {
    /// An in-memory configuration.
    pub fn memory() -> Self {
        Self::default()
    }

    /// A JSON file configuration persisting to `path`.
    pub fn json_file(path: impl Into<PathBuf>) -> Self {
        Self {
            backend: Backend::JsonFile,
            path: Some(path.into()),
            ..Default::default()
        }
    }

    /// Set the default key namespace.
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Parse a configuration from TOML text and validate it.
    pub fn from_toml_str(text: &str) -> StoreResult<Self> {
        let config: Self = toml::from_str(text).map_err(|e| StoreError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a TOML configuration file.
    pub fn load(path: impl AsRef<Path>) -> StoreResult<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&text)
    }

    /// Check that the settings are consistent.
    pub fn validate(&self) -> StoreResult<()> {
        match self.backend {
            Backend::Memory => {
                if self.read_only {
                    return Err(StoreError::Config(
                        "read_only is not supported by the memory backend".into(),
                    ));
                }
            }
            Backend::JsonFile => {
                if self.path.is_none() {
                    return Err(StoreError::Config(
                        "json_file backend requires a path".into(),
                    ));
                }
            }
        }
        if let Some(ns) = self.namespace.as_deref() {
            if !ns.is_empty() {
                prefkit_types::validate_key(ns)?;
            }
        }
        Ok(())
    }

    /// Open the configured backend.
    pub fn open(&self) -> StoreResult<Arc<dyn MutableStore>> {
        self.validate()?;
        let store: Arc<dyn MutableStore> = match (self.backend, self.path.as_ref()) {
            (Backend::Memory, _) => Arc::new(InMemoryStore::new()),
            (Backend::JsonFile, Some(path)) if self.read_only => {
                Arc::new(JsonFileStore::open_read_only(path)?)
            }
            (Backend::JsonFile, Some(path)) => Arc::new(JsonFileStore::open(path)?),
            (Backend::JsonFile, None) => {
                return Err(StoreError::Config("json_file backend requires a path".into()))
            }
        };
        info!(backend = ?self.backend, path = ?self.path, "opened preference store");
        Ok(store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::RawStore;
    use prefkit_types::PreferenceKey;
    use serde_json::json;

    #[test]
    fn default_is_memory() {
        let config = StoreConfig::default();
        assert_eq!(config.backend, Backend::Memory);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn parses_json_file_config() {
        let config = StoreConfig::from_toml_str(
            r#"
            backend = "json_file"
            path = "prefs.json"
            namespace = "app"
            "#,
        )
        .unwrap();
        assert_eq!(config.backend, Backend::JsonFile);
        assert_eq!(config.path, Some(PathBuf::from("prefs.json")));
        assert_eq!(config.namespace.as_deref(), Some("app"));
        assert!(!config.read_only);
    }

    #[test]
    fn empty_toml_is_default() {
        assert_eq!(StoreConfig::from_toml_str("").unwrap(), StoreConfig::default());
    }

    #[test]
    fn json_file_without_path_is_rejected() {
        let err = StoreConfig::from_toml_str(r#"backend = "json_file""#).unwrap_err();
        assert!(matches!(err, StoreError::Config(_)));
    }

    #[test]
    fn unknown_backend_is_rejected() {
        let err = StoreConfig::from_toml_str(r#"backend = "registry""#).unwrap_err();
        assert!(matches!(err, StoreError::Config(_)));
    }

    #[test]
    fn read_only_memory_is_rejected() {
        let config = StoreConfig {
            read_only: true,
            ..StoreConfig::memory()
        };
        assert!(matches!(config.validate(), Err(StoreError::Config(_))));
    }

    #[test]
    fn invalid_namespace_is_rejected() {
        let config = StoreConfig::memory().with_namespace("bad namespace");
        assert!(matches!(config.validate(), Err(StoreError::InvalidKey(_))));
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.toml");
        std::fs::write(&path, "backend = \"memory\"\nnamespace = \"svc\"\n").unwrap();
        let config = StoreConfig::load(&path).unwrap();
        assert_eq!(config.namespace.as_deref(), Some("svc"));
    }

    #[test]
    fn opens_json_file_backend() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");
        let store = StoreConfig::json_file(&path).open().unwrap();
        store
            .write(&PreferenceKey::from("retries"), Some(json!(3)))
            .unwrap();
        assert!(path.exists());
    }

    #[test]
    fn read_only_json_file_rejects_writes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");
        std::fs::write(&path, r#"{"retries": 1}"#).unwrap();
        let config = StoreConfig {
            read_only: true,
            ..StoreConfig::json_file(&path)
        };
        let store = config.open().unwrap();
        assert_eq!(
            store.raw_value(&PreferenceKey::from("retries")).unwrap(),
            Some(json!(1))
        );
        assert!(matches!(
            store.write(&PreferenceKey::from("retries"), Some(json!(3))),
            Err(StoreError::ReadOnly)
        ));
    }
}
