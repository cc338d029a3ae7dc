//! Key-value persistence collaborator.
//!
//! The editor only knows keys and JSON values. Prefixing and encoding belong to
//! the store implementation.

use std::collections::HashMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::positions::PositionStore;

pub const DEFAULT_PREFIX: &str = "dbdiagram_";

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Stored value is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Browser storage is unavailable")]
    Unavailable,
    #[error("Browser storage error: {0}")]
    Browser(String),
}

pub trait KeyValueStore {
    fn load(&self, key: &str) -> Result<Option<Value>, StorageError>;
    fn save(&mut self, key: &str, value: Value) -> Result<(), StorageError>;
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

/// What gets persisted for the workspace: the text and the layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedDiagram {
    pub content: String,
    #[serde(default)]
    pub positions: Option<PositionStore>,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    values: HashMap<String, Value>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn load(&self, key: &str) -> Result<Option<Value>, StorageError> {
        Ok(self.values.get(key).cloned())
    }

    fn save(&mut self, key: &str, value: Value) -> Result<(), StorageError> {
        self.values.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.values.remove(key);
        Ok(())
    }
}

/// One `<prefix><key>.json` file per key inside a directory.
#[derive(Debug)]
pub struct FileStore {
    dir: PathBuf,
    prefix: String,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self::with_prefix(dir, DEFAULT_PREFIX)
    }

    pub fn with_prefix(dir: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            prefix: prefix.into(),
        }
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}{}.json", self.prefix, key))
    }

    /// Remove every file carrying this store's prefix.
    pub fn clear(&mut self) -> Result<(), StorageError> {
        if !self.dir.exists() {
            return Ok(());
        }
        for entry in std::fs::read_dir(&self.dir)? {
            let entry = entry?;
            let name = entry.file_name();
            if name.to_string_lossy().starts_with(&self.prefix) {
                std::fs::remove_file(entry.path())?;
            }
        }
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn load(&self, key: &str) -> Result<Option<Value>, StorageError> {
        let path = self.path(key);
        if !path.exists() {
            return Ok(None);
        }
        let text = std::fs::read_to_string(path)?;
        Ok(Some(serde_json::from_str(&text)?))
    }

    fn save(&mut self, key: &str, value: Value) -> Result<(), StorageError> {
        std::fs::create_dir_all(&self.dir)?;
        std::fs::write(self.path(key), serde_json::to_string(&value)?)?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        let path = self.path(key);
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }
}

#[cfg(target_arch = "wasm32")]
pub use browser::BrowserStore;

#[cfg(target_arch = "wasm32")]
mod browser {
    use serde_json::Value;
    use wasm_bindgen::JsValue;

    use super::{DEFAULT_PREFIX, KeyValueStore, StorageError};

    /// `window.localStorage`, one prefixed item per key holding JSON text.
    #[derive(Debug)]
    pub struct BrowserStore {
        prefix: String,
    }

    impl Default for BrowserStore {
        fn default() -> Self {
            Self::with_prefix(DEFAULT_PREFIX)
        }
    }

    impl BrowserStore {
        pub fn with_prefix(prefix: impl Into<String>) -> Self {
            Self {
                prefix: prefix.into(),
            }
        }

        fn item(&self, key: &str) -> String {
            format!("{}{}", self.prefix, key)
        }

        fn storage(&self) -> Result<web_sys::Storage, StorageError> {
            web_sys::window()
                .and_then(|window| window.local_storage().ok().flatten())
                .ok_or(StorageError::Unavailable)
        }
    }

    fn js_error(err: JsValue) -> StorageError {
        StorageError::Browser(format!("{err:?}"))
    }

    impl KeyValueStore for BrowserStore {
        fn load(&self, key: &str) -> Result<Option<Value>, StorageError> {
            let text = self.storage()?.get_item(&self.item(key)).map_err(js_error)?;
            match text {
                Some(text) => Ok(Some(serde_json::from_str(&text)?)),
                None => Ok(None),
            }
        }

        fn save(&mut self, key: &str, value: Value) -> Result<(), StorageError> {
            let text = serde_json::to_string(&value)?;
            self.storage()?
                .set_item(&self.item(key), &text)
                .map_err(js_error)
        }

        fn remove(&mut self, key: &str) -> Result<(), StorageError> {
            self.storage()?.remove_item(&self.item(key)).map_err(js_error)
        }
    }
}
