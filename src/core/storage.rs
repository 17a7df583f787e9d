//! Client-side key/value persistence
//!
//! Everything the client keeps between page loads (session record, recent
//! searches) goes through [`KeyValueStore`]. Implementations:
//! - [`BrowserStorage`] - `window.localStorage` in the hydrated build, an
//!   always-empty store during the server rendering pass
//! - [`MemoryStore`] - process-local map, used by tests
//! - [`FileStore`] - JSON file on disk, used by the command-line client

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Storage error types
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StorageError {
    #[error("Storage is not available")]
    Unavailable,

    #[error("Failed to write key {0}")]
    WriteFailed(String),

    #[error("Failed to remove key {0}")]
    RemoveFailed(String),
}

/// Synchronous string key/value store with `localStorage` semantics
pub trait KeyValueStore: Send + Sync {
    /// Returns `None` when the key is absent or the store is unavailable
    fn get_item(&self, key: &str) -> Option<String>;

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;

    fn remove_item(&self, key: &str) -> Result<(), StorageError>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Arc<S> {
    fn get_item(&self, key: &str) -> Option<String> {
        (**self).get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set_item(key, value)
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        (**self).remove_item(key)
    }
}

/// In-memory store
#[derive(Debug, Default)]
pub struct MemoryStore {
    items: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys currently stored
    pub fn len(&self) -> usize {
        self.items.lock().map(|items| items.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KeyValueStore for MemoryStore {
    fn get_item(&self, key: &str) -> Option<String> {
        self.items.lock().ok()?.get(key).cloned()
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut items = self
            .items
            .lock()
            .map_err(|_| StorageError::WriteFailed(key.to_string()))?;
        items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        let mut items = self
            .items
            .lock()
            .map_err(|_| StorageError::RemoveFailed(key.to_string()))?;
        items.remove(key);
        Ok(())
    }
}

/// `window.localStorage`
///
/// The handle is looked up on every call, so this type is freely shareable.
/// Outside the browser (server rendering pass) reads return `None` and
/// writes are no-ops.
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserStorage;

#[cfg(feature = "hydrate")]
impl BrowserStorage {
    fn storage() -> Option<web_sys::Storage> {
        let window = web_sys::window()?;
        window.local_storage().ok()?
    }
}

#[cfg(feature = "hydrate")]
impl KeyValueStore for BrowserStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        Self::storage()?.get_item(key).ok()?
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        Self::storage()
            .ok_or(StorageError::Unavailable)?
            .set_item(key, value)
            .map_err(|_| StorageError::WriteFailed(key.to_string()))
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        Self::storage()
            .ok_or(StorageError::Unavailable)?
            .remove_item(key)
            .map_err(|_| StorageError::RemoveFailed(key.to_string()))
    }
}

/// Server rendering pass: no storage
#[cfg(not(feature = "hydrate"))]
impl KeyValueStore for BrowserStorage {
    fn get_item(&self, _key: &str) -> Option<String> {
        None
    }

    fn set_item(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
        Ok(())
    }

    fn remove_item(&self, _key: &str) -> Result<(), StorageError> {
        Ok(())
    }
}

/// JSON file holding a flat string map
///
/// The whole file is rewritten on every change through a temporary file and
/// a rename. A missing or unreadable file reads as empty.
#[cfg(feature = "ssr")]
#[derive(Debug)]
pub struct FileStore {
    path: std::path::PathBuf,
    lock: Mutex<()>,
}

#[cfg(feature = "ssr")]
impl FileStore {
    pub fn new(path: impl Into<std::path::PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    fn read_all(&self) -> HashMap<String, String> {
        std::fs::read_to_string(&self.path)
            .ok()
            .and_then(|raw| serde_json::from_str(&raw).ok())
            .unwrap_or_default()
    }

    fn write_all(&self, items: &HashMap<String, String>, key: &str) -> Result<(), StorageError> {
        let fail = || StorageError::WriteFailed(key.to_string());

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|_| fail())?;
        }
        let json = serde_json::to_string_pretty(items).map_err(|_| fail())?;
        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, json).map_err(|_| fail())?;
        std::fs::rename(&tmp, &self.path).map_err(|_| fail())
    }
}

#[cfg(feature = "ssr")]
impl KeyValueStore for FileStore {
    fn get_item(&self, key: &str) -> Option<String> {
        let _guard = self.lock.lock().ok()?;
        self.read_all().remove(key)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| StorageError::WriteFailed(key.to_string()))?;
        let mut items = self.read_all();
        items.insert(key.to_string(), value.to_string());
        self.write_all(&items, key)
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| StorageError::RemoveFailed(key.to_string()))?;
        let mut items = self.read_all();
        if items.remove(key).is_none() {
            return Ok(());
        }
        self.write_all(&items, key)
            .map_err(|_| StorageError::RemoveFailed(key.to_string()))
    }
}
