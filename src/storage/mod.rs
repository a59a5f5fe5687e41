use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde_json::Value;
use thiserror::Error;

use crate::config;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("missing HOME environment variable")]
    MissingHomeDirectory,
    #[error("storage key is empty")]
    EmptyKey,
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// Contract of the external key-value store: JSON values addressed by
/// string key. `get` of an absent key is `Ok(None)`; `remove` of an
/// absent key succeeds.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> StorageResult<Option<Value>>;
    fn set(&self, key: &str, value: &Value) -> StorageResult<()>;
    fn remove(&self, key: &str) -> StorageResult<()>;
}

/// File-backed store: one `<key>.json` document per key under the app
/// data directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub const fn with_root(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn with_default_paths() -> StorageResult<Self> {
        let root = config::app_data_dir().map_err(|_| StorageError::MissingHomeDirectory)?;
        fs::create_dir_all(&root)?;
        Ok(Self::with_root(root))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn validate_key(key: &str) -> StorageResult<()> {
        if key.is_empty() {
            return Err(StorageError::EmptyKey);
        }
        Ok(())
    }

    fn path_for_key(&self, key: &str) -> StorageResult<PathBuf> {
        Self::validate_key(key)?;
        let mut path = self.root.clone();
        path.push(format!("{key}.json"));
        Ok(path)
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> StorageResult<Option<Value>> {
        let path = self.path_for_key(key)?;
        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(StorageError::Io(err)),
        };
        Ok(Some(serde_json::from_str(&contents)?))
    }

    fn set(&self, key: &str, value: &Value) -> StorageResult<()> {
        let path = self.path_for_key(key)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, serde_json::to_string_pretty(value)?)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        let path = self.path_for_key(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(StorageError::Io(err)),
        }
    }
}

/// In-memory store used by unit tests and headless runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RefCell<HashMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> StorageResult<Option<Value>> {
        FileStore::validate_key(key)?;
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &Value) -> StorageResult<()> {
        FileStore::validate_key(key)?;
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.clone());
        Ok(())
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        FileStore::validate_key(key)?;
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn memory_store_round_trips_values_by_key() {
        let store = MemoryStore::new();
        assert!(store.get("pins").unwrap().is_none());

        store.set("pins", &json!([{ "name": "a" }])).unwrap();
        assert_eq!(store.get("pins").unwrap(), Some(json!([{ "name": "a" }])));

        store.remove("pins").unwrap();
        assert!(store.get("pins").unwrap().is_none());
    }

    #[test]
    fn empty_key_is_rejected() {
        let store = MemoryStore::new();
        assert!(matches!(store.get(""), Err(StorageError::EmptyKey)));
    }

    #[test]
    fn file_store_get_of_absent_key_is_none_and_remove_is_idempotent() {
        let root = std::env::temp_dir().join("pinshelf-storage-test");
        let store = FileStore::with_root(root);
        assert!(store.get("never-written").unwrap().is_none());
        store.remove("never-written").unwrap();
    }

    #[test]
    fn file_store_set_then_get_round_trips() {
        let root = std::env::temp_dir().join("pinshelf-storage-roundtrip");
        let store = FileStore::with_root(root);
        let value = json!({ "left": "12px", "top": "40px" });

        store.set("fab_pos", &value).unwrap();
        assert_eq!(store.get("fab_pos").unwrap(), Some(value));
        store.remove("fab_pos").unwrap();
        assert!(store.get("fab_pos").unwrap().is_none());
    }
}
