//! # Storage
//!
//! The persistence contract is deliberately dumb: one string value per key, read and written
//! whole. There is no incremental update; callers rewrite the entire value on every change.

use std::path::{Path, PathBuf};

/// Key holding the JSON list of saved drafts, newest first.
pub const DRAFTS_KEY: &str = "whiteboard.drafts";
/// Key holding the active theme identifier.
pub const THEME_KEY: &str = "whiteboard.theme";

#[derive(thiserror::Error, Debug)]
pub enum StorageError {
    #[error("invalid storage key {0:?}")]
    InvalidKey(String),
    #[error("storage quota exceeded")]
    QuotaExceeded,
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub trait KeyValueStore {
    /// Fetch the value at `key`, `None` if never written.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    /// Replace the value at `key`.
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}
impl<Store: KeyValueStore + ?Sized> KeyValueStore for &mut Store {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }
}
impl<Store: KeyValueStore + ?Sized> KeyValueStore for Box<Store> {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }
}

/// In-process store. Optionally enforces a total size quota, in bytes of stored values.
#[derive(Default, Debug, Clone)]
pub struct MemoryStore {
    values: std::collections::HashMap<String, String>,
    quota: Option<usize>,
}
impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
    #[must_use]
    pub fn with_quota(quota: usize) -> Self {
        Self {
            values: std::collections::HashMap::new(),
            quota: Some(quota),
        }
    }
}
impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.values.get(key).cloned())
    }
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        if let Some(quota) = self.quota {
            let others: usize = self
                .values
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(_, v)| v.len())
                .sum();
            if others + value.len() > quota {
                return Err(StorageError::QuotaExceeded);
            }
        }
        self.values.insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}

/// Stores each key as `<root>/<key>.json`.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}
impl FileStore {
    /// Use `root` as the storage directory, creating it (and parents) if needed.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }
    fn path_of(&self, key: &str) -> Result<PathBuf, StorageError> {
        // Keys become file names, keep them boring.
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'))
            && !key.starts_with('.');
        if !valid {
            return Err(StorageError::InvalidKey(key.to_owned()));
        }
        Ok(self.root.join(format!("{key}.json")))
    }
}
impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match std::fs::read_to_string(self.path_of(key)?) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_of(key)?;
        // Write aside and rename, so a failed write never leaves half a list behind.
        let temp = path.with_extension("json.tmp");
        std::fs::write(&temp, value)?;
        std::fs::rename(&temp, &path)?;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::{FileStore, KeyValueStore, MemoryStore, StorageError};
    #[test]
    fn memory_get_set() {
        let mut store = MemoryStore::new();
        assert_eq!(store.get("a").unwrap(), None);
        store.set("a", "1").unwrap();
        store.set("a", "2").unwrap();
        assert_eq!(store.get("a").unwrap().as_deref(), Some("2"));
    }
    #[test]
    fn memory_quota() {
        let mut store = MemoryStore::with_quota(8);
        store.set("a", "1234").unwrap();
        // Replacing a value doesn't count the old one.
        store.set("a", "12345678").unwrap();
        assert!(matches!(
            store.set("b", "1"),
            Err(StorageError::QuotaExceeded)
        ));
        assert_eq!(store.get("b").unwrap(), None);
    }
    #[test]
    fn file_get_set() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::open(dir.path().join("nested")).unwrap();
        assert_eq!(store.get("whiteboard.theme").unwrap(), None);
        store.set("whiteboard.theme", "eyecare").unwrap();
        assert_eq!(
            store.get("whiteboard.theme").unwrap().as_deref(),
            Some("eyecare")
        );
        assert!(dir.path().join("nested/whiteboard.theme.json").exists());
    }
    #[test]
    fn file_rejects_path_keys() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::open(dir.path()).unwrap();
        for key in ["", "../escape", ".hidden", "a/b"] {
            assert!(matches!(
                store.set(key, "x"),
                Err(StorageError::InvalidKey(_))
            ));
        }
    }
}
