//! Key-value blob persistence.
//!
//! The exhibition store writes one opaque blob under a fixed key. Anything
//! that can get and set strings by key can back it: a directory of JSON files
//! on disk, or an in-memory map for tests and throwaway sessions.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tokio::fs;
use tokio::sync::Mutex;

/// Errors from persistence operations.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid key '{0}'")]
    InvalidKey(String),
}

/// A string blob store addressed by key.
#[async_trait]
pub trait KvStore: Send + Sync {
    /// Read the blob under `key`, or `None` when nothing was ever written.
    async fn get(&self, key: &str) -> Result<Option<String>, PersistError>;

    /// Replace the blob under `key`. Returns once the write is durable.
    async fn set(&self, key: &str, blob: &str) -> Result<(), PersistError>;
}

/// Stores each key as `<dir>/<key>.json`.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file holding `key`.
    pub fn path_for(&self, key: &str) -> Result<PathBuf, PersistError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(PersistError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

#[async_trait]
impl KvStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<String>, PersistError> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn set(&self, key: &str, blob: &str) -> Result<(), PersistError> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.dir).await?;

        // Atomic replace.
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, blob).await?;
        fs::rename(&tmp, &path).await?;
        Ok(())
    }
}

/// An in-memory store. Clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that already holds `blob` under `key`.
    pub fn with_entry(key: impl Into<String>, blob: impl Into<String>) -> Self {
        let mut map = HashMap::new();
        map.insert(key.into(), blob.into());
        Self {
            entries: Arc::new(Mutex::new(map)),
        }
    }

    /// Number of keys written so far.
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }

    /// Keys written so far, sorted.
    pub async fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.entries.lock().await.keys().cloned().collect();
        keys.sort();
        keys
    }
}

#[async_trait]
impl KvStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, PersistError> {
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, blob: &str) -> Result<(), PersistError> {
        self.entries
            .lock()
            .await
            .insert(key.to_string(), blob.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_path_for_rejects_traversal() {
        let store = FileStore::new("/data");
        assert!(store.path_for("exhibition_platform_data").is_ok());
        assert!(matches!(
            store.path_for("../etc/passwd"),
            Err(PersistError::InvalidKey(_))
        ));
        assert!(store.path_for("").is_err());
    }

    #[tokio::test]
    async fn test_file_store_missing_key_is_none() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let store = FileStore::new(temp_dir.path());
        assert!(store.get("nothing_here").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_file_store_set_then_get() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let store = FileStore::new(temp_dir.path().join("nested"));

        store.set("blob", "[1,2,3]").await.expect("Set should succeed");
        store.set("blob", "[4]").await.expect("Overwrite should succeed");

        assert_eq!(store.get("blob").await.unwrap().as_deref(), Some("[4]"));
        assert!(!temp_dir.path().join("nested/blob.json.tmp").exists());
    }

    #[tokio::test]
    async fn test_memory_store_clones_share_entries() {
        let store = MemoryStore::new();
        let other = store.clone();
        store.set("k", "v").await.unwrap();

        assert_eq!(other.get("k").await.unwrap().as_deref(), Some("v"));
        assert_eq!(other.len().await, 1);
    }
}
