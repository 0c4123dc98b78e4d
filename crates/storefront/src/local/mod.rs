//! Local persistent key-value store.
//!
//! The fallback cache behind the sync gateway: string keys, string values,
//! one file per key under a configurable directory. Values survive process
//! restarts and are scoped to the install (the directory). Writes go through
//! a temp file plus rename so a crash cannot leave a half-written value.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::instrument;

use zada_core::StorageKey;

/// Errors from the local key-value store.
#[derive(Debug, Error)]
pub enum LocalStoreError {
    /// Filesystem failure (permissions, disk full, missing directory).
    #[error("local store I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// File-backed key-value store.
#[derive(Debug, Clone)]
pub struct LocalStore {
    dir: PathBuf,
}

impl LocalStore {
    /// Open a store rooted at `dir`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self, LocalStoreError> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir).await?;
        Ok(Self { dir })
    }

    /// The directory backing this store.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &StorageKey) -> PathBuf {
        // Keys are built by KeyNamespace from [a-z0-9_] segments, but keep
        // the mapping safe against anything else that might reach here.
        let file: String = key
            .as_str()
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '-' })
            .collect();
        self.dir.join(format!("{file}.json"))
    }

    /// Read the value stored under `key`, or `None` if absent.
    ///
    /// # Errors
    ///
    /// Returns an error for any I/O failure other than the key being absent.
    #[instrument(skip(self), fields(key = %key))]
    pub async fn get_item(&self, key: &StorageKey) -> Result<Option<String>, LocalStoreError> {
        match tokio::fs::read_to_string(self.path_for(key)).await {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be persisted.
    #[instrument(skip(self, value), fields(key = %key, bytes = value.len()))]
    pub async fn set_item(&self, key: &StorageKey, value: &str) -> Result<(), LocalStoreError> {
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, value).await?;
        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }

    /// Remove the value stored under `key`. Removing an absent key is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error for any I/O failure other than the key being absent.
    #[instrument(skip(self), fields(key = %key))]
    pub async fn remove_item(&self, key: &StorageKey) -> Result<(), LocalStoreError> {
        match tokio::fs::remove_file(self.path_for(key)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// List the names of all stored keys, for diagnostics.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be read.
    pub async fn keys(&self) -> Result<Vec<String>, LocalStoreError> {
        let mut entries = tokio::fs::read_dir(&self.dir).await?;
        let mut keys = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name().to_string_lossy().into_owned();
            if let Some(stripped) = name.strip_suffix(".json") {
                keys.push(stripped.to_string());
            }
        }
        keys.sort();
        Ok(keys)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use zada_core::KeyNamespace;

    fn temp_store_dir() -> PathBuf {
        std::env::temp_dir().join(format!("zada-local-store-{}", uuid::Uuid::new_v4()))
    }

    #[tokio::test]
    async fn test_set_get_roundtrip() {
        let store = LocalStore::open(temp_store_dir()).await.unwrap();
        let key = KeyNamespace::new("zada").products();

        store.set_item(&key, "[{\"id\":1}]").await.unwrap();
        assert_eq!(
            store.get_item(&key).await.unwrap().as_deref(),
            Some("[{\"id\":1}]")
        );
    }

    #[tokio::test]
    async fn test_get_absent_key() {
        let store = LocalStore::open(temp_store_dir()).await.unwrap();
        let key = KeyNamespace::new("zada").users();
        assert!(store.get_item(&key).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_set_overwrites() {
        let store = LocalStore::open(temp_store_dir()).await.unwrap();
        let key = KeyNamespace::new("zada").products();

        store.set_item(&key, "old").await.unwrap();
        store.set_item(&key, "new").await.unwrap();
        assert_eq!(store.get_item(&key).await.unwrap().as_deref(), Some("new"));
    }

    #[tokio::test]
    async fn test_remove_item() {
        let store = LocalStore::open(temp_store_dir()).await.unwrap();
        let key = KeyNamespace::new("zada").current_user();

        store.set_item(&key, "{}").await.unwrap();
        store.remove_item(&key).await.unwrap();
        assert!(store.get_item(&key).await.unwrap().is_none());

        // Removing again is a no-op
        store.remove_item(&key).await.unwrap();
    }

    #[tokio::test]
    async fn test_values_survive_reopen() {
        let dir = temp_store_dir();
        let key = KeyNamespace::new("zada").users();

        {
            let store = LocalStore::open(&dir).await.unwrap();
            store.set_item(&key, "persisted").await.unwrap();
        }

        let reopened = LocalStore::open(&dir).await.unwrap();
        assert_eq!(
            reopened.get_item(&key).await.unwrap().as_deref(),
            Some("persisted")
        );
    }

    #[tokio::test]
    async fn test_keys_listing() {
        let store = LocalStore::open(temp_store_dir()).await.unwrap();
        let ns = KeyNamespace::new("zada");

        store.set_item(&ns.users(), "[]").await.unwrap();
        store.set_item(&ns.products(), "[]").await.unwrap();

        let keys = store.keys().await.unwrap();
        assert_eq!(keys, vec!["zada_products", "zada_users"]);
    }
}
