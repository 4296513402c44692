//! Filesystem-backed object store.
//!
//! The pipeline addresses all raw inputs and processed outputs through a
//! flat key->blob interface: get and put by key, list by prefix. Keys map
//! to paths under a root directory; puts are full overwrites of the target
//! key, so reruns are idempotent.

use crate::error::{EtlError, Result};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// Key->blob store rooted at a local directory
#[derive(Debug, Clone)]
pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute path backing a key. Used by readers that need to stream a
    /// large object from disk instead of materializing it as bytes.
    pub fn local_path(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }

    /// Fetch the blob at `key` wholesale.
    pub async fn get(&self, key: &str) -> Result<Vec<u8>> {
        let path = self.local_path(key);
        fs::read(&path)
            .await
            .map_err(|_| EtlError::source_missing(key))
    }

    /// Write `body` at `key`, replacing any previous content.
    pub async fn put(&self, key: &str, body: &[u8]) -> Result<()> {
        let path = self.local_path(key);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&path, body).await?;
        debug!("Wrote {} bytes to {}", body.len(), key);
        Ok(())
    }

    /// List all keys under `prefix`, sorted. A missing prefix directory is
    /// an empty listing, not an error; surfacing vacuous inputs is the
    /// caller's concern.
    pub async fn list(&self, prefix: &str) -> Result<Vec<String>> {
        let dir = self.root.join(prefix);
        let mut keys = Vec::new();

        let mut entries = match fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(_) => return Ok(keys),
        };

        while let Some(entry) = entries.next_entry().await? {
            if entry.file_type().await?.is_file() {
                let name = entry.file_name().to_string_lossy().to_string();
                keys.push(format!("{}{}", prefix, name));
            }
        }

        keys.sort();
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_put_then_get_roundtrip() {
        let temp_dir = TempDir::new().unwrap();
        let store = FsStore::new(temp_dir.path());

        store.put("processed/out.csv", b"a,b\n1,2\n").await.unwrap();
        let body = store.get("processed/out.csv").await.unwrap();
        assert_eq!(body, b"a,b\n1,2\n");
    }

    #[tokio::test]
    async fn test_put_overwrites() {
        let temp_dir = TempDir::new().unwrap();
        let store = FsStore::new(temp_dir.path());

        store.put("k", b"first run, longer body").await.unwrap();
        store.put("k", b"second").await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), b"second");
    }

    #[tokio::test]
    async fn test_get_missing_key() {
        let temp_dir = TempDir::new().unwrap();
        let store = FsStore::new(temp_dir.path());

        let err = store.get("no/such/key").await.unwrap_err();
        assert!(matches!(err, EtlError::SourceMissing { .. }));
    }

    #[tokio::test]
    async fn test_list_prefix_sorted() {
        let temp_dir = TempDir::new().unwrap();
        let store = FsStore::new(temp_dir.path());

        store.put("weather/TMIN_2016.json", b"[]").await.unwrap();
        store.put("weather/PRCP_2016.json", b"[]").await.unwrap();
        store.put("other/blob.json", b"[]").await.unwrap();

        let keys = store.list("weather/").await.unwrap();
        assert_eq!(keys, vec!["weather/PRCP_2016.json", "weather/TMIN_2016.json"]);
    }

    #[tokio::test]
    async fn test_list_missing_prefix_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let store = FsStore::new(temp_dir.path());

        let keys = store.list("weather/").await.unwrap();
        assert!(keys.is_empty());
    }
}
