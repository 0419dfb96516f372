// src/storage/fs.rs

//! Filesystem blob store.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};

use super::{BackendKind, BlobStore, WriteReceipt};

/// Writes batches under a fixed root directory, creating partition
/// directories as needed.
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn target(&self) -> String {
        self.root.display().to_string()
    }

    /// Write bytes atomically (write to temp, then rename).
    async fn write_atomic(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let tmp = path.with_extension("tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp, path).await
    }
}

#[async_trait]
impl BlobStore for FileStore {
    async fn put(&self, key: &str, bytes: Vec<u8>) -> Result<WriteReceipt> {
        let path = self.root.join(key);
        Self::write_atomic(&path, &bytes)
            .await
            .map_err(|e| AppError::storage_write(self.target(), e))?;

        log::debug!("Wrote {} bytes to {}", bytes.len(), path.display());

        Ok(WriteReceipt {
            kind: BackendKind::File,
            target: self.target(),
            key: key.to_string(),
            url: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn put_creates_partition_directories() {
        let tmp = TempDir::new().unwrap();
        let store = FileStore::new(tmp.path());

        let key = "scrapes/year=2025/month=03/day=07/abc.json";
        let receipt = store.put(key, b"{}\n".to_vec()).await.unwrap();

        assert_eq!(receipt.kind, BackendKind::File);
        assert_eq!(receipt.key, key);
        assert!(receipt.url.is_none());

        let content = std::fs::read_to_string(tmp.path().join(key)).unwrap();
        assert_eq!(content, "{}\n");
    }

    #[tokio::test]
    async fn put_overwrites_existing_key() {
        let tmp = TempDir::new().unwrap();
        let store = FileStore::new(tmp.path());

        store.put("a/b.json", b"first\n".to_vec()).await.unwrap();
        store.put("a/b.json", b"second\n".to_vec()).await.unwrap();

        let content = std::fs::read_to_string(tmp.path().join("a/b.json")).unwrap();
        assert_eq!(content, "second\n");
    }

    #[tokio::test]
    async fn put_surfaces_backend_failures() {
        let tmp = TempDir::new().unwrap();
        // A file where a directory is needed forces the create to fail
        let blocker = tmp.path().join("blocked");
        std::fs::write(&blocker, b"file").unwrap();

        let store = FileStore::new(tmp.path());
        let err = store
            .put("blocked/partition/x.json", b"{}\n".to_vec())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::StorageWrite { .. }));
    }
}
