//! Filesystem storage backend.

use async_trait::async_trait;
use bytes::Bytes;
use std::path::{Component, Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use super::StorageBackend;
use crate::error::{AppError, Result};

/// Filesystem-based storage rooted at the static directory
pub struct FilesystemStorage {
    base_path: PathBuf,
}

impl FilesystemStorage {
    /// Create new filesystem storage
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    /// Resolve a key such as `en/sitemap.xml` below the base path.
    /// Keys may only contain plain relative segments.
    fn key_to_path(&self, key: &str) -> Result<PathBuf> {
        let relative = Path::new(key);
        let plain = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
        if key.is_empty() || !plain {
            return Err(AppError::Storage(format!("Invalid storage key: {}", key)));
        }
        Ok(self.base_path.join(relative))
    }
}

#[async_trait]
impl StorageBackend for FilesystemStorage {
    async fn put(&self, key: &str, content: Bytes) -> Result<()> {
        let path = self.key_to_path(key)?;

        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        // Write to a sibling temp file and rename so readers never see a partial file
        let tmp = path.with_extension("tmp");
        let mut file = fs::File::create(&tmp).await?;
        file.write_all(&content).await?;
        file.sync_all().await?;
        fs::rename(&tmp, &path).await?;

        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Bytes> {
        let path = self.key_to_path(key)?;
        let content = fs::read(&path)
            .await
            .map_err(|e| AppError::Storage(format!("Failed to read {}: {}", key, e)))?;
        Ok(Bytes::from(content))
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        let path = self.key_to_path(key)?;
        Ok(fs::try_exists(&path).await.unwrap_or(false))
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let path = self.key_to_path(key)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::Storage(format!("Failed to delete {}: {}", key, e))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_get_exists_delete() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FilesystemStorage::new(dir.path());

        assert!(!storage.exists("robots.txt").await.unwrap());
        storage
            .put("robots.txt", Bytes::from_static(b"User-agent: *\n"))
            .await
            .unwrap();
        assert!(storage.exists("robots.txt").await.unwrap());
        assert_eq!(
            storage.get("robots.txt").await.unwrap(),
            Bytes::from_static(b"User-agent: *\n")
        );

        storage.delete("robots.txt").await.unwrap();
        assert!(!storage.exists("robots.txt").await.unwrap());
    }

    #[tokio::test]
    async fn test_nested_key_creates_directories() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FilesystemStorage::new(dir.path());
        storage
            .put("fr/sitemap.xml", Bytes::from_static(b"<urlset/>"))
            .await
            .unwrap();
        assert!(dir.path().join("fr").join("sitemap.xml").exists());
    }

    #[tokio::test]
    async fn test_traversal_keys_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FilesystemStorage::new(dir.path());
        assert!(storage.get("../secret").await.is_err());
        assert!(storage.exists("/etc/passwd").await.is_err());
        assert!(storage.put("", Bytes::new()).await.is_err());
    }

    #[tokio::test]
    async fn test_delete_missing_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FilesystemStorage::new(dir.path());
        storage.delete("fr/rss.xml").await.unwrap();
    }

    #[tokio::test]
    async fn test_get_missing_is_storage_error() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FilesystemStorage::new(dir.path());
        assert!(matches!(
            storage.get("ads.txt").await,
            Err(AppError::Storage(_))
        ));
    }
}
