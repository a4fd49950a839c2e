//! Upload file store
//!
//! Persists uploaded bytes under a generated, collision-free name that
//! preserves the original extension (the extension later selects the
//! extractor).

use std::path::{Path, PathBuf};

use tracing::debug;
use uuid::Uuid;

use crate::domain::DomainError;

/// A file persisted by the store
#[derive(Debug, Clone)]
pub struct StoredFile {
    /// Generated storage key: `{uuid}{extension}`
    pub stored_name: String,
    /// Absolute or root-relative path of the stored file
    pub path: PathBuf,
}

/// Content-addressable-by-random-id file store for uploads
#[derive(Debug, Clone)]
pub struct UploadStore {
    root: PathBuf,
}

impl UploadStore {
    /// Create a store rooted at `root`, creating the directory if needed
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, DomainError> {
        let root = root.into();
        std::fs::create_dir_all(&root)
            .map_err(|e| DomainError::storage(format!("Failed to create upload dir: {}", e)))?;
        Ok(Self { root })
    }

    /// Root directory of the store
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Persist uploaded bytes under a fresh uuid-based name.
    ///
    /// The original filename contributes only its extension; everything
    /// else about the storage key is random, so concurrent uploads of the
    /// same filename never collide.
    pub async fn save(&self, original_name: &str, bytes: &[u8]) -> Result<StoredFile, DomainError> {
        let extension = Path::new(original_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| format!(".{}", e.to_ascii_lowercase()))
            .unwrap_or_default();

        let stored_name = format!("{}{}", Uuid::new_v4(), extension);
        let path = self.root.join(&stored_name);

        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| DomainError::storage(format!("Could not save file: {}", e)))?;

        debug!(original_name, stored_name, "Stored uploaded file");

        Ok(StoredFile { stored_name, path })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_save_preserves_extension() {
        let dir = tempfile::tempdir().unwrap();
        let store = UploadStore::new(dir.path()).unwrap();

        let stored = store.save("Report Final.PDF", b"content").await.unwrap();
        assert!(stored.stored_name.ends_with(".pdf"));
        assert!(!stored.stored_name.contains("Report"));
        assert_eq!(std::fs::read(&stored.path).unwrap(), b"content");
    }

    #[tokio::test]
    async fn test_save_without_extension() {
        let dir = tempfile::tempdir().unwrap();
        let store = UploadStore::new(dir.path()).unwrap();

        let stored = store.save("README", b"x").await.unwrap();
        assert!(!stored.stored_name.contains('.'));
    }

    #[tokio::test]
    async fn test_same_name_never_collides() {
        let dir = tempfile::tempdir().unwrap();
        let store = UploadStore::new(dir.path()).unwrap();

        let first = store.save("notes.txt", b"one").await.unwrap();
        let second = store.save("notes.txt", b"two").await.unwrap();

        assert_ne!(first.stored_name, second.stored_name);
        assert_eq!(std::fs::read(&first.path).unwrap(), b"one");
        assert_eq!(std::fs::read(&second.path).unwrap(), b"two");
    }

    #[tokio::test]
    async fn test_new_creates_root() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a/b/uploads");
        let store = UploadStore::new(&nested).unwrap();
        assert!(store.root().is_dir());
    }
}
