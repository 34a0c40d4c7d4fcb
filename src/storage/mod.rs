use rand::distributions::Alphanumeric;
use rand::Rng;
use std::path::{Path, PathBuf};
use thiserror::Error;
use uuid::Uuid;

use crate::config;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Only image files can be uploaded: {0}")]
    NotAnImage(String),

    #[error("File exceeds upload limit of {limit} bytes")]
    TooLarge { limit: usize },

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Result of a successful upload
#[derive(Debug, Clone, serde::Serialize)]
pub struct StoredImage {
    /// Key within the store: `{user_id}/{millis}-{random}.{ext}`
    pub key: String,
    pub public_url: String,
}

/// Local-disk object store for post images, replacing the hosted
/// storage bucket. Keys stay compatible with the bucket layout:
/// one directory per user, timestamped random filenames.
#[derive(Debug, Clone)]
pub struct ImageStore {
    root: PathBuf,
}

impl ImageStore {
    pub fn from_config() -> Self {
        Self {
            root: PathBuf::from(&config::config().storage.root_dir),
        }
    }

    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Validate, key, and persist an uploaded image. The write goes through a
    /// temp file and rename so a crashed upload never leaves a partial object.
    pub async fn store(
        &self,
        user_id: Uuid,
        original_filename: &str,
        bytes: &[u8],
    ) -> Result<StoredImage, StorageError> {
        let storage_config = &config::config().storage;

        let ext = image_extension(original_filename, &storage_config.allowed_extensions)?;

        if bytes.len() > storage_config.max_upload_bytes {
            return Err(StorageError::TooLarge {
                limit: storage_config.max_upload_bytes,
            });
        }

        let key = generate_key(user_id, &ext);
        let path = self.resolve(&key)?;

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let tmp_path = path.with_extension(format!("{}.tmp", ext));
        tokio::fs::write(&tmp_path, bytes).await?;
        tokio::fs::rename(&tmp_path, &path).await?;

        tracing::info!(key = %key, size = bytes.len(), "Stored post image");

        Ok(StoredImage {
            public_url: self.public_url(&key),
            key,
        })
    }

    /// Best-effort delete; a missing object is not an error.
    pub async fn delete(&self, key: &str) -> Result<(), StorageError> {
        let path = self.resolve(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                tracing::info!(key = %key, "Deleted post image");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    pub fn public_url(&self, key: &str) -> String {
        format!("{}/media/{}", config::config().server.public_base_url, key)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Extract the storage key from a public URL produced by this store.
    pub fn key_from_public_url(url: &str) -> Option<&str> {
        url.split_once("/media/").map(|(_, key)| key)
    }

    /// Join a key under the root, rejecting traversal components.
    fn resolve(&self, key: &str) -> Result<PathBuf, StorageError> {
        if key.is_empty()
            || key.starts_with('/')
            || key.split('/').any(|part| part.is_empty() || part == "." || part == "..")
        {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.root.join(key))
    }
}

fn generate_key(user_id: Uuid, ext: &str) -> String {
    let millis = chrono::Utc::now().timestamp_millis();
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(8)
        .map(char::from)
        .collect();
    format!("{}/{}-{}.{}", user_id, millis, suffix.to_lowercase(), ext)
}

fn image_extension(filename: &str, allowed: &[String]) -> Result<String, StorageError> {
    let ext = filename
        .rsplit('.')
        .next()
        .filter(|e| *e != filename)
        .map(|e| e.to_ascii_lowercase())
        .ok_or_else(|| StorageError::NotAnImage(filename.to_string()))?;

    if allowed.iter().any(|a| *a == ext) {
        Ok(ext)
    } else {
        Err(StorageError::NotAnImage(filename.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn allowed() -> Vec<String> {
        vec!["jpg".to_string(), "png".to_string(), "webp".to_string()]
    }

    #[test]
    fn extension_extraction() {
        assert_eq!(image_extension("photo.JPG", &allowed()).unwrap(), "jpg");
        assert_eq!(image_extension("a.b.png", &allowed()).unwrap(), "png");
        assert!(image_extension("malware.exe", &allowed()).is_err());
        assert!(image_extension("noextension", &allowed()).is_err());
    }

    #[test]
    fn keys_are_scoped_to_user_and_unique() {
        let user = Uuid::new_v4();
        let a = generate_key(user, "jpg");
        let b = generate_key(user, "jpg");
        assert!(a.starts_with(&format!("{}/", user)));
        assert!(a.ends_with(".jpg"));
        assert_ne!(a, b);
    }

    #[test]
    fn resolve_rejects_traversal() {
        let store = ImageStore::new("/tmp/gardrop-test");
        assert!(store.resolve("../../etc/passwd").is_err());
        assert!(store.resolve("/abs/path.jpg").is_err());
        assert!(store.resolve("a//b.jpg").is_err());
        assert!(store.resolve("user/file.jpg").is_ok());
    }

    #[test]
    fn key_from_public_url_inverts_public_url() {
        let store = ImageStore::new("/tmp/gardrop-test");
        let url = store.public_url("u1/123-abc.jpg");
        assert_eq!(ImageStore::key_from_public_url(&url), Some("u1/123-abc.jpg"));
        assert_eq!(ImageStore::key_from_public_url("https://cdn.example.com/x.jpg"), None);
    }

    #[tokio::test]
    async fn store_and_delete_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = ImageStore::new(dir.path());
        let user = Uuid::new_v4();

        let stored = store.store(user, "fit.png", b"not-really-a-png").await.unwrap();
        let on_disk = store.root().join(&stored.key);
        assert!(on_disk.exists());

        store.delete(&stored.key).await.unwrap();
        assert!(!on_disk.exists());

        // Deleting again is fine
        store.delete(&stored.key).await.unwrap();
    }

    #[tokio::test]
    async fn store_rejects_oversize_payload() {
        let dir = tempfile::tempdir().unwrap();
        let store = ImageStore::new(dir.path());
        let limit = crate::config::config().storage.max_upload_bytes;

        let oversize = vec![0u8; limit + 1];
        let err = store.store(Uuid::new_v4(), "big.jpg", &oversize).await.unwrap_err();
        assert!(matches!(err, StorageError::TooLarge { .. }));
    }
}
