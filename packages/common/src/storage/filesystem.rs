use std::path::PathBuf;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use tokio::fs;

use super::error::StorageError;
use super::traits::{MediaStore, validate_path};
use super::url::percent_encode_path;

/// Filesystem-backed media store for development and tests.
///
/// Objects live under `{root}/{path}`; minted read URLs use the canonical
/// query-signed shape so they round-trip through
/// [`super::url::extract_path`] exactly like production URLs.
pub struct FilesystemMediaStore {
    root: PathBuf,
    base_url: String,
    bucket: String,
    max_size: u64,
}

impl FilesystemMediaStore {
    /// Create a new filesystem media store rooted at `root`.
    pub async fn new(
        root: PathBuf,
        base_url: String,
        bucket: String,
        max_size: u64,
    ) -> Result<Self, StorageError> {
        fs::create_dir_all(&root).await?;
        fs::create_dir_all(root.join(".tmp")).await?;
        Ok(Self {
            root,
            base_url: base_url.trim_end_matches('/').to_string(),
            bucket,
            max_size,
        })
    }

    fn object_path(&self, path: &str) -> PathBuf {
        self.root.join(path)
    }

    /// Path for a temporary file during writes.
    fn temp_path(&self) -> PathBuf {
        self.root.join(".tmp").join(uuid::Uuid::new_v4().to_string())
    }
}

#[async_trait]
impl MediaStore for FilesystemMediaStore {
    async fn upload(
        &self,
        path: &str,
        data: &[u8],
        _content_type: &str,
    ) -> Result<(), StorageError> {
        validate_path(path)?;

        if data.len() as u64 > self.max_size {
            return Err(StorageError::SizeLimitExceeded {
                actual: data.len() as u64,
                limit: self.max_size,
            });
        }

        let object_path = self.object_path(path);
        if let Some(parent) = object_path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let temp_path = self.temp_path();
        if let Err(e) = fs::write(&temp_path, data).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        if let Err(e) = fs::rename(&temp_path, &object_path).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        Ok(())
    }

    async fn mint_read_url(&self, path: &str, expiry: Duration) -> Result<String, StorageError> {
        validate_path(path)?;

        let expires = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0)
            + expiry.as_secs();

        let mut hasher = Sha256::new();
        hasher.update(path.as_bytes());
        hasher.update(b":");
        hasher.update(expires.to_string().as_bytes());
        let signature = hex::encode(hasher.finalize());

        Ok(format!(
            "{}/{}/{}?expires={}&signature={}",
            self.base_url,
            self.bucket,
            percent_encode_path(path),
            expires,
            signature
        ))
    }

    async fn exists(&self, path: &str) -> Result<bool, StorageError> {
        validate_path(path)?;
        Ok(fs::try_exists(self.object_path(path)).await?)
    }

    async fn delete(&self, path: &str) -> Result<bool, StorageError> {
        validate_path(path)?;
        match fs::remove_file(self.object_path(path)).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}
