use std::time::Duration;

use async_trait::async_trait;

use super::error::StorageError;

/// Path-addressed media storage.
///
/// Paths are opaque slash-separated keys chosen by the caller; the store
/// never derives them. Read access goes through signed URLs minted by
/// [`MediaStore::mint_read_url`] — the minted URL must embed the path
/// recoverably (see [`super::url::extract_path`]).
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Store bytes under the given path with the declared content type.
    ///
    /// Overwrites any existing object at the same path.
    async fn upload(
        &self,
        path: &str,
        data: &[u8],
        content_type: &str,
    ) -> Result<(), StorageError>;

    /// Mint a signed, time-limited read URL for an object.
    async fn mint_read_url(&self, path: &str, expiry: Duration) -> Result<String, StorageError>;

    /// Check whether an object exists.
    async fn exists(&self, path: &str) -> Result<bool, StorageError>;

    /// Delete an object.
    ///
    /// Returns `true` if the object was deleted, `false` if it did not
    /// exist. Deleting a missing object is not an error.
    async fn delete(&self, path: &str) -> Result<bool, StorageError>;
}

/// Reject empty paths and traversal components before they reach a backend.
pub(crate) fn validate_path(path: &str) -> Result<(), StorageError> {
    if path.is_empty() {
        return Err(StorageError::InvalidPath("path is empty".into()));
    }
    if path.starts_with('/') {
        return Err(StorageError::InvalidPath(
            "path must not start with '/'".into(),
        ));
    }
    if path.split('/').any(|seg| seg == ".." || seg.is_empty()) {
        return Err(StorageError::InvalidPath(format!(
            "path contains empty or traversal segment: {path}"
        )));
    }
    Ok(())
}
