use std::time::Duration;

use async_trait::async_trait;
use s3::Bucket;
use s3::creds::Credentials;
use s3::error::S3Error;
use s3::region::Region;

use super::error::StorageError;
use super::traits::{MediaStore, validate_path};

/// Media store backed by an S3-compatible bucket.
///
/// Uses path-style addressing so presigned URLs come out in the canonical
/// `https://<host>/<bucket>/<path>?<signature>` shape the URL codec
/// decodes.
pub struct S3MediaStore {
    bucket: Box<Bucket>,
}

impl S3MediaStore {
    /// Connect to an S3-compatible endpoint.
    pub fn new(
        bucket_name: &str,
        region: &str,
        endpoint: &str,
        access_key: &str,
        secret_key: &str,
    ) -> Result<Self, StorageError> {
        let region = Region::Custom {
            region: region.to_string(),
            endpoint: endpoint.trim_end_matches('/').to_string(),
        };
        let credentials = Credentials::new(Some(access_key), Some(secret_key), None, None, None)
            .map_err(|e| StorageError::Backend(format!("invalid credentials: {e}")))?;

        let bucket = Bucket::new(bucket_name, region, credentials)
            .map_err(backend_err)?
            .with_path_style();

        Ok(Self { bucket })
    }
}

#[async_trait]
impl MediaStore for S3MediaStore {
    async fn upload(
        &self,
        path: &str,
        data: &[u8],
        content_type: &str,
    ) -> Result<(), StorageError> {
        validate_path(path)?;
        let response = self
            .bucket
            .put_object_with_content_type(path, data, content_type)
            .await
            .map_err(backend_err)?;
        if response.status_code() / 100 != 2 {
            return Err(StorageError::Backend(format!(
                "upload of {path} returned status {}",
                response.status_code()
            )));
        }
        Ok(())
    }

    async fn mint_read_url(&self, path: &str, expiry: Duration) -> Result<String, StorageError> {
        validate_path(path)?;
        let expiry_secs = u32::try_from(expiry.as_secs()).unwrap_or(u32::MAX);
        self.bucket
            .presign_get(path, expiry_secs, None)
            .await
            .map_err(backend_err)
    }

    async fn exists(&self, path: &str) -> Result<bool, StorageError> {
        validate_path(path)?;
        match self.bucket.head_object(path).await {
            Ok((_, 404)) => Ok(false),
            Ok(_) => Ok(true),
            Err(S3Error::HttpFailWithBody(404, _)) => Ok(false),
            Err(e) => Err(backend_err(e)),
        }
    }

    async fn delete(&self, path: &str) -> Result<bool, StorageError> {
        validate_path(path)?;
        // S3 DELETE is idempotent and succeeds for missing keys; existence
        // is checked by callers that care via `exists`.
        self.bucket.delete_object(path).await.map_err(backend_err)?;
        Ok(true)
    }
}

fn backend_err(e: S3Error) -> StorageError {
    StorageError::Backend(e.to_string())
}
