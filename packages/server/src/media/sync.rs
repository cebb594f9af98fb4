use std::collections::HashSet;
use std::time::Duration;

use common::storage::MediaStore;

use crate::error::AppError;
use crate::utils::filename::validate_flat_filename;

/// A freshly uploaded image taken from a multipart `newImages` part.
pub struct NewImageUpload {
    pub filename: String,
    /// Content type declared by the client, if any; `mime_guess` from the
    /// filename otherwise.
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// The computed difference between the persisted image set and the
/// caller's desired final state.
#[derive(Debug, PartialEq, Eq)]
pub struct MediaPlan {
    /// Persisted URLs the caller no longer keeps, in persisted order.
    pub orphan_urls: Vec<String>,
}

/// Compute which persisted blobs become orphans when `keep` is the new
/// set of retained URLs. Matching is by exact URL string.
pub fn plan(persisted: &[String], keep: &[String]) -> MediaPlan {
    let kept: HashSet<&str> = keep.iter().map(String::as_str).collect();
    let orphan_urls = persisted
        .iter()
        .filter(|url| !kept.contains(url.as_str()))
        .cloned()
        .collect();
    MediaPlan { orphan_urls }
}

/// Result of a successful media synchronization.
pub struct SyncOutcome {
    /// Final ordered URL list: kept URLs in caller order, then newly
    /// uploaded URLs in upload order. Positions are assigned 1..=n over
    /// this list by the transaction coordinator.
    pub final_urls: Vec<String>,
    /// Orphaned URLs to delete once the relational commit that stops
    /// referencing them has succeeded.
    pub orphan_urls: Vec<String>,
}

/// Resolves the desired final photo state against the blob store.
///
/// Uploads happen here, before any relational write, so an upload failure
/// aborts the whole operation with no relational state changed. Deletions
/// are only *computed* here; executing them is deferred to after the
/// relational commit (see [`super::cleanup`]) so a failed commit can
/// never roll a listing back onto a blob that no longer exists.
pub struct MediaSynchronizer<'a> {
    store: &'a dyn MediaStore,
    read_url_expiry: Duration,
}

impl<'a> MediaSynchronizer<'a> {
    pub fn new(store: &'a dyn MediaStore, read_url_expiry: Duration) -> Self {
        Self {
            store,
            read_url_expiry,
        }
    }

    /// Upload `new_images` and produce the final ordered URL list.
    ///
    /// `uploader_id` namespaces the storage paths; together with the
    /// upload timestamp and the original filename it keeps paths
    /// collision-free and auditable.
    pub async fn sync(
        &self,
        uploader_id: i32,
        persisted_urls: &[String],
        keep_urls: Vec<String>,
        new_images: &[NewImageUpload],
    ) -> Result<SyncOutcome, AppError> {
        if keep_urls.len() + new_images.len() == 0 {
            return Err(AppError::Validation("At least one image is required".into()));
        }

        let media_plan = plan(persisted_urls, &keep_urls);

        let mut final_urls = keep_urls;
        for image in new_images {
            let filename = validate_flat_filename(&image.filename)
                .map_err(|e| AppError::Validation(e.message().into()))?;

            let content_type = match &image.content_type {
                Some(ct) => ct.clone(),
                None => mime_guess::from_path(filename)
                    .first()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| "application/octet-stream".to_string()),
            };

            let path = format!(
                "advertisements/{}/{}-{}",
                uploader_id,
                chrono::Utc::now().timestamp_millis(),
                filename
            );

            self.store
                .upload(&path, &image.bytes, &content_type)
                .await?;
            let url = self.store.mint_read_url(&path, self.read_url_expiry).await?;

            tracing::debug!(path = %path, content_type = %content_type, "Uploaded advertisement image");
            final_urls.push(url);
        }

        Ok(SyncOutcome {
            final_urls,
            orphan_urls: media_plan.orphan_urls,
        })
    }
}
