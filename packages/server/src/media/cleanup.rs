use std::sync::Arc;
use std::time::Duration;

use common::storage::{MediaStore, url::extract_path};
use sea_orm::sea_query::OnConflict;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, QuerySelect, Set};
use tracing::{debug, error, info, warn};

use crate::config::StorageConfig;
use crate::entity::orphan_blob;

/// How many ledger rows one sweep run processes.
const SWEEP_BATCH_SIZE: u64 = 100;

/// Best-effort removal of blobs no longer referenced by any image row.
///
/// Called strictly after the relational commit that dropped the last
/// reference. Never fails the surrounding request: a URL that cannot be
/// decoded or deleted is logged, recorded in the `orphan_blob` ledger and
/// left to the background sweep.
pub async fn cleanup_orphans(db: &DatabaseConnection, store: &dyn MediaStore, urls: &[String]) {
    for url in urls {
        match try_delete(store, url).await {
            Ok(deleted) => {
                debug!(url = %url, deleted, "Cleaned up orphaned blob");
            }
            Err(reason) => {
                warn!(url = %url, reason = %reason, "Orphaned blob cleanup failed, deferring to sweep");
                record_orphan(db, url, &reason).await;
            }
        }
    }
}

/// Decode the URL, check existence and delete.
///
/// Returns `Ok(false)` when the blob was already gone (a retried request
/// may have removed it earlier) — that is success, not an error.
async fn try_delete(store: &dyn MediaStore, url: &str) -> Result<bool, String> {
    let path = extract_path(url)
        .ok_or_else(|| "URL matches no known storage shape".to_string())?;

    match store.exists(&path).await {
        Ok(false) => return Ok(false),
        Ok(true) => {}
        Err(e) => return Err(e.to_string()),
    }

    store.delete(&path).await.map_err(|e| e.to_string())
}

/// Record a failed cleanup in the ledger. Best-effort; a ledger write
/// failure only loses one retry opportunity.
async fn record_orphan(db: &DatabaseConnection, url: &str, reason: &str) {
    let entry = orphan_blob::ActiveModel {
        url: Set(url.to_string()),
        attempts: Set(0),
        last_error: Set(Some(reason.to_string())),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };

    let result = orphan_blob::Entity::insert(entry)
        .on_conflict(
            OnConflict::column(orphan_blob::Column::Url)
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(db)
        .await;

    match result {
        Ok(_) | Err(sea_orm::DbErr::RecordNotInserted) => {}
        Err(e) => debug!(url, error = %e, "Failed to record orphaned blob"),
    }
}

/// Run the orphan-blob sweep as a background task.
pub async fn run_orphan_sweep(
    db: DatabaseConnection,
    store: Arc<dyn MediaStore>,
    config: StorageConfig,
) {
    let scan_interval = Duration::from_secs(config.sweep_interval_secs);

    info!(
        interval_secs = config.sweep_interval_secs,
        max_attempts = config.sweep_max_attempts,
        "Starting orphan blob sweep"
    );

    let mut interval = tokio::time::interval(scan_interval);

    loop {
        interval.tick().await;

        if let Err(e) = sweep_once(&db, &*store, config.sweep_max_attempts).await {
            error!(error = %e, "Orphan blob sweep failed");
        }
    }
}

/// Process one batch of ledger rows: delete resolvable blobs, bump the
/// attempt count on failures, drop rows that can never resolve.
pub async fn sweep_once(
    db: &DatabaseConnection,
    store: &dyn MediaStore,
    max_attempts: i32,
) -> anyhow::Result<()> {
    let entries = orphan_blob::Entity::find()
        .limit(SWEEP_BATCH_SIZE)
        .all(db)
        .await?;

    if entries.is_empty() {
        return Ok(());
    }

    info!(count = entries.len(), "Sweeping orphaned blobs");

    for entry in entries {
        let Some(path) = extract_path(&entry.url) else {
            // Nothing will ever decode this URL; retrying is pointless.
            warn!(url = %entry.url, "Dropping unparseable orphan blob entry");
            orphan_blob::Entity::delete_by_id(entry.id).exec(db).await?;
            continue;
        };

        let outcome = async {
            if store.exists(&path).await? {
                store.delete(&path).await?;
            }
            Ok::<(), common::storage::StorageError>(())
        }
        .await;

        match outcome {
            Ok(()) => {
                debug!(url = %entry.url, "Swept orphaned blob");
                orphan_blob::Entity::delete_by_id(entry.id).exec(db).await?;
            }
            Err(e) => {
                let attempts = entry.attempts + 1;
                if attempts >= max_attempts {
                    warn!(
                        url = %entry.url,
                        attempts,
                        error = %e,
                        "Giving up on orphaned blob after repeated failures"
                    );
                    orphan_blob::Entity::delete_by_id(entry.id).exec(db).await?;
                } else {
                    let mut active: orphan_blob::ActiveModel = entry.into();
                    active.attempts = Set(attempts);
                    active.last_error = Set(Some(e.to_string()));
                    active.update(db).await?;
                }
            }
        }
    }

    Ok(())
}
