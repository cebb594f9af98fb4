use std::path::PathBuf;
use std::sync::Arc;

use common::storage::filesystem::FilesystemMediaStore;
use common::storage::s3::S3MediaStore;
use common::storage::MediaStore;
use tracing::{Level, info};

use server::config::{AppConfig, StorageConfig};
use server::media::cleanup::run_orphan_sweep;
use server::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    let config = AppConfig::load()?;

    let db = server::database::init_db(&config.database.url).await?;
    server::seed::seed_catalog(&db).await?;

    let media_store = build_media_store(&config.storage).await?;

    tokio::spawn(run_orphan_sweep(
        db.clone(),
        media_store.clone(),
        config.storage.clone(),
    ));

    let addr = format!("{}:{}", config.server.host, config.server.port);

    let state = AppState {
        db,
        config,
        media_store,
    };
    let app = server::build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Server running at http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

async fn build_media_store(config: &StorageConfig) -> anyhow::Result<Arc<dyn MediaStore>> {
    match config.backend.as_str() {
        "s3" => Ok(Arc::new(S3MediaStore::new(
            &config.bucket,
            &config.region,
            &config.endpoint,
            &config.access_key,
            &config.secret_key,
        )?)),
        "filesystem" => Ok(Arc::new(
            FilesystemMediaStore::new(
                PathBuf::from(&config.root),
                config.base_url.clone(),
                config.bucket.clone(),
                config.max_image_size,
            )
            .await?,
        )),
        other => anyhow::bail!("Unknown storage backend: {other}"),
    }
}
