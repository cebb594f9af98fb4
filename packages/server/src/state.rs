use std::sync::Arc;

use common::storage::MediaStore;
use sea_orm::DatabaseConnection;

use crate::config::AppConfig;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub config: AppConfig,
    pub media_store: Arc<dyn MediaStore>,
}
