use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Retry ledger for blobs the inline best-effort cleanup could not
/// remove. Drained by the background sweep.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "orphan_blob")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Signed read URL of the unreferenced blob, as last persisted.
    #[sea_orm(unique, column_type = "Text")]
    pub url: String,

    pub attempts: i32,
    #[sea_orm(column_type = "Text")]
    pub last_error: Option<String>,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
