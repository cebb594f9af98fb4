use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Point-in-time snapshot of a deleted advertisement.
///
/// Written in the same transaction that removes the live rows, consumed
/// by restore. Image URLs are carried as an ordered JSON array of opaque
/// strings, not foreign-key rows; service and provider are plain id
/// references so the snapshot's lifetime is independent of the live
/// tables.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "advertisement_archive")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Identifier the advertisement held while live.
    #[sea_orm(unique)]
    pub advertisement_id: i32,

    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub description: Option<String>,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub price: Option<Decimal>,
    pub status: String,
    pub start_date: Date,
    pub end_date: Option<Date>,
    pub service_start_time: Option<Time>,
    pub service_end_time: Option<Time>,

    pub service_id: i32,
    pub provider_id: i32,

    /// Ordered array of signed read URLs, position 1 first.
    pub image_urls: Json,

    pub archived_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
