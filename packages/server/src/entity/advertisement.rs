use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Listing is visible and bookable.
pub const STATUS_ACTIVE: &str = "ACTIVE";
/// Listing is hidden from search but still owned and editable.
pub const STATUS_INACTIVE: &str = "INACTIVE";

/// All statuses a listing may hold.
pub const STATUSES: &[&str] = &[STATUS_ACTIVE, STATUS_INACTIVE];

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "advertisement")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique)]
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub description: Option<String>,

    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub price: Option<Decimal>,

    /// One of [`STATUSES`].
    pub status: String,

    pub start_date: Date,
    pub end_date: Option<Date>,

    pub service_start_time: Option<Time>,
    pub service_end_time: Option<Time>,

    pub service_id: i32,
    #[sea_orm(belongs_to, from = "service_id", to = "id")]
    pub service: HasOne<super::service::Entity>,

    pub provider_id: i32,
    #[sea_orm(belongs_to, from = "provider_id", to = "id")]
    pub provider: HasOne<super::provider::Entity>,

    #[sea_orm(has_many)]
    pub images: HasMany<super::advertisement_image::Entity>,

    #[sea_orm(has_many, via = "advertisement_species")]
    pub species: HasMany<super::species::Entity>,

    #[sea_orm(has_many)]
    pub bookings: HasMany<super::booking::Entity>,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
