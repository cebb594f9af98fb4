use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "review")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub booking_id: i32,
    #[sea_orm(belongs_to, from = "booking_id", to = "id")]
    pub booking: HasOne<super::booking::Entity>,

    /// 1 to 5 stars.
    pub rating: i32,
    #[sea_orm(column_type = "Text")]
    pub comment: Option<String>,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
