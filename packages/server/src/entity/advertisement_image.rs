use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "advertisement_image")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub advertisement_id: i32,
    #[sea_orm(belongs_to, from = "advertisement_id", to = "id")]
    pub advertisement: HasOne<super::advertisement::Entity>,

    /// Signed read URL into the blob store.
    #[sea_orm(column_type = "Text")]
    pub url: String,

    /// 1-based, contiguous and unique within an advertisement. The whole
    /// image set is replaced on every edit, never patched in place.
    pub position: i32,
}

impl ActiveModelBehavior for ActiveModel {}
