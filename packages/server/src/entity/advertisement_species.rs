use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "advertisement_species")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub advertisement_id: i32,
    #[sea_orm(primary_key)]
    pub species_id: i32,

    #[sea_orm(belongs_to, from = "advertisement_id", to = "id")]
    pub advertisement: HasOne<super::advertisement::Entity>,
    #[sea_orm(belongs_to, from = "species_id", to = "id")]
    pub species: HasOne<super::species::Entity>,
}

impl ActiveModelBehavior for ActiveModel {}
