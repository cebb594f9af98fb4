use sea_orm::sea_query::OnConflict;
use sea_orm::*;
use tracing::info;

use crate::entity::{service, species};

/// Service categories seeded on startup.
const DEFAULT_SERVICES: &[&str] = &[
    "Dog Walking",
    "Pet Sitting",
    "Grooming",
    "Veterinary Visit",
    "Training",
];

/// Species seeded on startup.
const DEFAULT_SPECIES: &[&str] = &["Dog", "Cat", "Bird", "Rabbit", "Reptile"];

/// Seed the `service` and `species` catalog tables with defaults.
pub async fn seed_catalog(db: &DatabaseConnection) -> Result<(), DbErr> {
    let mut services_inserted = 0u32;
    for &name in DEFAULT_SERVICES {
        let model = service::ActiveModel {
            name: Set(name.to_string()),
            ..Default::default()
        };

        let result = service::Entity::insert(model)
            .on_conflict(
                OnConflict::column(service::Column::Name)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(db)
            .await;

        match result {
            Ok(_) => services_inserted += 1,
            Err(DbErr::RecordNotInserted) => {}
            Err(e) => return Err(e),
        }
    }

    let mut species_inserted = 0u32;
    for &name in DEFAULT_SPECIES {
        let model = species::ActiveModel {
            name: Set(name.to_string()),
            ..Default::default()
        };

        let result = species::Entity::insert(model)
            .on_conflict(
                OnConflict::column(species::Column::Name)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(db)
            .await;

        match result {
            Ok(_) => species_inserted += 1,
            Err(DbErr::RecordNotInserted) => {}
            Err(e) => return Err(e),
        }
    }

    info!(
        services = services_inserted,
        species = species_inserted,
        "Seeded catalog tables"
    );

    Ok(())
}
