use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter};

use crate::entity::{advertisement, provider};
use crate::error::AppError;

/// The authorization gate for mutating operations.
///
/// Resolves the advertisement and its owning provider and checks, in
/// order: the advertisement exists, the caller controls the provider, and
/// the provider account is active. Read-only — must be evaluated before
/// any blob or relational side effect.
pub async fn authorize_advertisement<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
    advertisement_id: i32,
) -> Result<(advertisement::Model, provider::Model), AppError> {
    let ad = advertisement::Entity::find_by_id(advertisement_id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Advertisement not found".into()))?;

    let owner = find_owned_provider(db, user_id, ad.provider_id).await?;

    Ok((ad, owner))
}

/// Check that `provider_id` exists, belongs to `user_id` and is active.
///
/// Shared by the mutation paths that start from a provider reference
/// rather than a live advertisement (create, restore).
pub async fn find_owned_provider<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
    provider_id: i32,
) -> Result<provider::Model, AppError> {
    let owner = provider::Entity::find_by_id(provider_id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Provider not found".into()))?;

    if owner.user_id != user_id {
        return Err(AppError::NotOwner);
    }

    if !owner.is_active {
        return Err(AppError::ProviderInactive);
    }

    Ok(owner)
}

/// Resolve the caller's own (active) provider account.
///
/// Used by operations that create resources, where no advertisement
/// exists yet to anchor the ownership check.
pub async fn provider_for_user<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
) -> Result<provider::Model, AppError> {
    let owner = provider::Entity::find()
        .filter(provider::Column::UserId.eq(user_id))
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("No provider account for this user".into()))?;

    if !owner.is_active {
        return Err(AppError::ProviderInactive);
    }

    Ok(owner)
}
