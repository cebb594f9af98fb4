use axum::Json;
use axum::extract::{DefaultBodyLimit, Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use sea_orm::prelude::Expr;
use sea_orm::sea_query::{Func, LikeExpr, LockType, Query as SeaQuery};
use sea_orm::*;
use tracing::instrument;

use crate::entity::{
    advertisement, advertisement_archive, advertisement_image, advertisement_species, booking,
    provider, review, saved_advertisement, service, species,
};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::media::cleanup::cleanup_orphans;
use crate::media::sync::{MediaSynchronizer, NewImageUpload};
use crate::models::advertisement::*;
use crate::models::shared::{Pagination, escape_like};
use crate::state::AppState;
use crate::utils::ownership::{authorize_advertisement, find_owned_provider, provider_for_user};

/// Body limit layer for multipart create/update routes (64 MB).
pub fn upload_body_limit() -> DefaultBodyLimit {
    DefaultBodyLimit::max(64 * 1024 * 1024)
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Advertisements",
    operation_id = "createAdvertisement",
    summary = "Create a new advertisement",
    description = "Creates an advertisement for the caller's provider account. Multipart form: \
        `title`, `startDate` and `serviceId` are required; `speciesIds` and `keepImageUrls` are \
        JSON-encoded arrays; `newImages` carries zero or more file parts. At least one image \
        (kept URL or new file) is required. New images are uploaded to blob storage before the \
        relational transaction commits.",
    request_body(content_type = "multipart/form-data", description = "Advertisement fields and image files"),
    responses(
        (status = 201, description = "Advertisement created", body = AdvertisementResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Provider inactive (PROVIDER_INACTIVE)", body = ErrorBody),
        (status = 404, description = "Provider or service not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Duplicate title (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, multipart), fields(user_id = auth_user.user_id))]
pub async fn create_advertisement(
    auth_user: AuthUser,
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let owner = provider_for_user(&state.db, auth_user.user_id).await?;

    let form = parse_advertisement_form(multipart, state.config.storage.max_image_size).await?;
    let input = validate_advertisement_form(&form)?;
    validate_references(&state.db, input.service_id, &input.species_ids).await?;

    // Blob uploads precede the relational transaction: a crash between
    // here and commit leaks a harmless orphan, never a broken listing.
    let synchronizer = MediaSynchronizer::new(
        &*state.media_store,
        std::time::Duration::from_secs(state.config.storage.read_url_expiry_secs),
    );
    let outcome = synchronizer
        .sync(auth_user.user_id, &[], input.keep_image_urls.clone(), &form.new_images)
        .await?;

    let now = chrono::Utc::now();
    let txn = state.db.begin().await?;

    let new_ad = advertisement::ActiveModel {
        title: Set(input.title.clone()),
        description: Set(input.description.clone()),
        price: Set(input.price),
        status: Set(input.status.clone()),
        start_date: Set(input.start_date),
        end_date: Set(input.end_date),
        service_start_time: Set(input.service_start_time),
        service_end_time: Set(input.service_end_time),
        service_id: Set(input.service_id),
        provider_id: Set(owner.id),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    let ad = new_ad.insert(&txn).await.map_err(map_title_conflict)?;

    replace_images(&txn, ad.id, &outcome.final_urls).await?;
    replace_species(&txn, ad.id, &input.species_ids).await?;

    txn.commit().await?;

    let response = build_advertisement_response(&state.db, ad).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Advertisements",
    operation_id = "listAdvertisements",
    summary = "List advertisements",
    description = "Public paginated listing, newest first. Supports case-insensitive title \
        search and filtering by provider.",
    params(
        ("page" = Option<u64>, Query, description = "Page number, 1-based"),
        ("per_page" = Option<u64>, Query, description = "Items per page (max 100)"),
        ("search" = Option<String>, Query, description = "Title substring filter"),
        ("provider_id" = Option<i32>, Query, description = "Only this provider's listings"),
    ),
    responses(
        (status = 200, description = "List of advertisements", body = AdvertisementListResponse),
    ),
)]
#[instrument(skip(state, query))]
pub async fn list_advertisements(
    State(state): State<AppState>,
    Query(query): Query<AdvertisementListQuery>,
) -> Result<Json<AdvertisementListResponse>, AppError> {
    let page = Ord::max(query.page.unwrap_or(1), 1);
    let per_page = query.per_page.unwrap_or(20).clamp(1, 100);

    let mut select = advertisement::Entity::find();

    if let Some(provider_id) = query.provider_id {
        select = select.filter(advertisement::Column::ProviderId.eq(provider_id));
    }

    if let Some(ref search) = query.search {
        let term = escape_like(search.trim());
        if !term.is_empty() {
            select = select.filter(
                Expr::expr(Func::lower(Expr::col(advertisement::Column::Title)))
                    .like(LikeExpr::new(format!("%{}%", term.to_lowercase())).escape('\\')),
            );
        }
    }

    let total = select
        .clone()
        .paginate(&state.db, per_page)
        .num_items()
        .await?;
    let total_pages = total.div_ceil(per_page);

    let ads = select
        .order_by_desc(advertisement::Column::CreatedAt)
        .offset(Some((page - 1) * per_page))
        .limit(Some(per_page))
        .all(&state.db)
        .await?;

    let ad_ids: Vec<i32> = ads.iter().map(|ad| ad.id).collect();
    let cover_images = advertisement_image::Entity::find()
        .filter(advertisement_image::Column::AdvertisementId.is_in(ad_ids))
        .filter(advertisement_image::Column::Position.eq(1))
        .all(&state.db)
        .await?;

    let data = ads
        .into_iter()
        .map(|ad| {
            let first_image_url = cover_images
                .iter()
                .find(|img| img.advertisement_id == ad.id)
                .map(|img| img.url.clone());
            AdvertisementListItem {
                id: ad.id,
                title: ad.title,
                price: ad.price,
                status: ad.status,
                start_date: ad.start_date,
                provider_id: ad.provider_id,
                first_image_url,
                created_at: ad.created_at,
            }
        })
        .collect();

    Ok(Json(AdvertisementListResponse {
        data,
        pagination: Pagination {
            page,
            per_page,
            total,
            total_pages,
        },
    }))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Advertisements",
    operation_id = "getAdvertisement",
    summary = "Get an advertisement by ID",
    description = "Public detail view: scalar fields, ordered image URLs, species ids, \
        provider name and city, and the aggregate review rating.",
    params(("id" = i32, Path, description = "Advertisement ID")),
    responses(
        (status = 200, description = "Advertisement details", body = AdvertisementResponse),
        (status = 404, description = "Advertisement not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(id))]
pub async fn get_advertisement(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<AdvertisementResponse>, AppError> {
    let ad = find_advertisement(&state.db, id).await?;
    let response = build_advertisement_response(&state.db, ad).await?;
    Ok(Json(response))
}

#[utoipa::path(
    put,
    path = "/{id}",
    tag = "Advertisements",
    operation_id = "updateAdvertisement",
    summary = "Replace an advertisement",
    description = "Full-replace edit. Multipart form with the same fields as create; \
        `keepImageUrls` lists the already-persisted URLs to retain, in the desired final \
        order, and `newImages` carries files to append after them. Image and species rows \
        are replaced wholesale inside one transaction; orphaned blobs are removed only \
        after that transaction commits.",
    params(("id" = i32, Path, description = "Advertisement ID")),
    request_body(content_type = "multipart/form-data", description = "Advertisement fields and image files"),
    responses(
        (status = 200, description = "Advertisement updated", body = AdvertisementResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (NOT_OWNER, PROVIDER_INACTIVE)", body = ErrorBody),
        (status = 404, description = "Advertisement or service not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Duplicate title (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, multipart), fields(id, user_id = auth_user.user_id))]
pub async fn update_advertisement(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    multipart: Multipart,
) -> Result<Json<AdvertisementResponse>, AppError> {
    // Authorization gate first: an unauthorized request must trigger no
    // blob upload and no relational write.
    authorize_advertisement(&state.db, auth_user.user_id, id).await?;

    let form = parse_advertisement_form(multipart, state.config.storage.max_image_size).await?;
    let input = validate_advertisement_form(&form)?;
    validate_references(&state.db, input.service_id, &input.species_ids).await?;

    let persisted_urls = persisted_image_urls(&state.db, id).await?;

    let synchronizer = MediaSynchronizer::new(
        &*state.media_store,
        std::time::Duration::from_secs(state.config.storage.read_url_expiry_secs),
    );
    let outcome = synchronizer
        .sync(
            auth_user.user_id,
            &persisted_urls,
            input.keep_image_urls.clone(),
            &form.new_images,
        )
        .await?;

    let txn = state.db.begin().await?;

    let ad = find_advertisement_for_update(&txn, id).await?;

    replace_images(&txn, id, &outcome.final_urls).await?;
    replace_species(&txn, id, &input.species_ids).await?;

    let mut active: advertisement::ActiveModel = ad.into();
    active.title = Set(input.title.clone());
    active.description = Set(input.description.clone());
    active.price = Set(input.price);
    active.status = Set(input.status.clone());
    active.start_date = Set(input.start_date);
    active.end_date = Set(input.end_date);
    active.service_start_time = Set(input.service_start_time);
    active.service_end_time = Set(input.service_end_time);
    active.service_id = Set(input.service_id);
    active.updated_at = Set(chrono::Utc::now());
    let updated = active.update(&txn).await.map_err(map_title_conflict)?;

    txn.commit().await?;

    // Only now is it safe to drop the blobs this edit stopped referencing.
    cleanup_orphans(&state.db, &*state.media_store, &outcome.orphan_urls).await;

    let response = build_advertisement_response(&state.db, updated).await?;
    Ok(Json(response))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Advertisements",
    operation_id = "deleteAdvertisement",
    summary = "Delete an advertisement",
    description = "Archives a point-in-time snapshot (scalar fields plus ordered image URLs), \
        then removes the advertisement with its image rows, species links, bookings with \
        their reviews, and saved references — all in one transaction. Blobs are physically \
        deleted only after the transaction commits.",
    params(("id" = i32, Path, description = "Advertisement ID")),
    responses(
        (status = 204, description = "Advertisement archived and deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (NOT_OWNER, PROVIDER_INACTIVE)", body = ErrorBody),
        (status = 404, description = "Advertisement not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id, user_id = auth_user.user_id))]
pub async fn delete_advertisement(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    authorize_advertisement(&state.db, auth_user.user_id, id).await?;

    let txn = state.db.begin().await?;

    let ad = find_advertisement_for_update(&txn, id).await?;
    let image_urls = persisted_image_urls(&txn, id).await?;

    // The recoverable snapshot is written before anything is destroyed;
    // a crash mid-delete leaves either the live rows or the archive.
    let archive = advertisement_archive::ActiveModel {
        advertisement_id: Set(ad.id),
        title: Set(ad.title.clone()),
        description: Set(ad.description.clone()),
        price: Set(ad.price),
        status: Set(ad.status.clone()),
        start_date: Set(ad.start_date),
        end_date: Set(ad.end_date),
        service_start_time: Set(ad.service_start_time),
        service_end_time: Set(ad.service_end_time),
        service_id: Set(ad.service_id),
        provider_id: Set(ad.provider_id),
        image_urls: Set(serde_json::json!(image_urls)),
        archived_at: Set(chrono::Utc::now()),
        ..Default::default()
    };
    archive.insert(&txn).await?;

    review::Entity::delete_many()
        .filter(
            review::Column::BookingId.in_subquery(
                SeaQuery::select()
                    .column(booking::Column::Id)
                    .from(booking::Entity)
                    .and_where(booking::Column::AdvertisementId.eq(id))
                    .to_owned(),
            ),
        )
        .exec(&txn)
        .await?;
    booking::Entity::delete_many()
        .filter(booking::Column::AdvertisementId.eq(id))
        .exec(&txn)
        .await?;
    saved_advertisement::Entity::delete_many()
        .filter(saved_advertisement::Column::AdvertisementId.eq(id))
        .exec(&txn)
        .await?;
    advertisement_species::Entity::delete_many()
        .filter(advertisement_species::Column::AdvertisementId.eq(id))
        .exec(&txn)
        .await?;
    advertisement_image::Entity::delete_many()
        .filter(advertisement_image::Column::AdvertisementId.eq(id))
        .exec(&txn)
        .await?;
    advertisement::Entity::delete_by_id(id).exec(&txn).await?;

    txn.commit().await?;

    // Physical blob removal strictly after the commit that archived them.
    cleanup_orphans(&state.db, &*state.media_store, &image_urls).await;

    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/{id}/restore",
    tag = "Advertisements",
    operation_id = "restoreAdvertisement",
    summary = "Restore a deleted advertisement from its archive snapshot",
    description = "Re-creates a previously deleted advertisement from its archive record. \
        `{id}` is the identifier the advertisement held while live. The restored listing \
        gets a new identifier; species links are not part of the snapshot and stay empty.",
    params(("id" = i32, Path, description = "Original advertisement ID")),
    responses(
        (status = 201, description = "Advertisement restored", body = AdvertisementResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (NOT_OWNER, PROVIDER_INACTIVE)", body = ErrorBody),
        (status = 404, description = "No archive for this ID (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "A live advertisement already holds this title (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id, user_id = auth_user.user_id))]
pub async fn restore_advertisement(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let archive = advertisement_archive::Entity::find()
        .filter(advertisement_archive::Column::AdvertisementId.eq(id))
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("No archive found for this advertisement".into()))?;

    find_owned_provider(&state.db, auth_user.user_id, archive.provider_id).await?;

    if service::Entity::find_by_id(archive.service_id)
        .one(&state.db)
        .await?
        .is_none()
    {
        return Err(AppError::NotFound("Service not found".into()));
    }

    let image_urls: Vec<String> = serde_json::from_value(archive.image_urls.clone())
        .map_err(|e| AppError::Internal(format!("Corrupt archive image list: {e}")))?;

    let now = chrono::Utc::now();
    let txn = state.db.begin().await?;

    let restored = advertisement::ActiveModel {
        title: Set(archive.title.clone()),
        description: Set(archive.description.clone()),
        price: Set(archive.price),
        status: Set(archive.status.clone()),
        start_date: Set(archive.start_date),
        end_date: Set(archive.end_date),
        service_start_time: Set(archive.service_start_time),
        service_end_time: Set(archive.service_end_time),
        service_id: Set(archive.service_id),
        provider_id: Set(archive.provider_id),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    let ad = restored.insert(&txn).await.map_err(map_title_conflict)?;

    replace_images(&txn, ad.id, &image_urls).await?;

    advertisement_archive::Entity::delete_by_id(archive.id)
        .exec(&txn)
        .await?;

    txn.commit().await?;

    let response = build_advertisement_response(&state.db, ad).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn find_advertisement<C: ConnectionTrait>(
    db: &C,
    id: i32,
) -> Result<advertisement::Model, AppError> {
    advertisement::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Advertisement not found".into()))
}

async fn find_advertisement_for_update(
    txn: &DatabaseTransaction,
    id: i32,
) -> Result<advertisement::Model, AppError> {
    advertisement::Entity::find_by_id(id)
        .lock(LockType::Update)
        .one(txn)
        .await?
        .ok_or_else(|| AppError::NotFound("Advertisement not found".into()))
}

/// Currently persisted image URLs, ordered by position.
async fn persisted_image_urls<C: ConnectionTrait>(
    db: &C,
    advertisement_id: i32,
) -> Result<Vec<String>, AppError> {
    let urls = advertisement_image::Entity::find()
        .filter(advertisement_image::Column::AdvertisementId.eq(advertisement_id))
        .order_by_asc(advertisement_image::Column::Position)
        .select_only()
        .column(advertisement_image::Column::Url)
        .into_tuple::<String>()
        .all(db)
        .await?;
    Ok(urls)
}

/// Replace the full image row set: bulk delete, then insert the final
/// ordered list with positions 1..=n.
async fn replace_images(
    txn: &DatabaseTransaction,
    advertisement_id: i32,
    urls: &[String],
) -> Result<(), AppError> {
    advertisement_image::Entity::delete_many()
        .filter(advertisement_image::Column::AdvertisementId.eq(advertisement_id))
        .exec(txn)
        .await?;

    let rows: Vec<advertisement_image::ActiveModel> = urls
        .iter()
        .enumerate()
        .map(|(i, url)| advertisement_image::ActiveModel {
            advertisement_id: Set(advertisement_id),
            url: Set(url.clone()),
            position: Set(i as i32 + 1),
            ..Default::default()
        })
        .collect();

    advertisement_image::Entity::insert_many(rows)
        .exec(txn)
        .await?;

    Ok(())
}

/// Replace the species association set: bulk delete, then insert the
/// target set. An empty set simply clears the associations.
async fn replace_species(
    txn: &DatabaseTransaction,
    advertisement_id: i32,
    species_ids: &[i32],
) -> Result<(), AppError> {
    advertisement_species::Entity::delete_many()
        .filter(advertisement_species::Column::AdvertisementId.eq(advertisement_id))
        .exec(txn)
        .await?;

    if species_ids.is_empty() {
        return Ok(());
    }

    let rows: Vec<advertisement_species::ActiveModel> = species_ids
        .iter()
        .map(|&species_id| advertisement_species::ActiveModel {
            advertisement_id: Set(advertisement_id),
            species_id: Set(species_id),
        })
        .collect();

    advertisement_species::Entity::insert_many(rows)
        .exec_without_returning(txn)
        .await?;

    Ok(())
}

/// Referential checks that must pass before any mutation: the service
/// must exist, and every requested species id must match a row (checked
/// as a set-cardinality comparison).
async fn validate_references<C: ConnectionTrait>(
    db: &C,
    service_id: i32,
    species_ids: &[i32],
) -> Result<(), AppError> {
    if service::Entity::find_by_id(service_id).one(db).await?.is_none() {
        return Err(AppError::NotFound("Service not found".into()));
    }

    if !species_ids.is_empty() {
        let matching = species::Entity::find()
            .filter(species::Column::Id.is_in(species_ids.iter().copied()))
            .count(db)
            .await?;
        if matching != species_ids.len() as u64 {
            return Err(AppError::Validation(
                "One or more species ids do not exist".into(),
            ));
        }
    }

    Ok(())
}

/// Mean review rating across the advertisement's bookings.
async fn aggregate_rating<C: ConnectionTrait>(
    db: &C,
    advertisement_id: i32,
) -> Result<Option<f64>, AppError> {
    let ratings: Vec<i32> = review::Entity::find()
        .filter(
            review::Column::BookingId.in_subquery(
                SeaQuery::select()
                    .column(booking::Column::Id)
                    .from(booking::Entity)
                    .and_where(booking::Column::AdvertisementId.eq(advertisement_id))
                    .to_owned(),
            ),
        )
        .select_only()
        .column(review::Column::Rating)
        .into_tuple::<i32>()
        .all(db)
        .await?;

    if ratings.is_empty() {
        return Ok(None);
    }
    Ok(Some(
        ratings.iter().map(|&r| f64::from(r)).sum::<f64>() / ratings.len() as f64,
    ))
}

/// Assemble the public detail view for an advertisement model.
async fn build_advertisement_response(
    db: &DatabaseConnection,
    ad: advertisement::Model,
) -> Result<AdvertisementResponse, AppError> {
    let images = advertisement_image::Entity::find()
        .filter(advertisement_image::Column::AdvertisementId.eq(ad.id))
        .order_by_asc(advertisement_image::Column::Position)
        .all(db)
        .await?
        .into_iter()
        .map(|img| ImageView {
            url: img.url,
            position: img.position,
        })
        .collect();

    let species_ids: Vec<i32> = advertisement_species::Entity::find()
        .filter(advertisement_species::Column::AdvertisementId.eq(ad.id))
        .select_only()
        .column(advertisement_species::Column::SpeciesId)
        .into_tuple::<i32>()
        .all(db)
        .await?;

    let owner = provider::Entity::find_by_id(ad.provider_id)
        .one(db)
        .await?
        .ok_or_else(|| {
            AppError::Internal(format!("Provider {} missing for advertisement", ad.provider_id))
        })?;

    let rating = aggregate_rating(db, ad.id).await?;

    Ok(AdvertisementResponse {
        id: ad.id,
        title: ad.title,
        description: ad.description,
        price: ad.price,
        status: ad.status,
        start_date: ad.start_date,
        end_date: ad.end_date,
        service_start_time: ad.service_start_time,
        service_end_time: ad.service_end_time,
        service_id: ad.service_id,
        provider_id: ad.provider_id,
        provider_name: owner.name,
        provider_city: owner.city,
        species_ids,
        images,
        rating,
        created_at: ad.created_at,
        updated_at: ad.updated_at,
    })
}

/// Surface a unique-constraint violation on the title as 409.
fn map_title_conflict(e: DbErr) -> AppError {
    match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            AppError::Conflict("An advertisement with this title already exists".into())
        }
        _ => AppError::from(e),
    }
}

/// Drain the multipart stream into an [`AdvertisementForm`].
///
/// Unknown fields are ignored; `newImages` parts are size-checked as they
/// are read.
async fn parse_advertisement_form(
    mut multipart: Multipart,
    max_image_size: u64,
) -> Result<AdvertisementForm, AppError> {
    let mut form = AdvertisementForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Multipart error: {e}")))?
    {
        match field.name() {
            Some("newImages") => {
                let filename = field
                    .file_name()
                    .map(|s| s.to_string())
                    .ok_or_else(|| {
                        AppError::Validation("newImages parts must have a filename".into())
                    })?;
                let content_type = field.content_type().map(|ct| ct.to_string());
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("Failed to read {filename}: {e}")))?;
                if bytes.len() as u64 > max_image_size {
                    return Err(AppError::Validation(format!(
                        "Image {filename} exceeds maximum size of {max_image_size} bytes"
                    )));
                }
                form.new_images.push(NewImageUpload {
                    filename,
                    content_type,
                    bytes: bytes.to_vec(),
                });
            }
            Some(name) => {
                let name = name.to_string();
                let text = field.text().await.map_err(|e| {
                    AppError::Validation(format!("Failed to read field {name}: {e}"))
                })?;
                match name.as_str() {
                    "title" => form.title = Some(text),
                    "description" => form.description = Some(text),
                    "price" => form.price = Some(text),
                    "status" => form.status = Some(text),
                    "startDate" => form.start_date = Some(text),
                    "endDate" => form.end_date = Some(text),
                    "serviceStartTime" => form.service_start_time = Some(text),
                    "serviceEndTime" => form.service_end_time = Some(text),
                    "serviceId" => form.service_id = Some(text),
                    "speciesIds" => form.species_ids = Some(text),
                    "keepImageUrls" => form.keep_image_urls = Some(text),
                    _ => {} // Ignore unknown fields.
                }
            }
            None => {}
        }
    }

    Ok(form)
}
