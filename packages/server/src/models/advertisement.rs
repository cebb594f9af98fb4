use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::entity::advertisement;
use crate::error::AppError;
use crate::media::sync::NewImageUpload;
use crate::models::shared::{Pagination, validate_title};

/// Raw multipart form fields of a create/update request, as received.
///
/// Text fields arrive as strings; `species_ids` and `keep_image_urls` are
/// JSON-encoded arrays. Everything is validated and parsed into an
/// [`AdvertisementInput`] before any side effect happens.
#[derive(Default)]
pub struct AdvertisementForm {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<String>,
    pub status: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub service_start_time: Option<String>,
    pub service_end_time: Option<String>,
    pub service_id: Option<String>,
    pub species_ids: Option<String>,
    pub keep_image_urls: Option<String>,
    pub new_images: Vec<NewImageUpload>,
}

/// Fully validated field values for a create or full-replace update.
#[derive(Debug)]
pub struct AdvertisementInput {
    pub title: String,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub status: String,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub service_start_time: Option<NaiveTime>,
    pub service_end_time: Option<NaiveTime>,
    pub service_id: i32,
    pub species_ids: Vec<i32>,
    pub keep_image_urls: Vec<String>,
}

/// Validate and parse a raw form. Runs before any blob upload or
/// relational write; a failure here must leave no side effects behind.
pub fn validate_advertisement_form(form: &AdvertisementForm) -> Result<AdvertisementInput, AppError> {
    let title = form
        .title
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::Validation("Title is required".into()))?;
    validate_title(title)?;

    let description = form
        .description
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(str::to_string);
    if let Some(ref d) = description
        && d.chars().count() > 4000
    {
        return Err(AppError::Validation(
            "Description must be at most 4000 characters".into(),
        ));
    }

    let price = match form.price.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(raw) => {
            let value: Decimal = raw.parse().map_err(|_| {
                AppError::Validation("Price must be a non-negative number".into())
            })?;
            if value < Decimal::ZERO {
                return Err(AppError::Validation(
                    "Price must be a non-negative number".into(),
                ));
            }
            Some(value)
        }
    };

    let status = match form.status.as_deref().map(str::trim) {
        None | Some("") => advertisement::STATUS_ACTIVE.to_string(),
        Some(raw) => {
            if !advertisement::STATUSES.contains(&raw) {
                return Err(AppError::Validation(
                    "Status must be ACTIVE or INACTIVE".into(),
                ));
            }
            raw.to_string()
        }
    };

    let start_date = match form.start_date.as_deref().map(str::trim) {
        None | Some("") => return Err(AppError::Validation("startDate is required".into())),
        Some(raw) => parse_date(raw, "startDate")?,
    };
    let end_date = match form.end_date.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(raw) => Some(parse_date(raw, "endDate")?),
    };
    if let Some(end) = end_date
        && end < start_date
    {
        return Err(AppError::Validation(
            "endDate must not be before startDate".into(),
        ));
    }

    let service_start_time = parse_optional_time(form.service_start_time.as_deref(), "serviceStartTime")?;
    let service_end_time = parse_optional_time(form.service_end_time.as_deref(), "serviceEndTime")?;

    let service_id = match form.service_id.as_deref().map(str::trim) {
        None | Some("") => return Err(AppError::Validation("serviceId is required".into())),
        Some(raw) => raw
            .parse::<i32>()
            .map_err(|_| AppError::Validation("serviceId must be an integer".into()))?,
    };

    let species_ids = match form.species_ids.as_deref().map(str::trim) {
        None | Some("") => Vec::new(),
        Some(raw) => {
            let ids: Vec<i32> = serde_json::from_str(raw).map_err(|_| {
                AppError::Validation("speciesIds must be a JSON array of integers".into())
            })?;
            let mut seen = HashSet::new();
            for &id in &ids {
                if !seen.insert(id) {
                    return Err(AppError::Validation(format!(
                        "Duplicate species id {id} in speciesIds"
                    )));
                }
            }
            ids
        }
    };

    let keep_image_urls: Vec<String> = match form.keep_image_urls.as_deref().map(str::trim) {
        None | Some("") => Vec::new(),
        Some(raw) => serde_json::from_str(raw).map_err(|_| {
            AppError::Validation("keepImageUrls must be a JSON array of strings".into())
        })?,
    };

    if keep_image_urls.len() + form.new_images.len() == 0 {
        return Err(AppError::Validation("At least one image is required".into()));
    }

    Ok(AdvertisementInput {
        title: title.to_string(),
        description,
        price,
        status,
        start_date,
        end_date,
        service_start_time,
        service_end_time,
        service_id,
        species_ids,
        keep_image_urls,
    })
}

fn parse_date(raw: &str, field: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| AppError::Validation(format!("{field} must be formatted as YYYY-MM-DD")))
}

fn parse_optional_time(raw: Option<&str>, field: &str) -> Result<Option<NaiveTime>, AppError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => NaiveTime::parse_from_str(raw, "%H:%M:%S")
            .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M"))
            .map(Some)
            .map_err(|_| AppError::Validation(format!("{field} must be formatted as HH:MM"))),
    }
}

/// One image of the public advertisement view.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ImageView {
    /// Signed read URL.
    pub url: String,
    /// 1-based display position.
    #[schema(example = 1)]
    pub position: i32,
}

/// Public detail view of an advertisement.
#[derive(Serialize, utoipa::ToSchema)]
pub struct AdvertisementResponse {
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    #[schema(value_type = Option<String>, example = "24.50")]
    pub price: Option<Decimal>,
    #[schema(example = "ACTIVE")]
    pub status: String,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub service_start_time: Option<NaiveTime>,
    pub service_end_time: Option<NaiveTime>,
    pub service_id: i32,
    pub provider_id: i32,
    pub provider_name: String,
    pub provider_city: String,
    pub species_ids: Vec<i32>,
    /// Ordered by position, starting at 1.
    pub images: Vec<ImageView>,
    /// Mean review rating across this listing's bookings; null when the
    /// listing has no reviews yet.
    pub rating: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One row of the public list view.
#[derive(Serialize, utoipa::ToSchema)]
pub struct AdvertisementListItem {
    pub id: i32,
    pub title: String,
    #[schema(value_type = Option<String>, example = "24.50")]
    pub price: Option<Decimal>,
    pub status: String,
    pub start_date: NaiveDate,
    pub provider_id: i32,
    /// URL of the image at position 1, if any.
    pub first_image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct AdvertisementListResponse {
    pub data: Vec<AdvertisementListItem>,
    pub pagination: Pagination,
}

#[derive(Deserialize)]
pub struct AdvertisementListQuery {
    pub page: Option<u64>,
    pub per_page: Option<u64>,
    pub search: Option<String>,
    pub provider_id: Option<i32>,
}
