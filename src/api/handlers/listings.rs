//! Handlers for listing creation, lookup and the ranked feed.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use chrono::Utc;
use serde_json::json;
use validator::Validate;

use crate::api::dto::listings::{
    CategoryListingsResponse, CreateListingRequest, CreatorListingsResponse, FeedQueryParams, FeedResponse, ListingResponse,
};
use crate::api::dto::pagination::{DEFAULT_PAGE_SIZE, PaginationMeta};
use crate::domain::repositories::FeedFilter;
use crate::error::AppError;
use crate::state::AppState;
use crate::utils::id_generator::validate_id;
use crate::utils::tags::clean_label;

/// Returns one page of the ranked feed.
///
/// # Endpoint
///
/// `GET /api/listings`
///
/// # Query Parameters
///
/// - `page` (optional): Page number (default: 1)
/// - `page_size` (optional): Items per page (default: 25, max: 100)
/// - `category` (optional): Restrict to one category
///
/// Listings are ordered by rank (highest first, unranked last), then newest
/// first. Pages are served from the feed cache when present.
///
/// # Errors
///
/// Returns 400 Bad Request if pagination parameters are invalid.
pub async fn feed_handler(
    State(state): State<AppState>,
    Query(params): Query<FeedQueryParams>,
) -> Result<Response, AppError> {
    let (offset, limit) = params
        .pagination
        .validate_and_get_offset_limit()
        .map_err(|e| AppError::bad_request(e, json!({})))?;

    let page = params.pagination.page.unwrap_or(1);
    let page_size = params.pagination.page_size.unwrap_or(DEFAULT_PAGE_SIZE);

    let category = params
        .category
        .as_deref()
        .map(clean_label)
        .filter(|c| !c.is_empty());
    let filter = FeedFilter::new(offset, limit).with_category(category.clone());
    let cache_key = filter.cache_key();

    if let Ok(Some(payload)) = state.cache.get_feed(&cache_key).await {
        return Ok(json_payload(payload));
    }

    let (items, total) = tokio::try_join!(
        state.listing_service.ranked_feed(filter),
        state.listing_service.count(category),
    )?;

    let response = FeedResponse {
        pagination: PaginationMeta::new(page, page_size, total),
        items: items.into_iter().map(ListingResponse::from).collect(),
    };

    let payload = serde_json::to_string(&response).map_err(|e| {
        AppError::internal("Failed to serialize feed", json!({ "reason": e.to_string() }))
    })?;
    let _ = state
        .cache
        .set_feed(&cache_key, &payload, Some(state.feed_cache_ttl_seconds))
        .await;

    Ok(json_payload(payload))
}

fn json_payload(payload: String) -> Response {
    ([(header::CONTENT_TYPE, "application/json")], payload).into_response()
}

/// Creates a listing with zeroed counters and its initial rank.
///
/// # Endpoint
///
/// `POST /api/listings`
///
/// # Request Body
///
/// ```json
/// {
///   "title": "Crypto Dashboard",
///   "description": "Track prices in real time",
///   "website_url": "https://example.com",
///   "category": "Dashboard",
///   "creator_id": "user-1",
///   "technologies": ["Rust", "React"]
/// }
/// ```
///
/// # Errors
///
/// Returns 400 Bad Request if validation fails.
pub async fn create_listing_handler(
    State(state): State<AppState>,
    Json(payload): Json<CreateListingRequest>,
) -> Result<(StatusCode, Json<ListingResponse>), AppError> {
    payload.validate()?;

    let listing = state
        .listing_service
        .create_listing(payload.into(), Utc::now())
        .await?;

    let _ = state.cache.invalidate_feeds().await;

    Ok((StatusCode::CREATED, Json(listing.into())))
}

/// Returns a single listing.
///
/// # Endpoint
///
/// `GET /api/listings/{id}`
///
/// # Errors
///
/// Returns 404 Not Found if the listing does not exist.
pub async fn get_listing_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ListingResponse>, AppError> {
    let listing = state.listing_service.get_listing(&id).await?;
    Ok(Json(listing.into()))
}

/// Returns every listing created by one user, newest first.
///
/// # Endpoint
///
/// `GET /api/creators/{creator_id}/listings`
pub async fn creator_listings_handler(
    State(state): State<AppState>,
    Path(creator_id): Path<String>,
) -> Result<Json<CreatorListingsResponse>, AppError> {
    validate_id(&creator_id)?;

    let items: Vec<ListingResponse> = state
        .listing_service
        .listings_by_creator(&creator_id)
        .await?
        .into_iter()
        .map(ListingResponse::from)
        .collect();

    Ok(Json(CreatorListingsResponse {
        creator_id,
        total: items.len(),
        items,
    }))
}

/// Lists every listing in one category, best ranked first.
///
/// # Endpoint
///
/// `GET /api/categories/{category}/listings`
///
/// # Errors
///
/// Returns 400 Bad Request for a blank or oversized category.
pub async fn category_listings_handler(
    State(state): State<AppState>,
    Path(category): Path<String>,
) -> Result<Json<CategoryListingsResponse>, AppError> {
    let category = clean_label(&category);
    if category.is_empty() || category.chars().count() > 50 {
        return Err(AppError::bad_request(
            "Invalid category",
            json!({ "category": category }),
        ));
    }

    let items: Vec<ListingResponse> = state
        .listing_service
        .listings_by_category(&category)
        .await?
        .into_iter()
        .map(ListingResponse::from)
        .collect();

    Ok(Json(CategoryListingsResponse {
        category,
        total: items.len(),
        items,
    }))
}
