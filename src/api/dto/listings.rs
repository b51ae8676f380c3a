//! DTOs for listing creation and the ranked feed.

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use validator::Validate;

use crate::api::dto::pagination::{PaginationMeta, PaginationParams};
use crate::domain::entities::{EngagementCounts, Listing, NewListing};

/// Allowed characters for externally supplied user ids.
pub(crate) static USER_ID_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").unwrap());

/// Request to create a listing.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateListingRequest {
    #[validate(length(min = 1, max = 120))]
    pub title: String,

    #[validate(length(max = 300))]
    #[serde(default)]
    pub description: String,

    #[validate(length(max = 5000))]
    #[serde(default)]
    pub long_description: String,

    #[validate(url(message = "Invalid URL format"))]
    pub website_url: String,

    #[validate(url(message = "Invalid URL format"))]
    pub image_url: Option<String>,

    #[validate(length(min = 1, max = 50))]
    pub category: String,

    #[validate(length(min = 1, max = 64))]
    #[validate(regex(path = "*USER_ID_REGEX"))]
    pub creator_id: String,

    #[validate(length(max = 100))]
    #[serde(default)]
    pub creator_name: String,

    #[validate(email)]
    pub creator_email: Option<String>,

    #[validate(length(max = 20))]
    #[serde(default)]
    pub technologies: Vec<String>,

    #[validate(length(max = 10))]
    #[serde(default)]
    pub additional_images: Vec<String>,
}

impl From<CreateListingRequest> for NewListing {
    fn from(r: CreateListingRequest) -> Self {
        NewListing {
            title: r.title,
            description: r.description,
            long_description: r.long_description,
            website_url: r.website_url,
            image_url: r.image_url.unwrap_or_default(),
            category: r.category,
            creator_id: r.creator_id,
            creator_name: r.creator_name,
            creator_email: r.creator_email.unwrap_or_default(),
            technologies: r.technologies,
            additional_images: r.additional_images,
        }
    }
}

/// A listing as returned by the API.
#[derive(Debug, Serialize, Deserialize)]
pub struct ListingResponse {
    pub id: String,
    pub title: String,
    pub description: String,
    pub long_description: String,
    pub website_url: String,
    pub image_url: String,
    pub category: String,
    pub creator_id: String,
    pub creator_name: String,
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub counts: EngagementCounts,
    pub technologies: Vec<String>,
    pub additional_images: Vec<String>,
    pub rank: Option<f64>,
}

impl From<Listing> for ListingResponse {
    // The creator's email stays server-side.
    fn from(l: Listing) -> Self {
        ListingResponse {
            id: l.id,
            title: l.title,
            description: l.description,
            long_description: l.long_description,
            website_url: l.website_url,
            image_url: l.image_url,
            category: l.category,
            creator_id: l.creator_id,
            creator_name: l.creator_name,
            created_at: l.created_at,
            counts: l.counts,
            technologies: l.technologies,
            additional_images: l.additional_images,
            rank: l.rank,
        }
    }
}

/// Query parameters for the ranked feed.
#[derive(Debug, Deserialize)]
pub struct FeedQueryParams {
    #[serde(flatten)]
    pub pagination: PaginationParams,

    pub category: Option<String>,
}

/// One page of the ranked feed.
#[derive(Debug, Serialize, Deserialize)]
pub struct FeedResponse {
    pub pagination: PaginationMeta,
    pub items: Vec<ListingResponse>,
}

/// Listings belonging to one creator.
#[derive(Debug, Serialize)]
pub struct CreatorListingsResponse {
    pub creator_id: String,
    pub total: usize,
    pub items: Vec<ListingResponse>,
}

/// Listings in one category, best ranked first.
#[derive(Debug, Serialize)]
pub struct CategoryListingsResponse {
    pub category: String,
    pub total: usize,
    pub items: Vec<ListingResponse>,
}
