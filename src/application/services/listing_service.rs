//! Listing creation and feed retrieval.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::json;

use crate::domain::entities::{Listing, NewListing};
use crate::domain::ranking;
use crate::domain::repositories::{FeedFilter, ListingRepository};
use crate::error::AppError;
use crate::utils::id_generator::{generate_id, validate_id};
use crate::utils::tags::{clean_label, normalize_technologies};
use crate::utils::url_normalizer::{normalize_optional_url, normalize_url};

/// Service for creating listings and reading the ranked feed.
pub struct ListingService<L: ListingRepository + ?Sized> {
    repository: Arc<L>,
}

impl<L: ListingRepository + ?Sized> ListingService<L> {
    /// Creates a new listing service.
    pub fn new(repository: Arc<L>) -> Self {
        Self { repository }
    }

    /// Creates a listing with zeroed counters and its initial rank.
    ///
    /// URLs are normalized and technology tags deduplicated before storage.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if a URL is invalid or the title is blank.
    /// Returns [`AppError::Internal`] on storage errors.
    pub async fn create_listing(
        &self,
        mut new_listing: NewListing,
        now: DateTime<Utc>,
    ) -> Result<Listing, AppError> {
        new_listing.title = clean_label(&new_listing.title);
        if new_listing.title.is_empty() {
            return Err(AppError::bad_request(
                "Title must not be blank",
                json!({ "field": "title" }),
            ));
        }

        new_listing.website_url = normalize_url(&new_listing.website_url).map_err(|e| {
            AppError::bad_request(
                "Invalid website URL",
                json!({ "field": "website_url", "reason": e.to_string() }),
            )
        })?;
        new_listing.image_url = normalize_optional_url(&new_listing.image_url).map_err(|e| {
            AppError::bad_request(
                "Invalid image URL",
                json!({ "field": "image_url", "reason": e.to_string() }),
            )
        })?;
        new_listing.additional_images = new_listing
            .additional_images
            .iter()
            .filter(|u| !u.trim().is_empty())
            .map(|u| normalize_url(u))
            .collect::<Result<_, _>>()
            .map_err(|e| {
                AppError::bad_request(
                    "Invalid additional image URL",
                    json!({ "field": "additional_images", "reason": e.to_string() }),
                )
            })?;
        new_listing.category = clean_label(&new_listing.category);
        new_listing.technologies = normalize_technologies(&new_listing.technologies);

        let mut listing = Listing::from_new(generate_id()?, new_listing, now);
        listing.rank = Some(ranking::compute_score(&listing, now));

        let created = self.repository.create(listing).await?;
        tracing::info!(listing_id = %created.id, category = %created.category, "Listing created");

        Ok(created)
    }

    /// Retrieves a listing by id.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] for malformed ids.
    /// Returns [`AppError::NotFound`] if no listing matches.
    pub async fn get_listing(&self, id: &str) -> Result<Listing, AppError> {
        validate_id(id)?;

        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("Listing not found", json!({ "id": id })))
    }

    /// Returns one page of the ranked feed.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on storage errors.
    pub async fn ranked_feed(&self, filter: FeedFilter) -> Result<Vec<Listing>, AppError> {
        self.repository.list_ranked(filter).await
    }

    /// Counts listings, optionally within one category.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on storage errors.
    pub async fn count(&self, category: Option<String>) -> Result<i64, AppError> {
        self.repository.count(category).await
    }

    /// Returns listings created by one user.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on storage errors.
    pub async fn listings_by_creator(&self, creator_id: &str) -> Result<Vec<Listing>, AppError> {
        self.repository.list_by_creator(creator_id).await
    }

    /// Returns listings in one category, best ranked first.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on storage errors.
    pub async fn listings_by_category(&self, category: &str) -> Result<Vec<Listing>, AppError> {
        self.repository.list_by_category(&clean_label(category)).await
    }

    /// Checks store connectivity.
    ///
    /// # Errors
    ///
    /// Returns the store's error when unreachable.
    pub async fn ping(&self) -> Result<(), AppError> {
        self.repository.ping().await
    }
}
