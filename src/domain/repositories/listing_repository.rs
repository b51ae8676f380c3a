//! Repository trait for listing data access.

use crate::domain::entities::{EngagementCounter, Listing};
use crate::error::AppError;
use async_trait::async_trait;

/// Filter and pagination for ranked feed queries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedFilter {
    pub offset: i64,
    pub limit: i64,
    pub category: Option<String>,
}

impl FeedFilter {
    /// Creates a new filter with pagination parameters.
    pub fn new(offset: i64, limit: i64) -> Self {
        Self {
            offset,
            limit,
            category: None,
        }
    }

    /// Restricts the feed to one category.
    pub fn with_category(mut self, category: Option<String>) -> Self {
        self.category = category;
        self
    }

    /// Stable key used for caching a feed page.
    ///
    /// The unfiltered feed and category feeds use different prefixes, and the
    /// free-form category goes last, so no category value can produce the key
    /// of another page.
    pub fn cache_key(&self) -> String {
        match self.category.as_deref() {
            None => format!("all:{}:{}", self.offset, self.limit),
            Some(category) => format!("cat:{}:{}:{}", self.offset, self.limit, category),
        }
    }
}

/// Repository interface for listings.
///
/// The ranking service treats listings as records with readable counters, a
/// readable creation timestamp and a writable rank.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgListingRepository`] - PostgreSQL implementation
/// - [`crate::infrastructure::memory::InMemoryListingRepository`] - In-process store
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ListingRepository: Send + Sync {
    /// Inserts a new listing.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the id is already taken.
    /// Returns [`AppError::Internal`] on storage errors.
    async fn create(&self, listing: Listing) -> Result<Listing, AppError>;

    /// Finds a listing by id.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on storage errors.
    async fn find_by_id(&self, id: &str) -> Result<Option<Listing>, AppError>;

    /// Returns every listing. Used by the ranking sweep.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on storage errors.
    async fn list_all(&self) -> Result<Vec<Listing>, AppError>;

    /// Returns listings created by one user, newest first.
    async fn list_by_creator(&self, creator_id: &str) -> Result<Vec<Listing>, AppError>;

    /// Returns listings in one category, best ranked first.
    async fn list_by_category(&self, category: &str) -> Result<Vec<Listing>, AppError>;

    /// Returns one page of the ranked feed.
    ///
    /// Ordered by rank descending (unranked last), then newest first.
    async fn list_ranked(&self, filter: FeedFilter) -> Result<Vec<Listing>, AppError>;

    /// Counts listings, optionally within a category.
    async fn count(&self, category: Option<String>) -> Result<i64, AppError>;

    /// Persists a recomputed rank.
    ///
    /// Only the rank is written so concurrent counter updates are never lost.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no listing has this id.
    /// Returns [`AppError::Internal`] on storage errors.
    async fn update_rank(&self, id: &str, rank: f64) -> Result<(), AppError>;

    /// Atomically adds `delta` to one counter, never going below zero.
    ///
    /// Returns the listing as stored after the change.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no listing has this id.
    /// Returns [`AppError::Internal`] on storage errors.
    async fn adjust_counter(
        &self,
        id: &str,
        counter: EngagementCounter,
        delta: i64,
    ) -> Result<Listing, AppError>;

    /// Checks that the store is reachable.
    async fn ping(&self) -> Result<(), AppError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feed_filter_cache_key() {
        assert_eq!(FeedFilter::new(0, 25).cache_key(), "all:0:25");
        assert_eq!(
            FeedFilter::new(25, 25)
                .with_category(Some("SaaS".to_string()))
                .cache_key(),
            "cat:25:25:SaaS"
        );
    }

    #[test]
    fn test_category_keys_never_match_unfiltered_feed() {
        let unfiltered = FeedFilter::new(0, 25).cache_key();

        for category in ["*", "all", "all:0:25", ""] {
            let key = FeedFilter::new(0, 25)
                .with_category(Some(category.to_string()))
                .cache_key();
            assert_ne!(key, unfiltered, "category {category:?} collides");
        }

        let colon = FeedFilter::new(0, 25)
            .with_category(Some("a:0:25".to_string()))
            .cache_key();
        let other_page = FeedFilter::new(0, 25)
            .with_category(Some("a".to_string()))
            .cache_key();
        assert_ne!(colon, other_page);
    }
}
