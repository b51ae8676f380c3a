use async_trait::async_trait;
use serde_json::json;
use std::cmp::Ordering;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::domain::entities::{EngagementCounter, Listing};
use crate::domain::repositories::{FeedFilter, ListingRepository};
use crate::error::AppError;

/// Listing store backed by a `HashMap` behind an async lock.
#[derive(Default)]
pub struct InMemoryListingRepository {
    listings: RwLock<HashMap<String, Listing>>,
}

impl InMemoryListingRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-filled with listings, keeping their counters and ranks.
    pub fn with_listings(listings: impl IntoIterator<Item = Listing>) -> Self {
        let listings = listings
            .into_iter()
            .map(|listing| (listing.id.clone(), listing))
            .collect();
        Self {
            listings: RwLock::new(listings),
        }
    }
}

/// Rank descending with unranked listings last, then newest first.
fn feed_order(a: &Listing, b: &Listing) -> Ordering {
    match (a.rank, b.rank) {
        (Some(x), Some(y)) => y.total_cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
    .then_with(|| b.created_at.cmp(&a.created_at))
}

fn not_found(id: &str) -> AppError {
    AppError::not_found("Listing not found", json!({ "id": id }))
}

#[async_trait]
impl ListingRepository for InMemoryListingRepository {
    async fn create(&self, listing: Listing) -> Result<Listing, AppError> {
        let mut listings = self.listings.write().await;
        if listings.contains_key(&listing.id) {
            return Err(AppError::conflict(
                "Listing id already exists",
                json!({ "id": listing.id }),
            ));
        }
        listings.insert(listing.id.clone(), listing.clone());
        Ok(listing)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Listing>, AppError> {
        Ok(self.listings.read().await.get(id).cloned())
    }

    async fn list_all(&self) -> Result<Vec<Listing>, AppError> {
        let mut all: Vec<Listing> = self.listings.read().await.values().cloned().collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(all)
    }

    async fn list_by_creator(&self, creator_id: &str) -> Result<Vec<Listing>, AppError> {
        let mut found: Vec<Listing> = self
            .listings
            .read()
            .await
            .values()
            .filter(|l| l.creator_id == creator_id)
            .cloned()
            .collect();
        found.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(found)
    }

    async fn list_by_category(&self, category: &str) -> Result<Vec<Listing>, AppError> {
        let mut found: Vec<Listing> = self
            .listings
            .read()
            .await
            .values()
            .filter(|l| l.category == category)
            .cloned()
            .collect();
        found.sort_by(feed_order);
        Ok(found)
    }

    async fn list_ranked(&self, filter: FeedFilter) -> Result<Vec<Listing>, AppError> {
        let mut found: Vec<Listing> = self
            .listings
            .read()
            .await
            .values()
            .filter(|l| filter.category.as_ref().is_none_or(|c| &l.category == c))
            .cloned()
            .collect();
        found.sort_by(feed_order);

        Ok(found
            .into_iter()
            .skip(filter.offset.max(0) as usize)
            .take(filter.limit.max(0) as usize)
            .collect())
    }

    async fn count(&self, category: Option<String>) -> Result<i64, AppError> {
        let listings = self.listings.read().await;
        let count = listings
            .values()
            .filter(|l| category.as_ref().is_none_or(|c| &l.category == c))
            .count();
        Ok(count as i64)
    }

    async fn update_rank(&self, id: &str, rank: f64) -> Result<(), AppError> {
        let mut listings = self.listings.write().await;
        let listing = listings.get_mut(id).ok_or_else(|| not_found(id))?;
        listing.rank = Some(rank);
        Ok(())
    }

    async fn adjust_counter(
        &self,
        id: &str,
        counter: EngagementCounter,
        delta: i64,
    ) -> Result<Listing, AppError> {
        let mut listings = self.listings.write().await;
        let listing = listings.get_mut(id).ok_or_else(|| not_found(id))?;
        listing.counts.adjust(counter, delta);
        Ok(listing.clone())
    }

    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }
}
