//! Shared application state injected into every handler.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::application::services::{EngagementService, ListingService, RankingService};
use crate::domain::engagement::QueuedEngagement;
use crate::domain::repositories::{CommentRepository, LikeRepository, ListingRepository};
use crate::infrastructure::cache::CacheService;

pub type DynListingService = ListingService<dyn ListingRepository>;
pub type DynRankingService = RankingService<dyn ListingRepository>;
pub type DynEngagementService =
    EngagementService<dyn ListingRepository, dyn LikeRepository, dyn CommentRepository>;

/// State shared by handlers, the engagement worker and the ranking scheduler.
#[derive(Clone)]
pub struct AppState {
    pub listing_service: Arc<DynListingService>,
    pub ranking_service: Arc<DynRankingService>,
    pub engagement_service: Arc<DynEngagementService>,
    pub cache: Arc<dyn CacheService>,
    /// Producer side of the background engagement queue.
    pub engagement_sender: mpsc::Sender<QueuedEngagement>,
    pub feed_cache_ttl_seconds: u64,
}

/// Options that shape how services are wired together.
#[derive(Debug, Clone, Copy)]
pub struct ServiceOptions {
    pub sweep_concurrency: usize,
    pub recompute_on_engagement: bool,
    pub feed_cache_ttl_seconds: u64,
}

impl Default for ServiceOptions {
    fn default() -> Self {
        Self {
            sweep_concurrency: 8,
            recompute_on_engagement: true,
            feed_cache_ttl_seconds: 60,
        }
    }
}

impl AppState {
    /// Wires services over the given repositories.
    pub fn new(
        listings: Arc<dyn ListingRepository>,
        likes: Arc<dyn LikeRepository>,
        comments: Arc<dyn CommentRepository>,
        cache: Arc<dyn CacheService>,
        engagement_sender: mpsc::Sender<QueuedEngagement>,
        options: ServiceOptions,
    ) -> Self {
        let listing_service = Arc::new(ListingService::new(listings.clone()));
        let ranking_service = Arc::new(RankingService::new(
            listings.clone(),
            options.sweep_concurrency,
        ));
        let engagement_service = Arc::new(EngagementService::new(
            listings,
            likes,
            comments,
            ranking_service.clone(),
            options.recompute_on_engagement,
        ));

        Self {
            listing_service,
            ranking_service,
            engagement_service,
            cache,
            engagement_sender,
            feed_cache_ttl_seconds: options.feed_cache_ttl_seconds,
        }
    }
}
