#![allow(dead_code)]

use axum::Router;
use axum::routing::get;
use axum_test::TestServer;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::mpsc;

use showcase_feed::api::handlers::health_handler;
use showcase_feed::api::routes::api_routes;
use showcase_feed::domain::engagement::QueuedEngagement;
use showcase_feed::domain::entities::{EngagementCounts, Listing, NewListing};
use showcase_feed::infrastructure::cache::NullCache;
use showcase_feed::infrastructure::memory::{
    InMemoryCommentRepository, InMemoryLikeRepository, InMemoryListingRepository,
};
use showcase_feed::state::{AppState, ServiceOptions};

pub struct TestApp {
    pub server: TestServer,
    pub state: AppState,
    pub listings: Arc<InMemoryListingRepository>,
    pub engagement_rx: mpsc::Receiver<QueuedEngagement>,
}

/// Builds a listing with explicit counters and creation time.
pub fn seeded_listing(
    id: &str,
    category: &str,
    counts: EngagementCounts,
    created_at: DateTime<Utc>,
) -> Listing {
    let mut listing = Listing::from_new(
        id.to_string(),
        NewListing {
            title: format!("Listing {id}"),
            website_url: format!("https://{id}.example.com/"),
            category: category.to_string(),
            creator_id: "creator-1".to_string(),
            creator_name: "Ada".to_string(),
            ..Default::default()
        },
        created_at,
    );
    listing.counts = counts;
    listing
}

/// Creates an in-memory app with the API mounted under `/api` and health at `/health`.
pub fn create_test_app(seed: Vec<Listing>) -> TestApp {
    create_test_app_with_queue(seed, 100)
}

pub fn create_test_app_with_queue(seed: Vec<Listing>, queue_capacity: usize) -> TestApp {
    let listings = Arc::new(InMemoryListingRepository::with_listings(seed));
    let (tx, rx) = mpsc::channel(queue_capacity);

    let state = AppState::new(
        listings.clone(),
        Arc::new(InMemoryLikeRepository::new()),
        Arc::new(InMemoryCommentRepository::new()),
        Arc::new(NullCache::new()),
        tx,
        ServiceOptions::default(),
    );

    let app = Router::new()
        .route("/health", get(health_handler))
        .nest("/api", api_routes())
        .with_state(state.clone());

    TestApp {
        server: TestServer::new(app).unwrap(),
        state,
        listings,
        engagement_rx: rx,
    }
}
