//! Application layer services implementing business logic.
//!
//! Services consume repository traits and expose the operations HTTP handlers,
//! background workers and the admin CLI call.
//!
//! # Available Services
//!
//! - [`services::listing_service::ListingService`] - Listing creation and the ranked feed
//! - [`services::ranking_service::RankingService`] - Rank recomputation and sweeps
//! - [`services::engagement_service::EngagementService`] - Likes, comments, reposts and views
//!
//! Background tasks built on these services live in [`workers`].

pub mod services;
pub mod workers;
