//! Domain layer containing business entities and logic.
//!
//! # Architecture
//!
//! - [`entities`] - Listings, likes and comments
//! - [`ranking`] - The scoring formula, pure in its inputs and `now`
//! - [`engagement`] - Events that move a listing's counters
//! - [`repositories`] - Data access trait definitions
//!
//! The domain layer has no dependencies on infrastructure or presentation
//! layers. Repository traits define contracts implemented by the
//! infrastructure layer.
//!
//! # Engagement Flow
//!
//! 1. An HTTP handler turns a request into an [`engagement::EngagementEvent`]
//! 2. Likes, comments and reposts are applied directly; views go through the
//!    engagement queue as [`engagement::QueuedEngagement`]
//! 3. The counter is adjusted atomically via [`repositories::ListingRepository`]
//! 4. The listing's rank is recomputed with [`ranking::compute_score`]

pub mod engagement;
pub mod entities;
pub mod ranking;
pub mod repositories;
