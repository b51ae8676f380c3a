//! Repository trait definitions for the domain layer.
//!
//! Traits define the storage contract; implementations live in
//! `crate::infrastructure::persistence` (PostgreSQL) and
//! `crate::infrastructure::memory` (in-process). Mock implementations are
//! generated via `mockall` for unit tests.
//!
//! - [`ListingRepository`] - Listings, counters and ranks
//! - [`LikeRepository`] - Likes with per-user uniqueness
//! - [`CommentRepository`] - Comments

pub mod comment_repository;
pub mod like_repository;
pub mod listing_repository;

pub use comment_repository::CommentRepository;
pub use like_repository::LikeRepository;
pub use listing_repository::{FeedFilter, ListingRepository};

#[cfg(test)]
pub use comment_repository::MockCommentRepository;
#[cfg(test)]
pub use like_repository::MockLikeRepository;
#[cfg(test)]
pub use listing_repository::MockListingRepository;
