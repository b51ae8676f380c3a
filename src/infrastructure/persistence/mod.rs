//! PostgreSQL repository implementations.
//!
//! Concrete implementations of domain repository traits using SQLx runtime
//! queries mapped through `FromRow` row types.
//!
//! # Repositories
//!
//! - [`PgListingRepository`] - Listings, atomic counter updates and ranks
//! - [`PgLikeRepository`] - Likes with per-user uniqueness
//! - [`PgCommentRepository`] - Comments

pub mod pg_comment_repository;
pub mod pg_like_repository;
pub mod pg_listing_repository;

pub use pg_comment_repository::PgCommentRepository;
pub use pg_like_repository::PgLikeRepository;
pub use pg_listing_repository::PgListingRepository;
