//! Repository trait for likes.

use crate::domain::entities::{Like, NewLike};
use crate::error::AppError;
use async_trait::async_trait;

/// Repository interface for likes.
///
/// Implementations enforce at most one like per `(listing_id, user_id)`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LikeRepository: Send + Sync {
    /// Records a like.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the user already likes the listing.
    /// Returns [`AppError::Internal`] on storage errors.
    async fn create(&self, new_like: NewLike) -> Result<Like, AppError>;

    /// Finds the like a user gave a listing, if any.
    async fn find(&self, listing_id: &str, user_id: &str) -> Result<Option<Like>, AppError>;

    /// Removes a user's like. Returns `false` when there was none.
    async fn delete(&self, listing_id: &str, user_id: &str) -> Result<bool, AppError>;

    /// Returns all likes on a listing.
    async fn list_by_listing(&self, listing_id: &str) -> Result<Vec<Like>, AppError>;
}
