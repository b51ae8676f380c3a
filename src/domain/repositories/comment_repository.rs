//! Repository trait for comments.

use crate::domain::entities::{Comment, NewComment};
use crate::error::AppError;
use async_trait::async_trait;

/// Repository interface for listing comments.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommentRepository: Send + Sync {
    /// Stores a new comment.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on storage errors.
    async fn create(&self, new_comment: NewComment) -> Result<Comment, AppError>;

    /// Deletes a comment by id. Returns false if it did not exist.
    async fn delete(&self, id: &str) -> Result<bool, AppError>;

    /// Returns a listing's comments, oldest first.
    async fn list_by_listing(&self, listing_id: &str) -> Result<Vec<Comment>, AppError>;

    /// Returns a user's comments, newest first.
    async fn list_by_user(&self, user_id: &str) -> Result<Vec<Comment>, AppError>;
}
