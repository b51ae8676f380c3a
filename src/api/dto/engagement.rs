//! DTOs for likes, comments, reposts and views.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::api::dto::listings::{ListingResponse, USER_ID_REGEX};
use crate::domain::entities::{Comment, Like};

/// Request to like a listing.
#[derive(Debug, Deserialize, Validate)]
pub struct LikeRequest {
    #[validate(length(min = 1, max = 64))]
    #[validate(regex(path = "*USER_ID_REGEX"))]
    pub user_id: String,
}

/// Request to comment on a listing.
#[derive(Debug, Deserialize, Validate)]
pub struct CommentRequest {
    #[validate(length(min = 1, max = 64))]
    #[validate(regex(path = "*USER_ID_REGEX"))]
    pub user_id: String,

    #[validate(length(max = 50))]
    #[serde(default)]
    pub username: String,

    #[validate(length(min = 1, max = 2000))]
    pub content: String,
}

/// Result of a like, unlike or repost.
#[derive(Debug, Serialize)]
pub struct EngagementResponse {
    /// False when the request changed nothing (repeat like, unlike without like).
    pub applied: bool,
    pub listing: ListingResponse,
}

/// Result of adding a comment.
#[derive(Debug, Serialize)]
pub struct CommentCreatedResponse {
    pub comment: Comment,
    pub listing: ListingResponse,
}

/// Comments on one listing.
#[derive(Debug, Serialize)]
pub struct CommentListResponse {
    pub listing_id: String,
    pub total: usize,
    pub items: Vec<Comment>,
}

/// Likes on one listing.
#[derive(Debug, Serialize)]
pub struct LikeListResponse {
    pub listing_id: String,
    pub total: usize,
    pub items: Vec<Like>,
}

/// Whether one user likes one listing.
#[derive(Debug, Serialize)]
pub struct UserLikeResponse {
    pub listing_id: String,
    pub user_id: String,
    pub liked: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub like: Option<Like>,
}

/// Comments written by one user, newest first.
#[derive(Debug, Serialize)]
pub struct UserCommentsResponse {
    pub user_id: String,
    pub total: usize,
    pub items: Vec<Comment>,
}

/// Acknowledgement for a queued view.
#[derive(Debug, Serialize)]
pub struct ViewQueuedResponse {
    pub listing_id: String,
    pub queued: bool,
}
