//! Comment entity: a user's remark on a listing.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// A comment attached to a listing.
///
/// Comments are not ranked themselves; their count feeds the listing's
/// `comments` counter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Comment {
    pub id: String,
    pub listing_id: String,
    pub user_id: String,
    pub username: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub likes: i64,
}

/// Input data for creating a comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewComment {
    pub listing_id: String,
    pub user_id: String,
    pub username: String,
    pub content: String,
}
