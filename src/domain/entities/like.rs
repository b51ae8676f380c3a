//! Like entity: one user's endorsement of one listing.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// A single like.
///
/// At most one like exists per `(listing_id, user_id)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Like {
    pub id: String,
    pub listing_id: String,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
}

/// Input data for recording a like.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLike {
    pub listing_id: String,
    pub user_id: String,
}

impl NewLike {
    pub fn new(listing_id: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            listing_id: listing_id.into(),
            user_id: user_id.into(),
        }
    }
}
