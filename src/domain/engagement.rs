//! Engagement events that mutate a listing's counters.
//!
//! Every counter change goes through one [`EngagementEvent`], applied by
//! [`crate::application::services::EngagementService::apply`], which adjusts
//! the counter and then recomputes the listing's rank.

use chrono::{DateTime, Utc};

use crate::domain::entities::EngagementCounter;

/// A single user interaction with a listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngagementEvent {
    LikeAdded {
        user_id: String,
    },
    LikeRemoved {
        user_id: String,
    },
    CommentAdded {
        user_id: String,
        username: String,
        content: String,
    },
    Reposted,
    Viewed,
}

impl EngagementEvent {
    /// The counter this event moves.
    pub fn counter(&self) -> EngagementCounter {
        match self {
            EngagementEvent::LikeAdded { .. } | EngagementEvent::LikeRemoved { .. } => {
                EngagementCounter::Upvotes
            }
            EngagementEvent::CommentAdded { .. } => EngagementCounter::Comments,
            EngagementEvent::Reposted => EngagementCounter::Reposts,
            EngagementEvent::Viewed => EngagementCounter::Views,
        }
    }

    /// Signed change applied to [`Self::counter`].
    pub fn delta(&self) -> i64 {
        match self {
            EngagementEvent::LikeRemoved { .. } => -1,
            _ => 1,
        }
    }

    /// Short label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            EngagementEvent::LikeAdded { .. } => "like_added",
            EngagementEvent::LikeRemoved { .. } => "like_removed",
            EngagementEvent::CommentAdded { .. } => "comment_added",
            EngagementEvent::Reposted => "reposted",
            EngagementEvent::Viewed => "viewed",
        }
    }
}

/// An engagement event waiting in the background queue.
///
/// Used for fire-and-forget interactions (preview views) so the HTTP
/// response does not wait on the store.
#[derive(Debug, Clone)]
pub struct QueuedEngagement {
    pub listing_id: String,
    pub event: EngagementEvent,
    pub received_at: DateTime<Utc>,
}

impl QueuedEngagement {
    pub fn new(listing_id: impl Into<String>, event: EngagementEvent) -> Self {
        Self {
            listing_id: listing_id.into(),
            event,
            received_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_counter_mapping() {
        let like = EngagementEvent::LikeAdded {
            user_id: "u".to_string(),
        };
        let unlike = EngagementEvent::LikeRemoved {
            user_id: "u".to_string(),
        };
        let comment = EngagementEvent::CommentAdded {
            user_id: "u".to_string(),
            username: "ada".to_string(),
            content: "hi".to_string(),
        };

        assert_eq!(like.counter(), EngagementCounter::Upvotes);
        assert_eq!(like.delta(), 1);
        assert_eq!(unlike.counter(), EngagementCounter::Upvotes);
        assert_eq!(unlike.delta(), -1);
        assert_eq!(comment.counter(), EngagementCounter::Comments);
        assert_eq!(comment.delta(), 1);
        assert_eq!(EngagementEvent::Reposted.counter(), EngagementCounter::Reposts);
        assert_eq!(EngagementEvent::Viewed.counter(), EngagementCounter::Views);
    }

    #[test]
    fn test_queued_engagement_creation() {
        let queued = QueuedEngagement::new("listing-1", EngagementEvent::Viewed);
        assert_eq!(queued.listing_id, "listing-1");
        assert_eq!(queued.event.kind(), "viewed");
        assert!(queued.received_at <= Utc::now());
    }
}
