//! Listing entity: a showcased website or product.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Engagement counters that feed the ranking score.
///
/// Counters absent from serialized input default to zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngagementCounts {
    #[serde(default)]
    pub upvotes: i64,
    #[serde(default)]
    pub comments: i64,
    #[serde(default)]
    pub reposts: i64,
    #[serde(default)]
    pub views: i64,
}

impl EngagementCounts {
    pub fn new(upvotes: i64, comments: i64, reposts: i64, views: i64) -> Self {
        Self {
            upvotes,
            comments,
            reposts,
            views,
        }
    }

    /// Returns the current value of a single counter.
    pub fn get(&self, counter: EngagementCounter) -> i64 {
        match counter {
            EngagementCounter::Upvotes => self.upvotes,
            EngagementCounter::Comments => self.comments,
            EngagementCounter::Reposts => self.reposts,
            EngagementCounter::Views => self.views,
        }
    }

    /// Adds `delta` to one counter, saturating at zero.
    pub fn adjust(&mut self, counter: EngagementCounter, delta: i64) {
        let slot = match counter {
            EngagementCounter::Upvotes => &mut self.upvotes,
            EngagementCounter::Comments => &mut self.comments,
            EngagementCounter::Reposts => &mut self.reposts,
            EngagementCounter::Views => &mut self.views,
        };
        *slot = slot.saturating_add(delta).max(0);
    }
}

/// Identifies one engagement counter column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EngagementCounter {
    Upvotes,
    Comments,
    Reposts,
    Views,
}

impl EngagementCounter {
    /// Column name in the `listings` table.
    pub fn column(self) -> &'static str {
        match self {
            EngagementCounter::Upvotes => "upvotes",
            EngagementCounter::Comments => "comments",
            EngagementCounter::Reposts => "reposts",
            EngagementCounter::Views => "views",
        }
    }
}

/// A showcased listing with its engagement counters and derived rank.
///
/// `rank` is never set by user actions; it is written only by the
/// ranking service and can always be rebuilt from the other fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub id: String,
    pub title: String,
    pub description: String,
    pub long_description: String,
    pub website_url: String,
    pub image_url: String,
    pub category: String,
    pub creator_id: String,
    pub creator_name: String,
    pub creator_email: String,
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub counts: EngagementCounts,
    #[serde(default)]
    pub technologies: Vec<String>,
    #[serde(default)]
    pub additional_images: Vec<String>,
    pub rank: Option<f64>,
}

impl Listing {
    /// Builds a freshly created listing with zeroed counters and no rank.
    pub fn from_new(id: String, new_listing: NewListing, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            title: new_listing.title,
            description: new_listing.description,
            long_description: new_listing.long_description,
            website_url: new_listing.website_url,
            image_url: new_listing.image_url,
            category: new_listing.category,
            creator_id: new_listing.creator_id,
            creator_name: new_listing.creator_name,
            creator_email: new_listing.creator_email,
            created_at,
            counts: EngagementCounts::default(),
            technologies: new_listing.technologies,
            additional_images: new_listing.additional_images,
            rank: None,
        }
    }

    /// Age of the listing at `now`, in fractional hours.
    ///
    /// Negative when `created_at` lies in the future.
    pub fn age_hours(&self, now: DateTime<Utc>) -> f64 {
        crate::domain::ranking::age_hours(self.created_at, now)
    }
}

/// Input data for creating a new listing.
#[derive(Debug, Clone, Default)]
pub struct NewListing {
    pub title: String,
    pub description: String,
    pub long_description: String,
    pub website_url: String,
    pub image_url: String,
    pub category: String,
    pub creator_id: String,
    pub creator_name: String,
    pub creator_email: String,
    pub technologies: Vec<String>,
    pub additional_images: Vec<String>,
}
