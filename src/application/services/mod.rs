//! Business logic services for the application layer.

pub mod engagement_service;
pub mod listing_service;
pub mod ranking_service;

pub use engagement_service::{EngagementOutcome, EngagementService};
pub use listing_service::ListingService;
pub use ranking_service::{RankingService, SweepError, SweepFailure, SweepReport};
