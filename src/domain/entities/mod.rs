//! Core domain entities.
//!
//! - [`Listing`] - A showcased website or product with engagement counters
//! - [`Like`] - One user's like on one listing
//! - [`Comment`] - A user's remark on a listing
//!
//! Creation inputs live next to each entity (`NewListing`, `NewLike`, `NewComment`).

pub mod comment;
pub mod like;
pub mod listing;

pub use comment::{Comment, NewComment};
pub use like::{Like, NewLike};
pub use listing::{EngagementCounter, EngagementCounts, Listing, NewListing};
