//! HTTP request handlers for API endpoints.
//!
//! Each handler module corresponds to a logical grouping of endpoints.

pub mod engagement;
pub mod health;
pub mod listings;
pub mod rankings;

pub use engagement::{
    create_comment_handler, like_handler, list_comments_handler, list_likes_handler,
    repost_handler, unlike_handler, user_comments_handler, user_like_handler, view_handler,
};
pub use health::health_handler;
pub use listings::{
    category_listings_handler, create_listing_handler, creator_listings_handler, feed_handler,
    get_listing_handler,
};
pub use rankings::{explain_rank_handler, refresh_rankings_handler};
