//! API route configuration.
//!
//! Routes are split into reads and writes so the top-level router can rate
//! limit writes only.

use crate::api::handlers::{
    category_listings_handler, create_comment_handler, create_listing_handler,
    creator_listings_handler, explain_rank_handler, feed_handler, get_listing_handler,
    like_handler, list_comments_handler, list_likes_handler, refresh_rankings_handler,
    repost_handler, unlike_handler, user_comments_handler, user_like_handler, view_handler,
};
use crate::state::AppState;
use axum::{
    Router,
    routing::{delete, get, post},
};

/// Read-only endpoints.
///
/// - `GET /listings`                         - Ranked feed (paginated, optional category)
/// - `GET /listings/{id}`                    - Single listing
/// - `GET /listings/{id}/comments`           - Comments on a listing
/// - `GET /listings/{id}/likes`              - Likes on a listing
/// - `GET /listings/{id}/likes/{user_id}`    - Whether a user likes a listing
/// - `GET /creators/{creator_id}/listings`   - Listings by creator
/// - `GET /categories/{category}/listings`   - Listings in a category
/// - `GET /users/{user_id}/comments`         - Comments by a user
/// - `GET /rankings/{id}`                    - Score breakdown of a listing
pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/listings", get(feed_handler))
        .route("/listings/{id}", get(get_listing_handler))
        .route("/listings/{id}/comments", get(list_comments_handler))
        .route("/listings/{id}/likes", get(list_likes_handler))
        .route("/listings/{id}/likes/{user_id}", get(user_like_handler))
        .route(
            "/creators/{creator_id}/listings",
            get(creator_listings_handler),
        )
        .route(
            "/categories/{category}/listings",
            get(category_listings_handler),
        )
        .route("/users/{user_id}/comments", get(user_comments_handler))
        .route("/rankings/{id}", get(explain_rank_handler))
}

/// Endpoints that create records or move counters.
///
/// - `POST   /listings`                      - Create a listing
/// - `POST   /listings/{id}/likes`           - Like
/// - `DELETE /listings/{id}/likes/{user_id}` - Unlike
/// - `POST   /listings/{id}/comments`        - Comment
/// - `POST   /listings/{id}/reposts`         - Repost
/// - `POST   /listings/{id}/views`           - Queue a view (202)
/// - `POST   /rankings/refresh`              - Run a ranking sweep now
pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/listings", post(create_listing_handler))
        .route("/listings/{id}/likes", post(like_handler))
        .route("/listings/{id}/likes/{user_id}", delete(unlike_handler))
        .route("/listings/{id}/comments", post(create_comment_handler))
        .route("/listings/{id}/reposts", post(repost_handler))
        .route("/listings/{id}/views", post(view_handler))
        .route("/rankings/refresh", post(refresh_rankings_handler))
}

/// Every API route without rate limiting.
pub fn api_routes() -> Router<AppState> {
    read_routes().merge(write_routes())
}
