//! Handlers for likes, comments, reposts and views.
//!
//! Likes, comments and reposts are applied before responding so the caller
//! sees the updated counters and rank. Views are queued and applied by the
//! engagement worker.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::Utc;
use tokio::sync::mpsc::error::TrySendError;
use validator::Validate;

use crate::api::dto::engagement::{
    CommentCreatedResponse, CommentListResponse, CommentRequest, EngagementResponse,
    LikeListResponse, LikeRequest, UserCommentsResponse, UserLikeResponse, ViewQueuedResponse,
};
use crate::application::services::EngagementOutcome;
use crate::domain::engagement::{EngagementEvent, QueuedEngagement};
use crate::error::AppError;
use crate::state::AppState;
use crate::utils::id_generator::validate_id;

async fn apply(
    state: &AppState,
    listing_id: &str,
    event: EngagementEvent,
) -> Result<EngagementOutcome, AppError> {
    validate_id(listing_id)?;

    let outcome = state
        .engagement_service
        .apply(listing_id, event, Utc::now())
        .await?;

    if outcome.applied {
        let _ = state.cache.invalidate_feeds().await;
    }

    Ok(outcome)
}

/// Likes a listing on behalf of a user.
///
/// # Endpoint
///
/// `POST /api/listings/{id}/likes`
///
/// Repeating a like is not an error; the response reports `applied: false`
/// and the counter is unchanged.
///
/// # Errors
///
/// Returns 404 Not Found if the listing does not exist.
pub async fn like_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<LikeRequest>,
) -> Result<Json<EngagementResponse>, AppError> {
    payload.validate()?;

    let outcome = apply(
        &state,
        &id,
        EngagementEvent::LikeAdded {
            user_id: payload.user_id,
        },
    )
    .await?;

    Ok(Json(EngagementResponse {
        applied: outcome.applied,
        listing: outcome.listing.into(),
    }))
}

/// Removes a user's like.
///
/// # Endpoint
///
/// `DELETE /api/listings/{id}/likes/{user_id}`
pub async fn unlike_handler(
    State(state): State<AppState>,
    Path((id, user_id)): Path<(String, String)>,
) -> Result<Json<EngagementResponse>, AppError> {
    validate_id(&user_id)?;

    let outcome = apply(&state, &id, EngagementEvent::LikeRemoved { user_id }).await?;

    Ok(Json(EngagementResponse {
        applied: outcome.applied,
        listing: outcome.listing.into(),
    }))
}

/// Adds a comment.
///
/// # Endpoint
///
/// `POST /api/listings/{id}/comments`
///
/// # Errors
///
/// Returns 400 Bad Request for an empty comment, 404 Not Found for an
/// unknown listing.
pub async fn create_comment_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<CommentRequest>,
) -> Result<(StatusCode, Json<CommentCreatedResponse>), AppError> {
    payload.validate()?;

    let outcome = apply(
        &state,
        &id,
        EngagementEvent::CommentAdded {
            user_id: payload.user_id,
            username: payload.username,
            content: payload.content,
        },
    )
    .await?;

    let comment = outcome.comment.ok_or_else(|| {
        AppError::internal("Comment was not stored", serde_json::json!({ "id": id }))
    })?;

    Ok((
        StatusCode::CREATED,
        Json(CommentCreatedResponse {
            comment,
            listing: outcome.listing.into(),
        }),
    ))
}

/// Lists a listing's comments, oldest first.
///
/// # Endpoint
///
/// `GET /api/listings/{id}/comments`
pub async fn list_comments_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<CommentListResponse>, AppError> {
    validate_id(&id)?;

    let items = state.engagement_service.comments(&id).await?;

    Ok(Json(CommentListResponse {
        listing_id: id,
        total: items.len(),
        items,
    }))
}

/// Records a repost.
///
/// # Endpoint
///
/// `POST /api/listings/{id}/reposts`
pub async fn repost_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<EngagementResponse>, AppError> {
    let outcome = apply(&state, &id, EngagementEvent::Reposted).await?;

    Ok(Json(EngagementResponse {
        applied: outcome.applied,
        listing: outcome.listing.into(),
    }))
}

/// Queues a preview view.
///
/// # Endpoint
///
/// `POST /api/listings/{id}/views`
///
/// Always answers `202 Accepted` for a well-formed id. When the queue is full
/// the view is dropped and `queued` is `false`.
pub async fn view_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<(StatusCode, Json<ViewQueuedResponse>), AppError> {
    validate_id(&id)?;

    let queued = match state
        .engagement_sender
        .try_send(QueuedEngagement::new(id.clone(), EngagementEvent::Viewed))
    {
        Ok(()) => true,
        Err(TrySendError::Full(_)) => {
            metrics::counter!("engagement_queue_dropped_total", "reason" => "full").increment(1);
            tracing::warn!(listing_id = %id, "Engagement queue full, view dropped");
            false
        }
        Err(TrySendError::Closed(_)) => {
            metrics::counter!("engagement_queue_dropped_total", "reason" => "closed").increment(1);
            tracing::error!(listing_id = %id, "Engagement queue closed, view dropped");
            false
        }
    };

    Ok((
        StatusCode::ACCEPTED,
        Json(ViewQueuedResponse {
            listing_id: id,
            queued,
        }),
    ))
}

/// Lists the likes on a listing.
///
/// # Endpoint
///
/// `GET /api/listings/{id}/likes`
///
/// # Errors
///
/// Returns 404 Not Found if the listing does not exist.
pub async fn list_likes_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<LikeListResponse>, AppError> {
    validate_id(&id)?;

    let items = state.engagement_service.likes(&id).await?;

    Ok(Json(LikeListResponse {
        listing_id: id,
        total: items.len(),
        items,
    }))
}

/// Reports whether a user likes a listing.
///
/// # Endpoint
///
/// `GET /api/listings/{id}/likes/{user_id}`
///
/// ```json
/// { "listing_id": "Xk3p9QaB7wLm2TzR", "user_id": "u1", "liked": false }
/// ```
///
/// # Errors
///
/// Returns 404 Not Found if the listing does not exist.
pub async fn user_like_handler(
    State(state): State<AppState>,
    Path((id, user_id)): Path<(String, String)>,
) -> Result<Json<UserLikeResponse>, AppError> {
    validate_id(&id)?;
    validate_id(&user_id)?;

    let like = state.engagement_service.user_like(&id, &user_id).await?;

    Ok(Json(UserLikeResponse {
        listing_id: id,
        user_id,
        liked: like.is_some(),
        like,
    }))
}

/// Lists a user's comments across all listings, newest first.
///
/// # Endpoint
///
/// `GET /api/users/{user_id}/comments`
pub async fn user_comments_handler(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<UserCommentsResponse>, AppError> {
    validate_id(&user_id)?;

    let items = state.engagement_service.comments_by_user(&user_id).await?;

    Ok(Json(UserCommentsResponse {
        user_id,
        total: items.len(),
        items,
    }))
}
