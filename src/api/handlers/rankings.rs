//! Handlers for ranking maintenance.

use axum::{
    Json,
    extract::{Path, State},
};
use chrono::Utc;
use serde_json::json;

use crate::api::dto::rankings::ScoreExplanationResponse;
use crate::application::services::SweepReport;
use crate::application::workers::run_sweep;
use crate::error::AppError;
use crate::state::AppState;
use crate::utils::id_generator::validate_id;

/// Recomputes every listing's rank now.
///
/// # Endpoint
///
/// `POST /api/rankings/refresh`
///
/// Per-listing write failures are reported in `failed` and do not fail the
/// request.
///
/// # Errors
///
/// Returns 500 Internal Server Error if listings cannot be loaded.
pub async fn refresh_rankings_handler(
    State(state): State<AppState>,
) -> Result<Json<SweepReport>, AppError> {
    let report = run_sweep(&state.ranking_service, state.cache.as_ref())
        .await
        .map_err(|e| AppError::internal("Ranking sweep failed", json!({ "reason": e.to_string() })))?;

    Ok(Json(report))
}

/// Explains how a listing's score is made up at request time.
///
/// # Endpoint
///
/// `GET /api/rankings/{id}`
pub async fn explain_rank_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ScoreExplanationResponse>, AppError> {
    validate_id(&id)?;

    let now = Utc::now();
    let (listing, breakdown) = state.ranking_service.explain(&id, now).await?;

    Ok(Json(ScoreExplanationResponse {
        age_hours: (listing.age_hours(now) * 100.0).round() / 100.0,
        listing_id: listing.id,
        stored_rank: listing.rank,
        breakdown,
    }))
}
