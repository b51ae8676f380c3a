//! DTOs for ranking endpoints.

use serde::Serialize;

use crate::domain::ranking::ScoreBreakdown;

/// Score breakdown of one listing at request time.
#[derive(Debug, Serialize)]
pub struct ScoreExplanationResponse {
    pub listing_id: String,
    /// Rank currently stored for the listing.
    pub stored_rank: Option<f64>,
    pub age_hours: f64,
    pub breakdown: ScoreBreakdown,
}
