//! Rank recomputation for single listings and full sweeps.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::json;
use tokio::task::{self, JoinError, JoinSet};
use tracing::{debug, info, warn};

use crate::domain::entities::Listing;
use crate::domain::ranking::{self, ScoreBreakdown};
use crate::domain::repositories::ListingRepository;
use crate::error::{AppError, ErrorInfo};

/// Errors that abort a whole sweep.
#[derive(Debug, thiserror::Error)]
pub enum SweepError {
    /// Listings could not be fetched; nothing was recomputed.
    #[error("failed to load listings for ranking sweep: {0}")]
    StoreRead(#[source] AppError),
}

/// A listing whose recomputed rank could not be persisted.
#[derive(Debug, Clone, Serialize)]
pub struct SweepFailure {
    pub listing_id: String,
    pub error: ErrorInfo,
}

/// Outcome of one ranking sweep.
#[derive(Debug, Clone, Serialize)]
pub struct SweepReport {
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub total: usize,
    pub updated: usize,
    pub failed: Vec<SweepFailure>,
    pub duration_ms: u64,
}

impl SweepReport {
    /// True when every listing was persisted.
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty() && self.updated == self.total
    }
}

/// Service computing and persisting listing ranks.
///
/// Scores depend only on a listing's own counters, its creation time and the
/// `now` passed in, so listings are recomputed independently and in any order.
pub struct RankingService<L: ListingRepository + ?Sized> {
    repository: Arc<L>,
    concurrency: usize,
}

impl<L: ListingRepository + ?Sized + 'static> RankingService<L> {
    /// Creates a ranking service writing at most `concurrency` ranks at once.
    pub fn new(repository: Arc<L>, concurrency: usize) -> Self {
        Self {
            repository,
            concurrency: concurrency.max(1),
        }
    }

    /// Recomputes and persists the rank of one listing by id.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the listing does not exist.
    /// Returns [`AppError::Internal`] on storage errors.
    pub async fn recompute_one(&self, id: &str, now: DateTime<Utc>) -> Result<Listing, AppError> {
        let listing = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("Listing not found", json!({ "id": id })))?;

        self.recompute_listing(listing, now).await
    }

    /// Recomputes and persists the rank of an already loaded listing.
    ///
    /// # Errors
    ///
    /// Returns the store's error if the rank cannot be written.
    pub async fn recompute_listing(
        &self,
        mut listing: Listing,
        now: DateTime<Utc>,
    ) -> Result<Listing, AppError> {
        let rank = ranking::compute_score(&listing, now);
        self.repository.update_rank(&listing.id, rank).await?;

        debug!(listing_id = %listing.id, rank, "Listing rank updated");
        listing.rank = Some(rank);
        Ok(listing)
    }

    /// Returns the score breakdown of one listing without persisting it.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the listing does not exist.
    pub async fn explain(
        &self,
        id: &str,
        now: DateTime<Utc>,
    ) -> Result<(Listing, ScoreBreakdown), AppError> {
        let listing = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("Listing not found", json!({ "id": id })))?;

        let breakdown = ranking::breakdown(&listing.counts, listing.created_at, now);
        Ok((listing, breakdown))
    }

    /// Recomputes the rank of every listing.
    ///
    /// Each listing is processed exactly once. A failed write is recorded in
    /// the report and does not stop the remaining listings. Dropping the
    /// returned future cancels the sweep between writes.
    ///
    /// # Errors
    ///
    /// Returns [`SweepError::StoreRead`] if listings cannot be fetched.
    pub async fn recompute_all(&self, now: DateTime<Utc>) -> Result<SweepReport, SweepError> {
        let started_at = Utc::now();
        let timer = Instant::now();

        let listings = self
            .repository
            .list_all()
            .await
            .map_err(SweepError::StoreRead)?;

        let total = listings.len();
        info!(total, concurrency = self.concurrency, "Starting ranking sweep");

        let mut updated = 0;
        let mut failed = Vec::new();
        let mut tasks = JoinSet::new();
        let mut in_flight: HashMap<task::Id, String> = HashMap::new();

        for listing in listings {
            if tasks.len() >= self.concurrency
                && let Some(joined) = tasks.join_next_with_id().await
            {
                record_write(joined, &mut in_flight, &mut updated, &mut failed);
            }

            let rank = ranking::compute_score(&listing, now);
            let repository = Arc::clone(&self.repository);
            let id = listing.id.clone();
            let handle = tasks.spawn(async move { repository.update_rank(&id, rank).await });
            in_flight.insert(handle.id(), listing.id);
        }

        while let Some(joined) = tasks.join_next_with_id().await {
            record_write(joined, &mut in_flight, &mut updated, &mut failed);
        }

        let duration_ms = timer.elapsed().as_millis() as u64;

        metrics::counter!("ranking_sweep_listings_total", "outcome" => "updated")
            .increment(updated as u64);
        metrics::counter!("ranking_sweep_listings_total", "outcome" => "failed")
            .increment(failed.len() as u64);
        metrics::histogram!("ranking_sweep_duration_ms").record(duration_ms as f64);

        info!(
            total,
            updated,
            failed = failed.len(),
            duration_ms,
            "Ranking sweep completed"
        );

        Ok(SweepReport {
            started_at,
            completed_at: Utc::now(),
            total,
            updated,
            failed,
            duration_ms,
        })
    }
}

fn record_write(
    joined: Result<(task::Id, Result<(), AppError>), JoinError>,
    in_flight: &mut HashMap<task::Id, String>,
    updated: &mut usize,
    failed: &mut Vec<SweepFailure>,
) {
    let (task_id, result) = match joined {
        Ok((task_id, result)) => (task_id, result),
        Err(e) => {
            let reason = e.to_string();
            (
                e.id(),
                Err(AppError::internal(
                    "Rank write task aborted",
                    json!({ "reason": reason }),
                )),
            )
        }
    };
    let listing_id = in_flight.remove(&task_id).unwrap_or_default();

    match result {
        Ok(()) => *updated += 1,
        Err(e) => {
            warn!(listing_id = %listing_id, error = %e, "Failed to persist listing rank");
            failed.push(SweepFailure {
                listing_id,
                error: e.to_error_info(),
            });
        }
    }
}
