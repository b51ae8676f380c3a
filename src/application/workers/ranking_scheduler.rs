//! Periodic ranking sweeps.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{error, info, warn};

use crate::application::services::{SweepError, SweepReport};
use crate::infrastructure::cache::CacheService;
use crate::state::DynRankingService;

/// Runs one sweep at the current time and drops cached feed pages.
///
/// # Errors
///
/// Returns [`SweepError::StoreRead`] if listings cannot be loaded.
pub async fn run_sweep(
    service: &DynRankingService,
    cache: &dyn CacheService,
) -> Result<SweepReport, SweepError> {
    let report = service.recompute_all(Utc::now()).await?;
    if report.updated > 0 {
        let _ = cache.invalidate_feeds().await;
    }
    Ok(report)
}

/// Sweeps every `interval` until `shutdown` flips to `true`.
///
/// The first sweep runs immediately. Ticks missed while a slow sweep runs are
/// skipped rather than queued. A shutdown during a sweep cancels it; ranks
/// already written stay written.
pub async fn run_ranking_scheduler(
    service: Arc<DynRankingService>,
    cache: Arc<dyn CacheService>,
    interval: Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    info!(interval_secs = interval.as_secs(), "Ranking scheduler started");

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = shutdown.changed() => break,
        }

        tokio::select! {
            result = run_sweep(&service, cache.as_ref()) => match result {
                Ok(report) if !report.is_complete() => {
                    warn!(
                        updated = report.updated,
                        failed = report.failed.len(),
                        "Ranking sweep finished with failures"
                    );
                }
                Ok(_) => {}
                Err(e) => {
                    metrics::counter!("ranking_sweep_aborted_total").increment(1);
                    error!(error = %e, "Ranking sweep aborted");
                }
            },
            _ = shutdown.changed() => {
                warn!("Ranking sweep cancelled by shutdown");
                break;
            }
        }

        if *shutdown.borrow() {
            break;
        }
    }

    info!("Ranking scheduler stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::services::RankingService;
    use crate::domain::entities::{Listing, NewListing};
    use crate::domain::repositories::ListingRepository;
    use crate::infrastructure::cache::NullCache;
    use crate::infrastructure::memory::InMemoryListingRepository;

    #[tokio::test]
    async fn test_scheduler_sweeps_then_stops_on_shutdown() {
        let listing = Listing::from_new("l1".to_string(), NewListing::default(), Utc::now());
        let listings: Arc<dyn ListingRepository> =
            Arc::new(InMemoryListingRepository::with_listings([listing]));
        let service = Arc::new(RankingService::new(listings.clone(), 4));

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let scheduler = tokio::spawn(run_ranking_scheduler(
            service,
            Arc::new(NullCache::new()),
            Duration::from_secs(3600),
            shutdown_rx,
        ));

        let mut ranked = false;
        for _ in 0..50 {
            if listings.find_by_id("l1").await.unwrap().unwrap().rank.is_some() {
                ranked = true;
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert!(ranked);

        shutdown_tx.send(true).unwrap();
        scheduler.await.unwrap();
    }

    #[tokio::test]
    async fn test_run_sweep_reports_all_listings() {
        let now = Utc::now();
        let listings: Arc<dyn ListingRepository> =
            Arc::new(InMemoryListingRepository::with_listings([
                Listing::from_new("a".to_string(), NewListing::default(), now),
                Listing::from_new("b".to_string(), NewListing::default(), now),
            ]));
        let service = RankingService::new(listings, 1);

        let report = run_sweep(&service, &NullCache::new()).await.unwrap();
        assert_eq!(report.total, 2);
        assert!(report.is_complete());
    }
}
