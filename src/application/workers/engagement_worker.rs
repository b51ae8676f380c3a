//! Asynchronous engagement processing with retry.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{Semaphore, mpsc};
use tokio::task::JoinSet;
use tokio_retry::RetryIf;
use tokio_retry::strategy::{ExponentialBackoff, jitter};
use tracing::{debug, info, warn};

use crate::domain::engagement::QueuedEngagement;
use crate::error::AppError;
use crate::infrastructure::cache::CacheService;
use crate::state::DynEngagementService;

const RETRY_BASE_MILLIS: u64 = 50;
const MAX_RETRIES: usize = 3;

/// Consumes queued engagement events until every sender is dropped.
///
/// At most `concurrency` events are applied at once. Transient store errors
/// are retried with jittered exponential backoff; other errors (unknown
/// listing, validation) are logged and the event is dropped.
pub async fn run_engagement_worker(
    mut rx: mpsc::Receiver<QueuedEngagement>,
    service: Arc<DynEngagementService>,
    cache: Arc<dyn CacheService>,
    concurrency: usize,
) {
    let permits = Arc::new(Semaphore::new(concurrency.max(1)));
    let mut tasks = JoinSet::new();

    info!(concurrency, "Engagement worker started");

    while let Some(queued) = rx.recv().await {
        let Ok(permit) = permits.clone().acquire_owned().await else {
            break;
        };

        let service = service.clone();
        let cache = cache.clone();
        tasks.spawn(async move {
            let _permit = permit;
            process(&service, cache.as_ref(), queued).await;
        });

        while tasks.try_join_next().is_some() {}
    }

    while tasks.join_next().await.is_some() {}
    info!("Engagement worker stopped");
}

async fn process(service: &DynEngagementService, cache: &dyn CacheService, queued: QueuedEngagement) {
    let kind = queued.event.kind();
    let strategy = ExponentialBackoff::from_millis(RETRY_BASE_MILLIS)
        .map(jitter)
        .take(MAX_RETRIES);

    let result = RetryIf::spawn(
        strategy,
        || service.apply(&queued.listing_id, queued.event.clone(), Utc::now()),
        |e: &AppError| e.is_transient(),
    )
    .await;

    match result {
        Ok(outcome) => {
            metrics::counter!("engagement_queue_processed_total", "kind" => kind).increment(1);
            debug!(
                listing_id = %queued.listing_id,
                kind,
                applied = outcome.applied,
                queued_ms = (Utc::now() - queued.received_at).num_milliseconds(),
                "Queued engagement applied"
            );
            if outcome.applied {
                let _ = cache.invalidate_feeds().await;
            }
        }
        Err(e) => {
            metrics::counter!("engagement_queue_failed_total", "kind" => kind).increment(1);
            warn!(
                listing_id = %queued.listing_id,
                kind,
                error = %e,
                "Dropping queued engagement"
            );
        }
    }
}
