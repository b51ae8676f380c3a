//! HTTP server initialization and runtime setup.
//!
//! Handles storage selection, cache setup, background task spawning, and the
//! Axum server lifecycle including graceful shutdown.

use crate::application::workers::{run_engagement_worker, run_ranking_scheduler};
use crate::config::{Config, StorageBackend};
use crate::domain::repositories::{CommentRepository, LikeRepository, ListingRepository};
use crate::infrastructure::cache::{CacheService, NullCache, RedisCache};
use crate::infrastructure::memory::{
    InMemoryCommentRepository, InMemoryLikeRepository, InMemoryListingRepository,
};
use crate::infrastructure::persistence::{
    PgCommentRepository, PgLikeRepository, PgListingRepository,
};
use crate::routes::app_router;
use crate::state::{AppState, ServiceOptions};

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};

/// How long the engagement worker may take to drain its queue on shutdown.
const WORKER_DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

type Repositories = (
    Arc<dyn ListingRepository>,
    Arc<dyn LikeRepository>,
    Arc<dyn CommentRepository>,
);

/// Connects a PostgreSQL pool using the configured pool limits.
///
/// # Errors
///
/// Returns an error if no database URL is configured or the connection fails.
pub async fn connect_pool(config: &Config) -> Result<PgPool> {
    let database_url = config
        .database_url
        .as_deref()
        .context("DATABASE_URL is required for the postgres storage backend")?;

    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
        .idle_timeout(Duration::from_secs(config.db_idle_timeout))
        .max_lifetime(Duration::from_secs(config.db_max_lifetime))
        .connect(database_url)
        .await
        .context("Failed to connect to database")?;

    Ok(pool)
}

/// Builds the repositories for the configured storage backend.
///
/// For PostgreSQL, pending migrations are applied first.
async fn build_repositories(config: &Config) -> Result<Repositories> {
    match config.storage_backend {
        StorageBackend::Postgres => {
            let pool = connect_pool(config).await?;
            tracing::info!("Connected to database");

            sqlx::migrate!("./migrations")
                .run(&pool)
                .await
                .context("Failed to run migrations")?;
            tracing::info!("Migrations applied");

            let pool = Arc::new(pool);
            Ok((
                Arc::new(PgListingRepository::new(pool.clone())),
                Arc::new(PgLikeRepository::new(pool.clone())),
                Arc::new(PgCommentRepository::new(pool)),
            ))
        }
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage; data is lost on restart");
            Ok((
                Arc::new(InMemoryListingRepository::new()),
                Arc::new(InMemoryLikeRepository::new()),
                Arc::new(InMemoryCommentRepository::new()),
            ))
        }
    }
}

/// Connects the feed cache, falling back to [`NullCache`] when Redis is
/// absent or unreachable.
async fn connect_cache(config: &Config) -> Arc<dyn CacheService> {
    let Some(redis_url) = &config.redis_url else {
        tracing::info!("Cache disabled (NullCache)");
        return Arc::new(NullCache::new());
    };

    match RedisCache::connect(redis_url, config.feed_cache_ttl_seconds).await {
        Ok(redis) => {
            tracing::info!("Cache enabled (Redis)");
            Arc::new(redis)
        }
        Err(e) => {
            tracing::warn!("Failed to connect to Redis: {}. Using NullCache.", e);
            Arc::new(NullCache::new())
        }
    }
}

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - Storage (PostgreSQL with migrations, or in-memory)
/// - Redis feed cache (or NullCache fallback)
/// - Background engagement worker
/// - Ranking scheduler (unless disabled)
/// - Axum HTTP server
///
/// On Ctrl+C or SIGTERM the server stops accepting connections, the
/// scheduler is cancelled and the engagement queue is drained.
///
/// # Errors
///
/// Returns an error if:
/// - Database connection or migration fails
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let (listings, likes, comments) = build_repositories(&config).await?;
    let cache = connect_cache(&config).await;

    let (engagement_tx, engagement_rx) = mpsc::channel(config.engagement_queue_capacity);

    let state = AppState::new(
        listings,
        likes,
        comments,
        cache.clone(),
        engagement_tx,
        ServiceOptions {
            sweep_concurrency: config.ranking_sweep_concurrency,
            recompute_on_engagement: config.recompute_on_engagement,
            feed_cache_ttl_seconds: config.feed_cache_ttl_seconds,
        },
    );

    let worker = tokio::spawn(run_engagement_worker(
        engagement_rx,
        state.engagement_service.clone(),
        cache.clone(),
        config.engagement_worker_concurrency,
    ));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let scheduler = if config.is_scheduler_enabled() {
        Some(tokio::spawn(run_ranking_scheduler(
            state.ranking_service.clone(),
            cache,
            Duration::from_secs(config.ranking_sweep_interval_secs),
            shutdown_rx,
        )))
    } else {
        tracing::info!("Ranking scheduler disabled");
        None
    };

    let app = app_router(state, config.behind_proxy);

    let addr: SocketAddr = config.listen_addr.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(
        listener,
        ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(app),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("HTTP server stopped, shutting down background tasks");

    let _ = shutdown_tx.send(true);
    if let Some(scheduler) = scheduler
        && let Err(e) = scheduler.await
    {
        tracing::error!(error = %e, "Ranking scheduler task failed");
    }

    // The router owned the last engagement sender, so the worker exits once
    // the queue is empty.
    match tokio::time::timeout(WORKER_DRAIN_TIMEOUT, worker).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => tracing::error!(error = %e, "Engagement worker task failed"),
        Err(_) => tracing::warn!("Engagement queue not drained before timeout"),
    }

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
