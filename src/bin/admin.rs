//! CLI administration tool for showcase-feed.
//!
//! Runs ranking maintenance and database checks directly against PostgreSQL,
//! without going through the HTTP API.
//!
//! # Usage
//!
//! ```bash
//! # Recompute every listing's rank now
//! cargo run --bin admin -- rankings recompute
//!
//! # Recompute one listing
//! cargo run --bin admin -- rankings recompute --id Xk3p9QaB7wLm2TzR
//!
//! # Show the top of the ranked feed
//! cargo run --bin admin -- rankings top --limit 10 --category SaaS
//!
//! # Explain one listing's score
//! cargo run --bin admin -- rankings explain Xk3p9QaB7wLm2TzR
//!
//! # Listing and engagement totals
//! cargo run --bin admin -- stats
//!
//! # Check database connection
//! cargo run --bin admin -- db check
//! ```
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` or `DB_HOST`/`DB_USER`/`DB_PASSWORD`/`DB_NAME` (required)
//! - `REDIS_URL` (optional): cached feed pages are dropped after a recompute

use showcase_feed::application::services::{RankingService, SweepReport};
use showcase_feed::config::Config;
use showcase_feed::domain::repositories::{FeedFilter, ListingRepository};
use showcase_feed::infrastructure::cache::{CacheService, RedisCache};
use showcase_feed::infrastructure::persistence::PgListingRepository;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::Confirm;
use sqlx::PgPool;
use std::sync::Arc;

/// CLI tool for managing showcase-feed.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Top-level command groups.
#[derive(Subcommand)]
enum Commands {
    /// Ranking maintenance
    Rankings {
        #[command(subcommand)]
        action: RankingAction,
    },

    /// Show listing and engagement totals
    Stats,

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

#[derive(Subcommand)]
enum RankingAction {
    /// Recompute the rank of every listing
    Recompute {
        /// Recompute only this listing
        #[arg(long)]
        id: Option<String>,

        /// Rank writes in flight at once
        #[arg(short, long, default_value_t = 8)]
        concurrency: usize,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Print the top of the ranked feed
    Top {
        #[arg(short, long, default_value_t = 10)]
        limit: i64,

        /// Restrict to one category
        #[arg(short, long)]
        category: Option<String>,
    },

    /// Print the score breakdown of one listing
    Explain {
        /// Listing id
        id: String,
    },
}

/// Database operation subcommands.
#[derive(Subcommand)]
enum DbAction {
    /// Check database connection
    Check,

    /// Show database info
    Info,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let database_url = Config::load_database_url()?;
    let pool = PgPool::connect(&database_url)
        .await
        .context("Failed to connect to database")?;

    match cli.command {
        Commands::Rankings { action } => handle_ranking_action(action, &pool).await?,
        Commands::Stats => handle_stats(&pool).await?,
        Commands::Db { action } => handle_db_action(action, &pool).await?,
    }

    Ok(())
}

async fn handle_ranking_action(action: RankingAction, pool: &PgPool) -> Result<()> {
    let repo = Arc::new(PgListingRepository::new(Arc::new(pool.clone())));

    match action {
        RankingAction::Recompute {
            id: Some(id),
            concurrency,
            ..
        } => recompute_one(repo, concurrency, &id).await,
        RankingAction::Recompute {
            id: None,
            concurrency,
            yes,
        } => recompute(repo, concurrency, yes).await,
        RankingAction::Top { limit, category } => top(repo, limit, category).await,
        RankingAction::Explain { id } => explain(repo, &id).await,
    }
}

/// Runs one sweep and prints the report.
async fn recompute(repo: Arc<PgListingRepository>, concurrency: usize, yes: bool) -> Result<()> {
    println!("{}", "🔄 Recompute Rankings".bright_blue().bold());
    println!();

    let total = repo
        .count(None)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to count listings: {}", e))?;
    println!("  Listings: {}", total.to_string().bright_white().bold());
    println!();

    if !yes {
        let confirmed = Confirm::new()
            .with_prompt("Recompute every rank now?")
            .default(true)
            .interact()?;

        if !confirmed {
            println!("{}", "❌ Cancelled".red());
            return Ok(());
        }
    }

    let service = RankingService::new(repo, concurrency);
    let report = service
        .recompute_all(Utc::now())
        .await
        .context("Ranking sweep failed")?;

    print_report(&report);
    invalidate_feed_cache().await;

    Ok(())
}

async fn recompute_one(repo: Arc<PgListingRepository>, concurrency: usize, id: &str) -> Result<()> {
    let service = RankingService::new(repo, concurrency);
    let listing = service
        .recompute_one(id, Utc::now())
        .await
        .map_err(|e| anyhow::anyhow!("{}", e))?;

    println!(
        "{} {} ranked {}",
        "✅".green(),
        listing.title.bright_white().bold(),
        format!("{:.2}", listing.rank.unwrap_or_default()).bright_green()
    );

    invalidate_feed_cache().await;
    Ok(())
}

async fn invalidate_feed_cache() {
    if let Ok(redis_url) = std::env::var("REDIS_URL") {
        match RedisCache::connect(&redis_url, 60).await {
            Ok(cache) => {
                let _ = cache.invalidate_feeds().await;
                println!("{}", "  Feed cache invalidated".bright_black());
            }
            Err(e) => println!("{} {}", "⚠️  Feed cache not invalidated:".yellow(), e),
        }
    }
}

fn print_report(report: &SweepReport) {
    println!();
    if report.is_complete() {
        println!("{}", "✅ Sweep completed".green().bold());
    } else {
        println!("{}", "⚠️  Sweep completed with failures".yellow().bold());
    }
    println!("  Total:    {}", report.total.to_string().bright_white());
    println!("  Updated:  {}", report.updated.to_string().bright_green());
    println!(
        "  Failed:   {}",
        report.failed.len().to_string().bright_red()
    );
    println!("  Duration: {} ms", report.duration_ms);

    for failure in &report.failed {
        println!(
            "    {} {}",
            failure.listing_id.cyan(),
            failure.error.message.bright_black()
        );
    }
    println!();
}

/// Prints the ranked feed.
///
/// ```text
/// 🏆 Top Listings
///
///   #   Rank      Title                          Category        ↑    💬   🔁   👁
///   ────────────────────────────────────────────────────────────────────────────────
///   1   83.50     Crypto Dashboard               Dashboard       7    3    1    25
/// ```
async fn top(repo: Arc<PgListingRepository>, limit: i64, category: Option<String>) -> Result<()> {
    println!("{}", "🏆 Top Listings".bright_blue().bold());
    println!();

    let listings = repo
        .list_ranked(FeedFilter::new(0, limit.clamp(1, 100)).with_category(category))
        .await
        .map_err(|e| anyhow::anyhow!("Failed to load feed: {}", e))?;

    if listings.is_empty() {
        println!("{}", "  No listings found".yellow());
        return Ok(());
    }

    println!(
        "  {:<3} {:<9} {:<30} {:<15} {:>4} {:>4} {:>4} {:>6}",
        "#".bright_white().bold(),
        "Rank".bright_white().bold(),
        "Title".bright_white().bold(),
        "Category".bright_white().bold(),
        "↑",
        "💬",
        "🔁",
        "👁"
    );
    println!("  {}", "─".repeat(82).bright_black());

    for (position, listing) in listings.iter().enumerate() {
        let rank = listing
            .rank
            .map(|r| format!("{:.2}", r))
            .unwrap_or_else(|| "-".to_string());

        println!(
            "  {:<3} {:<9} {:<30} {:<15} {:>4} {:>4} {:>4} {:>6}",
            (position + 1).to_string().bright_black(),
            rank.bright_green(),
            truncate(&listing.title, 30).cyan(),
            truncate(&listing.category, 15),
            listing.counts.upvotes,
            listing.counts.comments,
            listing.counts.reposts,
            listing.counts.views
        );
    }
    println!();

    Ok(())
}

/// Prints the per-signal contributions of one listing's score.
async fn explain(repo: Arc<PgListingRepository>, id: &str) -> Result<()> {
    let service = RankingService::new(repo, 1);
    let now = Utc::now();
    let (listing, b) = service
        .explain(id, now)
        .await
        .map_err(|e| anyhow::anyhow!("{}", e))?;

    println!("{} {}", "🔎".bright_blue(), listing.title.bright_white().bold());
    println!("  Age:      {:.1} h", listing.age_hours(now));
    println!(
        "  Upvotes:  {:>5} × 3   = {:>8.2}",
        listing.counts.upvotes, b.upvotes
    );
    println!(
        "  Comments: {:>5} × 2   = {:>8.2}",
        listing.counts.comments, b.comments
    );
    println!(
        "  Reposts:  {:>5} × 4   = {:>8.2}",
        listing.counts.reposts, b.reposts
    );
    println!(
        "  Views:    {:>5} × 0.1 = {:>8.2}",
        listing.counts.views, b.views
    );
    println!("  Recency bonus       = {:>8.2}", b.recency_bonus);
    println!("  {}", "─".repeat(30).bright_black());
    println!(
        "  Score               = {}",
        format!("{:>8.2}", b.total).bright_green().bold()
    );
    match listing.rank {
        Some(rank) if (rank - b.total).abs() > f64::EPSILON => println!(
            "  {} stored rank is {:.2}; run `admin rankings recompute`",
            "⚠️ ".yellow(),
            rank
        ),
        None => println!("  {} listing has no stored rank yet", "⚠️ ".yellow()),
        _ => {}
    }
    println!();

    Ok(())
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{}…", cut)
    }
}

/// Displays listing and engagement totals.
async fn handle_stats(pool: &PgPool) -> Result<()> {
    println!("{}", "📊 Statistics".bright_blue().bold());
    println!();

    let (listings, upvotes, comments, reposts, views, unranked): (i64, i64, i64, i64, i64, i64) =
        sqlx::query_as(
            r#"
            SELECT
                COUNT(*),
                COALESCE(SUM(upvotes), 0)::BIGINT,
                COALESCE(SUM(comments), 0)::BIGINT,
                COALESCE(SUM(reposts), 0)::BIGINT,
                COALESCE(SUM(views), 0)::BIGINT,
                COUNT(*) FILTER (WHERE rank IS NULL)
            FROM listings
            "#,
        )
        .fetch_one(pool)
        .await?;

    println!("  Listings: {}", listings.to_string().bright_green().bold());
    println!("  Unranked: {}", unranked.to_string().yellow());
    println!("  Upvotes:  {}", upvotes.to_string().bright_white());
    println!("  Comments: {}", comments.to_string().bright_white());
    println!("  Reposts:  {}", reposts.to_string().bright_white());
    println!("  Views:    {}", views.to_string().bright_white());
    println!();

    Ok(())
}

/// Handles database diagnostic commands.
async fn handle_db_action(action: DbAction, pool: &PgPool) -> Result<()> {
    match action {
        DbAction::Check => {
            println!("{}", "🔍 Checking database connection...".bright_blue());

            sqlx::query("SELECT 1").fetch_one(pool).await?;

            println!("{}", "✅ Database connection OK".green().bold());
        }
        DbAction::Info => {
            println!("{}", "ℹ️  Database Information".bright_blue().bold());
            println!();

            let version: String = sqlx::query_scalar("SELECT version()")
                .fetch_one(pool)
                .await?;

            let applied: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations")
                .fetch_one(pool)
                .await
                .unwrap_or(0);

            println!("  PostgreSQL: {}", version.bright_white());
            println!("  Migrations: {}", applied.to_string().bright_white());
            println!();
        }
    }

    Ok(())
}
