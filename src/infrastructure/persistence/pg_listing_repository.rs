//! PostgreSQL implementation of the listing repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::json;
use sqlx::{FromRow, PgPool};
use std::sync::Arc;

use crate::domain::entities::{EngagementCounter, EngagementCounts, Listing};
use crate::domain::repositories::{FeedFilter, ListingRepository};
use crate::error::AppError;

const LISTING_COLUMNS: &str = "id, title, description, long_description, website_url, image_url, \
     category, creator_id, creator_name, creator_email, technologies, additional_images, \
     upvotes, comments, reposts, views, rank, created_at";

#[derive(Debug, FromRow)]
struct ListingRow {
    id: String,
    title: String,
    description: String,
    long_description: String,
    website_url: String,
    image_url: String,
    category: String,
    creator_id: String,
    creator_name: String,
    creator_email: String,
    technologies: Vec<String>,
    additional_images: Vec<String>,
    upvotes: i64,
    comments: i64,
    reposts: i64,
    views: i64,
    rank: Option<f64>,
    created_at: DateTime<Utc>,
}

impl From<ListingRow> for Listing {
    fn from(r: ListingRow) -> Self {
        Listing {
            id: r.id,
            title: r.title,
            description: r.description,
            long_description: r.long_description,
            website_url: r.website_url,
            image_url: r.image_url,
            category: r.category,
            creator_id: r.creator_id,
            creator_name: r.creator_name,
            creator_email: r.creator_email,
            created_at: r.created_at,
            counts: EngagementCounts::new(r.upvotes, r.comments, r.reposts, r.views),
            technologies: r.technologies,
            additional_images: r.additional_images,
            rank: r.rank,
        }
    }
}

/// PostgreSQL repository for listings, counters and ranks.
///
/// Counter updates are single `UPDATE` statements, so concurrent events on the
/// same listing never lose increments.
pub struct PgListingRepository {
    pool: Arc<PgPool>,
}

impl PgListingRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ListingRepository for PgListingRepository {
    async fn create(&self, listing: Listing) -> Result<Listing, AppError> {
        let sql = format!(
            r#"
            INSERT INTO listings (
                id, title, description, long_description, website_url, image_url,
                category, creator_id, creator_name, creator_email, technologies,
                additional_images, upvotes, comments, reposts, views, rank, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18)
            RETURNING {LISTING_COLUMNS}
            "#
        );

        let row = sqlx::query_as::<_, ListingRow>(&sql)
            .bind(&listing.id)
            .bind(&listing.title)
            .bind(&listing.description)
            .bind(&listing.long_description)
            .bind(&listing.website_url)
            .bind(&listing.image_url)
            .bind(&listing.category)
            .bind(&listing.creator_id)
            .bind(&listing.creator_name)
            .bind(&listing.creator_email)
            .bind(&listing.technologies)
            .bind(&listing.additional_images)
            .bind(listing.counts.upvotes.max(0))
            .bind(listing.counts.comments.max(0))
            .bind(listing.counts.reposts.max(0))
            .bind(listing.counts.views.max(0))
            .bind(listing.rank)
            .bind(listing.created_at)
            .fetch_one(self.pool.as_ref())
            .await?;

        Ok(row.into())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Listing>, AppError> {
        let sql = format!("SELECT {LISTING_COLUMNS} FROM listings WHERE id = $1");

        let row = sqlx::query_as::<_, ListingRow>(&sql)
            .bind(id)
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(row.map(Listing::from))
    }

    async fn list_all(&self) -> Result<Vec<Listing>, AppError> {
        let sql = format!("SELECT {LISTING_COLUMNS} FROM listings ORDER BY created_at DESC");

        let rows = sqlx::query_as::<_, ListingRow>(&sql)
            .fetch_all(self.pool.as_ref())
            .await?;

        Ok(rows.into_iter().map(Listing::from).collect())
    }

    async fn list_by_creator(&self, creator_id: &str) -> Result<Vec<Listing>, AppError> {
        let sql = format!(
            "SELECT {LISTING_COLUMNS} FROM listings WHERE creator_id = $1 ORDER BY created_at DESC"
        );

        let rows = sqlx::query_as::<_, ListingRow>(&sql)
            .bind(creator_id)
            .fetch_all(self.pool.as_ref())
            .await?;

        Ok(rows.into_iter().map(Listing::from).collect())
    }

    async fn list_by_category(&self, category: &str) -> Result<Vec<Listing>, AppError> {
        let sql = format!(
            r#"
            SELECT {LISTING_COLUMNS} FROM listings
            WHERE category = $1
            ORDER BY rank DESC NULLS LAST, created_at DESC
            "#
        );

        let rows = sqlx::query_as::<_, ListingRow>(&sql)
            .bind(category)
            .fetch_all(self.pool.as_ref())
            .await?;

        Ok(rows.into_iter().map(Listing::from).collect())
    }

    async fn list_ranked(&self, filter: FeedFilter) -> Result<Vec<Listing>, AppError> {
        let sql = format!(
            r#"
            SELECT {LISTING_COLUMNS} FROM listings
            WHERE ($1::text IS NULL OR category = $1)
            ORDER BY rank DESC NULLS LAST, created_at DESC
            LIMIT $2 OFFSET $3
            "#
        );

        let rows = sqlx::query_as::<_, ListingRow>(&sql)
            .bind(filter.category)
            .bind(filter.limit)
            .bind(filter.offset)
            .fetch_all(self.pool.as_ref())
            .await?;

        Ok(rows.into_iter().map(Listing::from).collect())
    }

    async fn count(&self, category: Option<String>) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM listings WHERE ($1::text IS NULL OR category = $1)",
        )
        .bind(category)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(count)
    }

    async fn update_rank(&self, id: &str, rank: f64) -> Result<(), AppError> {
        let result = sqlx::query("UPDATE listings SET rank = $2 WHERE id = $1")
            .bind(id)
            .bind(rank)
            .execute(self.pool.as_ref())
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(
                "Listing not found",
                json!({ "id": id }),
            ));
        }

        Ok(())
    }

    async fn adjust_counter(
        &self,
        id: &str,
        counter: EngagementCounter,
        delta: i64,
    ) -> Result<Listing, AppError> {
        // Column names come from a closed enum, never from input.
        let column = counter.column();
        let sql = format!(
            "UPDATE listings SET {column} = GREATEST({column} + $2, 0) WHERE id = $1 \
             RETURNING {LISTING_COLUMNS}"
        );

        let row = sqlx::query_as::<_, ListingRow>(&sql)
            .bind(id)
            .bind(delta)
            .fetch_optional(self.pool.as_ref())
            .await?;

        row.map(Listing::from)
            .ok_or_else(|| AppError::not_found("Listing not found", json!({ "id": id })))
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1")
            .execute(self.pool.as_ref())
            .await?;
        Ok(())
    }
}
