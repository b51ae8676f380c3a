//! PostgreSQL implementation of the like repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::json;
use sqlx::{FromRow, PgPool};
use std::sync::Arc;

use crate::domain::entities::{Like, NewLike};
use crate::domain::repositories::LikeRepository;
use crate::error::AppError;
use crate::utils::id_generator::generate_id;

#[derive(Debug, FromRow)]
struct LikeRow {
    id: String,
    listing_id: String,
    user_id: String,
    created_at: DateTime<Utc>,
}

impl From<LikeRow> for Like {
    fn from(r: LikeRow) -> Self {
        Like {
            id: r.id,
            listing_id: r.listing_id,
            user_id: r.user_id,
            created_at: r.created_at,
        }
    }
}

/// PostgreSQL repository for likes.
///
/// Uniqueness per `(listing_id, user_id)` is enforced by a table constraint.
pub struct PgLikeRepository {
    pool: Arc<PgPool>,
}

impl PgLikeRepository {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LikeRepository for PgLikeRepository {
    async fn create(&self, new_like: NewLike) -> Result<Like, AppError> {
        let row = sqlx::query_as::<_, LikeRow>(
            r#"
            INSERT INTO likes (id, listing_id, user_id)
            VALUES ($1, $2, $3)
            ON CONFLICT (listing_id, user_id) DO NOTHING
            RETURNING id, listing_id, user_id, created_at
            "#,
        )
        .bind(generate_id()?)
        .bind(&new_like.listing_id)
        .bind(&new_like.user_id)
        .fetch_optional(self.pool.as_ref())
        .await?;

        row.map(Like::from).ok_or_else(|| {
            AppError::conflict(
                "Listing already liked by this user",
                json!({ "listing_id": new_like.listing_id, "user_id": new_like.user_id }),
            )
        })
    }

    async fn find(&self, listing_id: &str, user_id: &str) -> Result<Option<Like>, AppError> {
        let row = sqlx::query_as::<_, LikeRow>(
            r#"
            SELECT id, listing_id, user_id, created_at
            FROM likes
            WHERE listing_id = $1 AND user_id = $2
            "#,
        )
        .bind(listing_id)
        .bind(user_id)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(Like::from))
    }

    async fn delete(&self, listing_id: &str, user_id: &str) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM likes WHERE listing_id = $1 AND user_id = $2")
            .bind(listing_id)
            .bind(user_id)
            .execute(self.pool.as_ref())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_by_listing(&self, listing_id: &str) -> Result<Vec<Like>, AppError> {
        let rows = sqlx::query_as::<_, LikeRow>(
            r#"
            SELECT id, listing_id, user_id, created_at
            FROM likes
            WHERE listing_id = $1
            ORDER BY created_at
            "#,
        )
        .bind(listing_id)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows.into_iter().map(Like::from).collect())
    }
}
