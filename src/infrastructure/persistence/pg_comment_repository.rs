//! PostgreSQL implementation of the comment repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use std::sync::Arc;

use crate::domain::entities::{Comment, NewComment};
use crate::domain::repositories::CommentRepository;
use crate::error::AppError;
use crate::utils::id_generator::generate_id;

#[derive(Debug, FromRow)]
struct CommentRow {
    id: String,
    listing_id: String,
    user_id: String,
    username: String,
    content: String,
    likes: i64,
    created_at: DateTime<Utc>,
}

impl From<CommentRow> for Comment {
    fn from(r: CommentRow) -> Self {
        Comment {
            id: r.id,
            listing_id: r.listing_id,
            user_id: r.user_id,
            username: r.username,
            content: r.content,
            created_at: r.created_at,
            likes: r.likes,
        }
    }
}

/// PostgreSQL repository for comments.
pub struct PgCommentRepository {
    pool: Arc<PgPool>,
}

impl PgCommentRepository {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CommentRepository for PgCommentRepository {
    async fn create(&self, new_comment: NewComment) -> Result<Comment, AppError> {
        let row = sqlx::query_as::<_, CommentRow>(
            r#"
            INSERT INTO comments (id, listing_id, user_id, username, content)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, listing_id, user_id, username, content, likes, created_at
            "#,
        )
        .bind(generate_id()?)
        .bind(&new_comment.listing_id)
        .bind(&new_comment.user_id)
        .bind(&new_comment.username)
        .bind(&new_comment.content)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(row.into())
    }

    async fn delete(&self, id: &str) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(id)
            .execute(self.pool.as_ref())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_by_listing(&self, listing_id: &str) -> Result<Vec<Comment>, AppError> {
        let rows = sqlx::query_as::<_, CommentRow>(
            r#"
            SELECT id, listing_id, user_id, username, content, likes, created_at
            FROM comments
            WHERE listing_id = $1
            ORDER BY created_at
            "#,
        )
        .bind(listing_id)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows.into_iter().map(Comment::from).collect())
    }

    async fn list_by_user(&self, user_id: &str) -> Result<Vec<Comment>, AppError> {
        let rows = sqlx::query_as::<_, CommentRow>(
            r#"
            SELECT id, listing_id, user_id, username, content, likes, created_at
            FROM comments
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows.into_iter().map(Comment::from).collect())
    }
}
