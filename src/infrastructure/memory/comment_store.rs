use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::domain::entities::{Comment, NewComment};
use crate::domain::repositories::CommentRepository;
use crate::error::AppError;
use crate::utils::id_generator::generate_id;

/// Append-only comment store.
#[derive(Default)]
pub struct InMemoryCommentRepository {
    comments: RwLock<Vec<Comment>>,
}

impl InMemoryCommentRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CommentRepository for InMemoryCommentRepository {
    async fn create(&self, new_comment: NewComment) -> Result<Comment, AppError> {
        let comment = Comment {
            id: generate_id()?,
            listing_id: new_comment.listing_id,
            user_id: new_comment.user_id,
            username: new_comment.username,
            content: new_comment.content,
            created_at: Utc::now(),
            likes: 0,
        };
        self.comments.write().await.push(comment.clone());
        Ok(comment)
    }

    async fn delete(&self, id: &str) -> Result<bool, AppError> {
        let mut comments = self.comments.write().await;
        let before = comments.len();
        comments.retain(|c| c.id != id);
        Ok(comments.len() != before)
    }

    async fn list_by_listing(&self, listing_id: &str) -> Result<Vec<Comment>, AppError> {
        Ok(self
            .comments
            .read()
            .await
            .iter()
            .filter(|c| c.listing_id == listing_id)
            .cloned()
            .collect())
    }

    async fn list_by_user(&self, user_id: &str) -> Result<Vec<Comment>, AppError> {
        Ok(self
            .comments
            .read()
            .await
            .iter()
            .rev()
            .filter(|c| c.user_id == user_id)
            .cloned()
            .collect())
    }
}
