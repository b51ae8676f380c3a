use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::domain::entities::{Like, NewLike};
use crate::domain::repositories::LikeRepository;
use crate::error::AppError;
use crate::utils::id_generator::generate_id;

/// Like store keyed by `(listing_id, user_id)`.
#[derive(Default)]
pub struct InMemoryLikeRepository {
    likes: RwLock<HashMap<(String, String), Like>>,
}

impl InMemoryLikeRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LikeRepository for InMemoryLikeRepository {
    async fn create(&self, new_like: NewLike) -> Result<Like, AppError> {
        let key = (new_like.listing_id.clone(), new_like.user_id.clone());
        let mut likes = self.likes.write().await;
        if likes.contains_key(&key) {
            return Err(AppError::conflict(
                "Listing already liked by this user",
                json!({ "listing_id": new_like.listing_id, "user_id": new_like.user_id }),
            ));
        }

        let like = Like {
            id: generate_id()?,
            listing_id: new_like.listing_id,
            user_id: new_like.user_id,
            created_at: Utc::now(),
        };
        likes.insert(key, like.clone());
        Ok(like)
    }

    async fn find(&self, listing_id: &str, user_id: &str) -> Result<Option<Like>, AppError> {
        let key = (listing_id.to_string(), user_id.to_string());
        Ok(self.likes.read().await.get(&key).cloned())
    }

    async fn delete(&self, listing_id: &str, user_id: &str) -> Result<bool, AppError> {
        let key = (listing_id.to_string(), user_id.to_string());
        Ok(self.likes.write().await.remove(&key).is_some())
    }

    async fn list_by_listing(&self, listing_id: &str) -> Result<Vec<Like>, AppError> {
        let mut found: Vec<Like> = self
            .likes
            .read()
            .await
            .values()
            .filter(|l| l.listing_id == listing_id)
            .cloned()
            .collect();
        found.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(found)
    }
}
