//! Applies engagement events to listings and keeps ranks fresh.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::json;
use tracing::{debug, error, warn};

use crate::application::services::RankingService;
use crate::domain::engagement::EngagementEvent;
use crate::domain::entities::{Comment, Like, Listing, NewComment, NewLike};
use crate::domain::repositories::{CommentRepository, LikeRepository, ListingRepository};
use crate::error::AppError;

/// Result of applying one engagement event.
#[derive(Debug, Clone)]
pub struct EngagementOutcome {
    /// The listing after the event (and recompute, when enabled).
    pub listing: Listing,
    /// False when the event was a no-op, e.g. a repeated like.
    pub applied: bool,
    /// The stored comment for `CommentAdded` events.
    pub comment: Option<Comment>,
}

/// Like or comment row written before the counter update.
#[derive(Debug)]
enum EntityWrite {
    Nothing,
    LikeCreated(String),
    LikeDeleted(String),
    CommentCreated(String),
}

/// Single entry point for every counter mutation.
///
/// Each event adjusts exactly one counter, then (unless disabled) recomputes
/// the listing's rank. If the counter update fails, the like or comment row
/// written for the event is removed or restored again. The counter change and
/// the rank write are separate store operations; a failed rank write is
/// logged and left for the next sweep.
pub struct EngagementService<L, K, C>
where
    L: ListingRepository + ?Sized,
    K: LikeRepository + ?Sized,
    C: CommentRepository + ?Sized,
{
    listings: Arc<L>,
    likes: Arc<K>,
    comments: Arc<C>,
    ranking: Arc<RankingService<L>>,
    recompute_on_engagement: bool,
}

impl<L, K, C> EngagementService<L, K, C>
where
    L: ListingRepository + ?Sized + 'static,
    K: LikeRepository + ?Sized,
    C: CommentRepository + ?Sized,
{
    /// Creates a new engagement service.
    pub fn new(
        listings: Arc<L>,
        likes: Arc<K>,
        comments: Arc<C>,
        ranking: Arc<RankingService<L>>,
        recompute_on_engagement: bool,
    ) -> Self {
        Self {
            listings,
            likes,
            comments,
            ranking,
            recompute_on_engagement,
        }
    }

    /// Applies one event to a listing.
    ///
    /// A like from a user who already likes the listing, and an unlike from a
    /// user who does not, are collapsed into no-ops (`applied == false`).
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the listing does not exist.
    /// Returns [`AppError::Validation`] for an empty comment.
    /// Returns [`AppError::Internal`] on storage errors.
    pub async fn apply(
        &self,
        listing_id: &str,
        event: EngagementEvent,
        now: DateTime<Utc>,
    ) -> Result<EngagementOutcome, AppError> {
        let listing = self.load(listing_id).await?;
        let counter = event.counter();
        let delta = event.delta();
        let kind = event.kind();

        let mut comment = None;
        let (applied, written) = match event {
            EngagementEvent::LikeAdded { user_id } => {
                match self.likes.create(NewLike::new(listing_id, user_id.clone())).await {
                    Ok(_) => (true, EntityWrite::LikeCreated(user_id)),
                    Err(AppError::Conflict { .. }) => (false, EntityWrite::Nothing),
                    Err(e) => return Err(e),
                }
            }
            EngagementEvent::LikeRemoved { user_id } => {
                let removed = self.likes.delete(listing_id, &user_id).await?;
                (removed, EntityWrite::LikeDeleted(user_id))
            }
            EngagementEvent::CommentAdded {
                user_id,
                username,
                content,
            } => {
                let content = content.trim().to_string();
                if content.is_empty() {
                    return Err(AppError::bad_request(
                        "Comment must not be empty",
                        json!({ "field": "content" }),
                    ));
                }
                let created = self
                    .comments
                    .create(NewComment {
                        listing_id: listing_id.to_string(),
                        user_id,
                        username,
                        content,
                    })
                    .await?;
                let id = created.id.clone();
                comment = Some(created);
                (true, EntityWrite::CommentCreated(id))
            }
            EngagementEvent::Reposted | EngagementEvent::Viewed => (true, EntityWrite::Nothing),
        };

        if !applied {
            debug!(listing_id, kind, "Engagement event collapsed");
            return Ok(EngagementOutcome {
                listing,
                applied,
                comment,
            });
        }

        let mut listing = match self.listings.adjust_counter(listing_id, counter, delta).await {
            Ok(listing) => listing,
            Err(e) => {
                self.undo(listing_id, written).await;
                return Err(e);
            }
        };

        metrics::counter!("engagement_events_total", "kind" => kind).increment(1);

        if self.recompute_on_engagement {
            match self.ranking.recompute_listing(listing.clone(), now).await {
                Ok(ranked) => listing = ranked,
                Err(e) => {
                    warn!(listing_id, kind, error = %e, "Rank recompute after engagement failed");
                }
            }
        }

        Ok(EngagementOutcome {
            listing,
            applied,
            comment,
        })
    }

    /// Returns a user's like on a listing, if any.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the listing does not exist.
    pub async fn user_like(&self, listing_id: &str, user_id: &str) -> Result<Option<Like>, AppError> {
        self.load(listing_id).await?;
        self.likes.find(listing_id, user_id).await
    }

    /// Returns a listing's likes.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the listing does not exist.
    pub async fn likes(&self, listing_id: &str) -> Result<Vec<Like>, AppError> {
        self.load(listing_id).await?;
        self.likes.list_by_listing(listing_id).await
    }

    /// Returns a listing's comments.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the listing does not exist.
    pub async fn comments(&self, listing_id: &str) -> Result<Vec<Comment>, AppError> {
        self.load(listing_id).await?;
        self.comments.list_by_listing(listing_id).await
    }

    /// Returns a user's comments across all listings.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on storage errors.
    pub async fn comments_by_user(&self, user_id: &str) -> Result<Vec<Comment>, AppError> {
        self.comments.list_by_user(user_id).await
    }

    /// Reverts the like or comment write of an event whose counter update
    /// failed, so a retry of the same request is applied again.
    async fn undo(&self, listing_id: &str, written: EntityWrite) {
        let result = match &written {
            EntityWrite::Nothing => return,
            EntityWrite::LikeCreated(user_id) => {
                self.likes.delete(listing_id, user_id).await.map(|_| ())
            }
            EntityWrite::LikeDeleted(user_id) => self
                .likes
                .create(NewLike::new(listing_id, user_id.clone()))
                .await
                .map(|_| ()),
            EntityWrite::CommentCreated(id) => self.comments.delete(id).await.map(|_| ()),
        };

        match result {
            Ok(()) => debug!(listing_id, ?written, "Engagement write undone"),
            Err(e) => error!(
                listing_id,
                ?written,
                error = %e,
                "Failed to undo engagement write; like or comment rows and counter disagree"
            ),
        }
    }

    async fn load(&self, listing_id: &str) -> Result<Listing, AppError> {
        self.listings
            .find_by_id(listing_id)
            .await?
            .ok_or_else(|| AppError::not_found("Listing not found", json!({ "id": listing_id })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{EngagementCounter, EngagementCounts, NewListing};
    use crate::domain::repositories::{
        MockCommentRepository, MockLikeRepository, MockListingRepository,
    };
    use crate::infrastructure::memory::{InMemoryCommentRepository, InMemoryLikeRepository};
    use mockall::predicate::eq;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn listing(counts: EngagementCounts) -> Listing {
        let mut listing = Listing::from_new("l1".to_string(), NewListing::default(), Utc::now());
        listing.counts = counts;
        listing
    }

    fn service(
        listings: MockListingRepository,
        likes: MockLikeRepository,
        comments: MockCommentRepository,
        recompute: bool,
    ) -> EngagementService<MockListingRepository, MockLikeRepository, MockCommentRepository> {
        let listings = Arc::new(listings);
        let ranking = Arc::new(RankingService::new(listings.clone(), 1));
        EngagementService::new(
            listings,
            Arc::new(likes),
            Arc::new(comments),
            ranking,
            recompute,
        )
    }

    fn existing(repo: &mut MockListingRepository, counts: EngagementCounts) {
        let stored = listing(counts);
        repo.expect_find_by_id()
            .returning(move |_| Ok(Some(stored.clone())));
    }

    #[tokio::test]
    async fn test_like_increments_upvotes_and_recomputes() {
        let mut listings = MockListingRepository::new();
        existing(&mut listings, EngagementCounts::default());
        listings
            .expect_adjust_counter()
            .with(eq("l1"), eq(EngagementCounter::Upvotes), eq(1))
            .times(1)
            .returning(|_, _, _| Ok(listing(EngagementCounts::new(1, 0, 0, 0))));
        listings
            .expect_update_rank()
            .withf(|id, rank| id == "l1" && *rank == 53.0)
            .times(1)
            .returning(|_, _| Ok(()));

        let mut likes = MockLikeRepository::new();
        likes.expect_create().times(1).returning(|new_like| {
            Ok(Like {
                id: "like-1".to_string(),
                listing_id: new_like.listing_id,
                user_id: new_like.user_id,
                created_at: Utc::now(),
            })
        });

        let svc = service(listings, likes, MockCommentRepository::new(), true);
        let outcome = svc
            .apply(
                "l1",
                EngagementEvent::LikeAdded {
                    user_id: "u1".to_string(),
                },
                Utc::now(),
            )
            .await
            .unwrap();

        assert!(outcome.applied);
        assert_eq!(outcome.listing.counts.upvotes, 1);
        assert_eq!(outcome.listing.rank, Some(53.0));
    }

    #[tokio::test]
    async fn test_duplicate_like_is_collapsed() {
        let mut listings = MockListingRepository::new();
        existing(&mut listings, EngagementCounts::new(1, 0, 0, 0));
        listings.expect_adjust_counter().never();
        listings.expect_update_rank().never();

        let mut likes = MockLikeRepository::new();
        likes
            .expect_create()
            .times(1)
            .returning(|_| Err(AppError::conflict("Already liked", json!({}))));

        let svc = service(listings, likes, MockCommentRepository::new(), true);
        let outcome = svc
            .apply(
                "l1",
                EngagementEvent::LikeAdded {
                    user_id: "u1".to_string(),
                },
                Utc::now(),
            )
            .await
            .unwrap();

        assert!(!outcome.applied);
        assert_eq!(outcome.listing.counts.upvotes, 1);
    }

    #[tokio::test]
    async fn test_unlike_without_like_is_noop() {
        let mut listings = MockListingRepository::new();
        existing(&mut listings, EngagementCounts::default());
        listings.expect_adjust_counter().never();

        let mut likes = MockLikeRepository::new();
        likes.expect_delete().times(1).returning(|_, _| Ok(false));

        let svc = service(listings, likes, MockCommentRepository::new(), true);
        let outcome = svc
            .apply(
                "l1",
                EngagementEvent::LikeRemoved {
                    user_id: "u1".to_string(),
                },
                Utc::now(),
            )
            .await
            .unwrap();

        assert!(!outcome.applied);
    }

    #[tokio::test]
    async fn test_unlike_decrements_upvotes() {
        let mut listings = MockListingRepository::new();
        existing(&mut listings, EngagementCounts::new(2, 0, 0, 0));
        listings
            .expect_adjust_counter()
            .with(eq("l1"), eq(EngagementCounter::Upvotes), eq(-1))
            .times(1)
            .returning(|_, _, _| Ok(listing(EngagementCounts::new(1, 0, 0, 0))));

        let mut likes = MockLikeRepository::new();
        likes
            .expect_delete()
            .withf(|listing_id, user_id| listing_id == "l1" && user_id == "u1")
            .times(1)
            .returning(|_, _| Ok(true));

        let svc = service(listings, likes, MockCommentRepository::new(), false);
        let outcome = svc
            .apply(
                "l1",
                EngagementEvent::LikeRemoved {
                    user_id: "u1".to_string(),
                },
                Utc::now(),
            )
            .await
            .unwrap();

        assert!(outcome.applied);
        assert_eq!(outcome.listing.counts.upvotes, 1);
    }

    #[tokio::test]
    async fn test_comment_creates_record_and_increments() {
        let mut listings = MockListingRepository::new();
        existing(&mut listings, EngagementCounts::default());
        listings
            .expect_adjust_counter()
            .with(eq("l1"), eq(EngagementCounter::Comments), eq(1))
            .times(1)
            .returning(|_, _, _| Ok(listing(EngagementCounts::new(0, 1, 0, 0))));

        let mut comments = MockCommentRepository::new();
        comments
            .expect_create()
            .withf(|c| c.content == "Great idea")
            .times(1)
            .returning(|c| {
                Ok(Comment {
                    id: "c1".to_string(),
                    listing_id: c.listing_id,
                    user_id: c.user_id,
                    username: c.username,
                    content: c.content,
                    created_at: Utc::now(),
                    likes: 0,
                })
            });

        let svc = service(listings, MockLikeRepository::new(), comments, false);
        let outcome = svc
            .apply(
                "l1",
                EngagementEvent::CommentAdded {
                    user_id: "u1".to_string(),
                    username: "ada".to_string(),
                    content: "  Great idea ".to_string(),
                },
                Utc::now(),
            )
            .await
            .unwrap();

        assert!(outcome.applied);
        assert_eq!(outcome.comment.unwrap().content, "Great idea");
        assert_eq!(outcome.listing.counts.comments, 1);
    }

    #[tokio::test]
    async fn test_empty_comment_rejected() {
        let mut listings = MockListingRepository::new();
        existing(&mut listings, EngagementCounts::default());
        listings.expect_adjust_counter().never();

        let mut comments = MockCommentRepository::new();
        comments.expect_create().never();

        let svc = service(listings, MockLikeRepository::new(), comments, true);
        let result = svc
            .apply(
                "l1",
                EngagementEvent::CommentAdded {
                    user_id: "u1".to_string(),
                    username: "ada".to_string(),
                    content: "   ".to_string(),
                },
                Utc::now(),
            )
            .await;

        assert!(matches!(result, Err(AppError::Validation { .. })));
    }

    #[tokio::test]
    async fn test_unknown_listing_not_found() {
        let mut listings = MockListingRepository::new();
        listings.expect_find_by_id().returning(|_| Ok(None));
        listings.expect_adjust_counter().never();

        let svc = service(
            listings,
            MockLikeRepository::new(),
            MockCommentRepository::new(),
            true,
        );
        let result = svc.apply("nope", EngagementEvent::Reposted, Utc::now()).await;

        assert!(matches!(result, Err(AppError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_failed_recompute_keeps_counter_change() {
        let mut listings = MockListingRepository::new();
        existing(&mut listings, EngagementCounts::default());
        listings
            .expect_adjust_counter()
            .with(eq("l1"), eq(EngagementCounter::Views), eq(1))
            .times(1)
            .returning(|_, _, _| Ok(listing(EngagementCounts::new(0, 0, 0, 1))));
        listings
            .expect_update_rank()
            .times(1)
            .returning(|_, _| Err(AppError::internal("write failed", json!({}))));

        let svc = service(
            listings,
            MockLikeRepository::new(),
            MockCommentRepository::new(),
            true,
        );
        let outcome = svc
            .apply("l1", EngagementEvent::Viewed, Utc::now())
            .await
            .unwrap();

        assert!(outcome.applied);
        assert_eq!(outcome.listing.counts.views, 1);
        assert!(outcome.listing.rank.is_none());
    }

    /// Listing store whose first `adjust_counter` call fails with a store error.
    fn counter_fails_once(counts_after: EngagementCounts) -> MockListingRepository {
        let mut listings = MockListingRepository::new();
        existing(&mut listings, EngagementCounts::default());
        let calls = Arc::new(AtomicUsize::new(0));
        listings.expect_adjust_counter().returning(move |_, _, _| {
            if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(AppError::internal("connection reset", json!({})))
            } else {
                Ok(listing(counts_after))
            }
        });
        listings
    }

    fn with_stores(
        listings: MockListingRepository,
        likes: Arc<InMemoryLikeRepository>,
        comments: Arc<InMemoryCommentRepository>,
    ) -> EngagementService<MockListingRepository, InMemoryLikeRepository, InMemoryCommentRepository>
    {
        let listings = Arc::new(listings);
        let ranking = Arc::new(RankingService::new(listings.clone(), 1));
        EngagementService::new(listings, likes, comments, ranking, false)
    }

    fn like_added() -> EngagementEvent {
        EngagementEvent::LikeAdded {
            user_id: "u1".to_string(),
        }
    }

    #[tokio::test]
    async fn test_like_rolled_back_when_counter_update_fails() {
        let likes = Arc::new(InMemoryLikeRepository::new());
        let svc = with_stores(
            counter_fails_once(EngagementCounts::new(1, 0, 0, 0)),
            likes.clone(),
            Arc::new(InMemoryCommentRepository::new()),
        );

        let first = svc.apply("l1", like_added(), Utc::now()).await;
        assert!(matches!(first, Err(AppError::Internal { .. })));
        assert!(likes.find("l1", "u1").await.unwrap().is_none());

        let retry = svc.apply("l1", like_added(), Utc::now()).await.unwrap();
        assert!(retry.applied);
        assert_eq!(retry.listing.counts.upvotes, 1);
        assert!(likes.find("l1", "u1").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_unlike_restored_when_counter_update_fails() {
        let likes = Arc::new(InMemoryLikeRepository::new());
        likes.create(NewLike::new("l1", "u1")).await.unwrap();
        let svc = with_stores(
            counter_fails_once(EngagementCounts::default()),
            likes.clone(),
            Arc::new(InMemoryCommentRepository::new()),
        );
        let unlike = || EngagementEvent::LikeRemoved {
            user_id: "u1".to_string(),
        };

        let first = svc.apply("l1", unlike(), Utc::now()).await;
        assert!(first.is_err());
        assert!(likes.find("l1", "u1").await.unwrap().is_some());

        let retry = svc.apply("l1", unlike(), Utc::now()).await.unwrap();
        assert!(retry.applied);
        assert!(likes.find("l1", "u1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_comment_removed_when_counter_update_fails() {
        let comments = Arc::new(InMemoryCommentRepository::new());
        let svc = with_stores(
            counter_fails_once(EngagementCounts::new(0, 1, 0, 0)),
            Arc::new(InMemoryLikeRepository::new()),
            comments.clone(),
        );
        let comment = || EngagementEvent::CommentAdded {
            user_id: "u1".to_string(),
            username: "ada".to_string(),
            content: "Nice".to_string(),
        };

        assert!(svc.apply("l1", comment(), Utc::now()).await.is_err());
        assert!(comments.list_by_listing("l1").await.unwrap().is_empty());

        let retry = svc.apply("l1", comment(), Utc::now()).await.unwrap();
        assert_eq!(retry.listing.counts.comments, 1);
        assert_eq!(comments.list_by_listing("l1").await.unwrap().len(), 1);
    }
}
