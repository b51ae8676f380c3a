//! PostgreSQL repository tests. `#[sqlx::test]` creates a fresh database per
//! test from `DATABASE_URL` and applies `./migrations`.

mod common;

use chrono::{Duration, Utc};
use sqlx::PgPool;
use std::sync::Arc;

use showcase_feed::domain::entities::{EngagementCounter, EngagementCounts, NewComment, NewLike};
use showcase_feed::domain::repositories::{
    CommentRepository, FeedFilter, LikeRepository, ListingRepository,
};
use showcase_feed::error::AppError;
use showcase_feed::infrastructure::persistence::{
    PgCommentRepository, PgLikeRepository, PgListingRepository,
};

#[sqlx::test]
async fn test_create_and_find_listing(pool: PgPool) {
    let repo = PgListingRepository::new(Arc::new(pool));
    let mut listing = common::seeded_listing("l1", "SaaS", EngagementCounts::default(), Utc::now());
    listing.technologies = vec!["Rust".to_string(), "Axum".to_string()];

    repo.create(listing).await.unwrap();
    let found = repo.find_by_id("l1").await.unwrap().unwrap();

    assert_eq!(found.category, "SaaS");
    assert_eq!(found.technologies, vec!["Rust".to_string(), "Axum".to_string()]);
    assert_eq!(found.counts, EngagementCounts::default());
    assert!(found.rank.is_none());

    assert!(repo.find_by_id("missing").await.unwrap().is_none());
}

#[sqlx::test]
async fn test_list_ranked_orders_unranked_last(pool: PgPool) {
    let repo = PgListingRepository::new(Arc::new(pool));
    let now = Utc::now();

    for (id, category) in [("a", "SaaS"), ("b", "SaaS"), ("c", "Blog")] {
        repo.create(common::seeded_listing(id, category, EngagementCounts::default(), now - Duration::hours(1)))
            .await
            .unwrap();
    }
    repo.create(common::seeded_listing("unranked", "SaaS", EngagementCounts::default(), now))
        .await
        .unwrap();

    repo.update_rank("a", 10.0).await.unwrap();
    repo.update_rank("b", 70.5).await.unwrap();
    repo.update_rank("c", 40.0).await.unwrap();

    let all = repo.list_ranked(FeedFilter::new(0, 10)).await.unwrap();
    let ids: Vec<&str> = all.iter().map(|l| l.id.as_str()).collect();
    assert_eq!(ids, vec!["b", "c", "a", "unranked"]);

    let saas = repo
        .list_ranked(FeedFilter::new(1, 1).with_category(Some("SaaS".to_string())))
        .await
        .unwrap();
    assert_eq!(saas.len(), 1);
    assert_eq!(saas[0].id, "a");

    assert_eq!(repo.count(None).await.unwrap(), 4);
    assert_eq!(repo.count(Some("SaaS".to_string())).await.unwrap(), 3);
}

#[sqlx::test]
async fn test_adjust_counter_never_negative(pool: PgPool) {
    let repo = PgListingRepository::new(Arc::new(pool));
    repo.create(common::seeded_listing("l1", "SaaS", EngagementCounts::new(1, 0, 0, 0), Utc::now()))
        .await
        .unwrap();

    let listing = repo.adjust_counter("l1", EngagementCounter::Views, 1).await.unwrap();
    assert_eq!(listing.counts.views, 1);

    let listing = repo.adjust_counter("l1", EngagementCounter::Upvotes, -1).await.unwrap();
    assert_eq!(listing.counts.upvotes, 0);

    let listing = repo.adjust_counter("l1", EngagementCounter::Upvotes, -1).await.unwrap();
    assert_eq!(listing.counts.upvotes, 0);
}

#[sqlx::test]
async fn test_update_rank_unknown_listing(pool: PgPool) {
    let repo = PgListingRepository::new(Arc::new(pool));

    let result = repo.update_rank("missing", 1.0).await;

    assert!(matches!(result, Err(AppError::NotFound { .. })));
}

#[sqlx::test]
async fn test_like_unique_per_user(pool: PgPool) {
    let pool = Arc::new(pool);
    let listings = PgListingRepository::new(pool.clone());
    listings
        .create(common::seeded_listing("l1", "SaaS", EngagementCounts::default(), Utc::now()))
        .await
        .unwrap();
    let likes = PgLikeRepository::new(pool);

    likes.create(NewLike::new("l1", "u1")).await.unwrap();
    let duplicate = likes.create(NewLike::new("l1", "u1")).await;
    assert!(matches!(duplicate, Err(AppError::Conflict { .. })));

    assert!(likes.find("l1", "u1").await.unwrap().is_some());
    assert!(likes.delete("l1", "u1").await.unwrap());
    assert!(!likes.delete("l1", "u1").await.unwrap());
    assert!(likes.list_by_listing("l1").await.unwrap().is_empty());
}

#[sqlx::test]
async fn test_comments_by_listing_and_user(pool: PgPool) {
    let pool = Arc::new(pool);
    let listings = PgListingRepository::new(pool.clone());
    listings
        .create(common::seeded_listing("l1", "SaaS", EngagementCounts::default(), Utc::now()))
        .await
        .unwrap();
    let comments = PgCommentRepository::new(pool);

    for content in ["first", "second"] {
        comments
            .create(NewComment {
                listing_id: "l1".to_string(),
                user_id: "u1".to_string(),
                username: "ada".to_string(),
                content: content.to_string(),
            })
            .await
            .unwrap();
    }

    let by_listing = comments.list_by_listing("l1").await.unwrap();
    assert_eq!(by_listing.len(), 2);
    assert_eq!(by_listing[0].content, "first");

    assert_eq!(comments.list_by_user("u1").await.unwrap().len(), 2);
    assert!(comments.list_by_user("u2").await.unwrap().is_empty());

    assert!(comments.delete(&by_listing[0].id).await.unwrap());
    assert!(!comments.delete(&by_listing[0].id).await.unwrap());
    assert_eq!(comments.list_by_listing("l1").await.unwrap().len(), 1);
}
