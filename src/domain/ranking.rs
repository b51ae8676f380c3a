//! Engagement-based ranking score.
//!
//! A listing's score combines weighted engagement counters with a step-function
//! recency bonus:
//!
//! ```text
//! score = upvotes * 3 + comments * 2 + reposts * 4 + views * 0.1 + recency_bonus
//! ```
//!
//! | age (hours)   | bonus |
//! |---------------|-------|
//! | `<= 48`       | 50    |
//! | `<= 168`      | 20    |
//! | `<= 720`      | 5     |
//! | older         | 0     |
//!
//! The result is rounded to two decimals (half away from zero). The current
//! time is always passed in, so scoring is pure for a given `now`.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::entities::{EngagementCounts, Listing};

pub const UPVOTE_WEIGHT: f64 = 3.0;
pub const COMMENT_WEIGHT: f64 = 2.0;
pub const REPOST_WEIGHT: f64 = 4.0;
pub const VIEW_WEIGHT: f64 = 0.1;

/// Recency steps as `(max age in hours, bonus)`, checked in order.
const RECENCY_STEPS: [(f64, f64); 3] = [(48.0, 50.0), (168.0, 20.0), (720.0, 5.0)];

/// Per-signal contributions to a listing's score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    pub upvotes: f64,
    pub comments: f64,
    pub reposts: f64,
    pub views: f64,
    pub recency_bonus: f64,
    pub total: f64,
}

/// Hours elapsed between `created_at` and `now`, with millisecond precision.
///
/// Negative when `created_at` lies in the future.
pub fn age_hours(created_at: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    (now - created_at).num_milliseconds() as f64 / 3_600_000.0
}

/// Returns the recency bonus for a listing created `age_hours` ago.
///
/// Ages at or below zero (including timestamps in the future) receive the
/// full new-listing bonus.
pub fn recency_bonus(age_hours: f64) -> f64 {
    RECENCY_STEPS
        .iter()
        .find(|(max_hours, _)| age_hours <= *max_hours)
        .map(|(_, bonus)| *bonus)
        .unwrap_or(0.0)
}

/// Scores raw counters and a creation timestamp at `now`.
///
/// Negative counters are clamped to zero.
pub fn score(counts: &EngagementCounts, created_at: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    breakdown(counts, created_at, now).total
}

/// Scores a listing at `now`.
pub fn compute_score(listing: &Listing, now: DateTime<Utc>) -> f64 {
    score(&listing.counts, listing.created_at, now)
}

/// Computes the score together with each signal's contribution.
pub fn breakdown(
    counts: &EngagementCounts,
    created_at: DateTime<Utc>,
    now: DateTime<Utc>,
) -> ScoreBreakdown {
    let clamp = |v: i64| v.max(0) as f64;

    let upvotes = clamp(counts.upvotes) * UPVOTE_WEIGHT;
    let comments = clamp(counts.comments) * COMMENT_WEIGHT;
    let reposts = clamp(counts.reposts) * REPOST_WEIGHT;
    let views = clamp(counts.views) * VIEW_WEIGHT;

    let recency_bonus = recency_bonus(age_hours(created_at, now));

    ScoreBreakdown {
        upvotes,
        comments,
        reposts,
        views,
        recency_bonus,
        total: round2(upvotes + comments + reposts + views + recency_bonus),
    }
}

/// Rounds to two decimal places, half away from zero.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-06-01T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn counts(u: i64, c: i64, r: i64, v: i64) -> EngagementCounts {
        EngagementCounts::new(u, c, r, v)
    }

    #[test]
    fn test_brand_new_listing_gets_full_bonus() {
        assert_eq!(score(&counts(0, 0, 0, 0), now(), now()), 50.0);
    }

    #[test]
    fn test_weighted_counters_at_creation_time() {
        // 7*3 + 3*2 + 1*4 + 25*0.1 + 50
        assert_eq!(score(&counts(7, 3, 1, 25), now(), now()), 83.5);
    }

    #[test]
    fn test_known_scores_by_age() {
        let c = counts(10, 5, 2, 100);
        assert_eq!(score(&c, now() - Duration::hours(50), now()), 78.0);
        assert_eq!(score(&c, now() - Duration::hours(200), now()), 63.0);
        assert_eq!(score(&c, now() - Duration::hours(1000), now()), 58.0);
    }

    #[test]
    fn test_recency_step_boundaries_are_inclusive() {
        assert_eq!(recency_bonus(0.0), 50.0);
        assert_eq!(recency_bonus(48.0), 50.0);
        assert_eq!(recency_bonus(48.01), 20.0);
        assert_eq!(recency_bonus(168.0), 20.0);
        assert_eq!(recency_bonus(168.5), 5.0);
        assert_eq!(recency_bonus(720.0), 5.0);
        assert_eq!(recency_bonus(720.001), 0.0);
        assert_eq!(recency_bonus(10_000.0), 0.0);
    }

    #[test]
    fn test_boundary_measured_from_timestamps() {
        let c = counts(0, 0, 0, 0);
        assert_eq!(score(&c, now() - Duration::hours(48), now()), 50.0);
        assert_eq!(
            score(&c, now() - Duration::hours(48) - Duration::seconds(1), now()),
            20.0
        );
    }

    #[test]
    fn test_future_timestamp_counts_as_new() {
        assert_eq!(
            score(&counts(1, 0, 0, 0), now() + Duration::hours(5), now()),
            53.0
        );
    }

    #[test]
    fn test_negative_counters_are_clamped() {
        assert_eq!(score(&counts(-4, -1, -2, -10), now(), now()), 50.0);
    }

    #[test]
    fn test_fractional_views_round_to_two_decimals() {
        let old = now() - Duration::days(60);
        assert_eq!(score(&counts(0, 0, 0, 3), old, now()), 0.3);
        assert_eq!(score(&counts(0, 0, 0, 7), old, now()), 0.7);
        assert_eq!(score(&counts(0, 0, 0, 12_345), old, now()), 1234.5);
    }

    #[test]
    fn test_each_counter_is_strictly_monotonic() {
        let created = now() - Duration::hours(100);
        let base = counts(4, 4, 4, 4);
        let base_score = score(&base, created, now());

        let bumped = [
            counts(5, 4, 4, 4),
            counts(4, 5, 4, 4),
            counts(4, 4, 5, 4),
            counts(4, 4, 4, 5),
        ];

        for c in bumped {
            assert!(score(&c, created, now()) > base_score, "{c:?}");
        }
    }

    #[test]
    fn test_reposts_outweigh_upvotes_outweigh_comments() {
        let created = now() - Duration::days(90);
        let repost = score(&counts(0, 0, 1, 0), created, now());
        let upvote = score(&counts(1, 0, 0, 0), created, now());
        let comment = score(&counts(0, 1, 0, 0), created, now());
        let view = score(&counts(0, 0, 0, 1), created, now());

        assert!(repost > upvote && upvote > comment && comment > view);
    }

    #[test]
    fn test_breakdown_sums_to_total() {
        let b = breakdown(&counts(10, 5, 2, 100), now() - Duration::hours(50), now());
        assert_eq!(b.upvotes, 30.0);
        assert_eq!(b.comments, 10.0);
        assert_eq!(b.reposts, 8.0);
        assert_eq!(b.recency_bonus, 20.0);
        assert_eq!(b.total, 78.0);
    }

    #[test]
    fn test_listing_age_matches_scoring_age() {
        let created_at = now() - Duration::minutes(90);
        let listing = Listing::from_new("x".to_string(), Default::default(), created_at);

        assert_eq!(listing.age_hours(now()), 1.5);
        assert_eq!(listing.age_hours(now()), age_hours(created_at, now()));
        assert_eq!(age_hours(now() + Duration::hours(2), now()), -2.0);
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(1.005_000_1), 1.01);
        assert_eq!(round2(2.344), 2.34);
        assert_eq!(round2(0.125), 0.13);
    }
}
