//! Shared scan primitives for the snapshot types. All functions preserve the
//! input order and never allocate beyond the returned collection.

use chrono::{DateTime, Utc};
use core_types::Review;

/// Mean star rating over `reviews`; 0.0 when there are none.
pub(crate) fn mean_rating(reviews: &[Review]) -> f64 {
    if reviews.is_empty() {
        return 0.0;
    }
    let total: i64 = reviews.iter().map(|r| i64::from(r.star_rating)).sum();
    total as f64 / reviews.len() as f64
}

/// The standard count-plus-average summary line.
pub(crate) fn summary_line(reviews: &[Review]) -> String {
    if reviews.is_empty() {
        return "No reviews available.".to_string();
    }
    format!(
        "Total Reviews: {}, Average Rating: {:.2}",
        reviews.len(),
        mean_rating(reviews)
    )
}

/// Up to `limit` reviews, stably sorted newest first.
pub(crate) fn recent<'a>(reviews: &'a [Review], limit: usize) -> Vec<&'a Review> {
    let mut sorted: Vec<&Review> = reviews.iter().collect();
    sorted.sort_by(|a, b| b.date.cmp(&a.date));
    sorted.truncate(limit);
    sorted
}

/// All reviews, stably sorted by date.
pub(crate) fn sorted_by_date<'a>(reviews: &'a [Review], descending: bool) -> Vec<&'a Review> {
    let mut sorted: Vec<&Review> = reviews.iter().collect();
    if descending {
        sorted.sort_by(|a, b| b.date.cmp(&a.date));
    } else {
        sorted.sort_by(|a, b| a.date.cmp(&b.date));
    }
    sorted
}

/// Reviews whose rating falls in `min..=max`. An inverted range matches
/// nothing.
pub(crate) fn by_rating<'a>(reviews: &'a [Review], min: i32, max: i32) -> Vec<&'a Review> {
    reviews
        .iter()
        .filter(|r| min <= r.star_rating && r.star_rating <= max)
        .collect()
}

/// Reviews dated within `start..=end` inclusive.
pub(crate) fn by_date<'a>(
    reviews: &'a [Review],
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Vec<&'a Review> {
    reviews
        .iter()
        .filter(|r| start <= r.date && r.date <= end)
        .collect()
}

/// Whether the review carries a present, non-empty comment.
pub(crate) fn has_comment(review: &Review) -> bool {
    review.comment.as_deref().is_some_and(|c| !c.is_empty())
}

/// Reviews with a present, non-empty comment.
pub(crate) fn with_comments<'a>(reviews: &'a [Review]) -> Vec<&'a Review> {
    reviews.iter().filter(|r| has_comment(r)).collect()
}

/// The first element maximizing `key` in iteration order. Ties keep the
/// earlier element.
pub(crate) fn first_max_by_key<'a, T, K, F>(items: impl Iterator<Item = &'a T>, key: F) -> Option<&'a T>
where
    T: 'a,
    K: PartialOrd,
    F: Fn(&T) -> K,
{
    let mut best: Option<(&T, K)> = None;
    for item in items {
        let k = key(item);
        match &best {
            Some((_, best_k)) if k <= *best_k => {}
            _ => best = Some((item, k)),
        }
    }
    best.map(|(item, _)| item)
}

/// The first element minimizing `key` in iteration order.
pub(crate) fn first_min_by_key<'a, T, K, F>(items: impl Iterator<Item = &'a T>, key: F) -> Option<&'a T>
where
    T: 'a,
    K: PartialOrd,
    F: Fn(&T) -> K,
{
    let mut best: Option<(&T, K)> = None;
    for item in items {
        let k = key(item);
        match &best {
            Some((_, best_k)) if k >= *best_k => {}
            _ => best = Some((item, k)),
        }
    }
    best.map(|(item, _)| item)
}
