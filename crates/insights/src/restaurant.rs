use crate::agg;
use crate::error::InsightsError;
use chrono::{DateTime, Timelike, Utc};
use core_types::{Customer, Restaurant, Review};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A restaurant together with its full review set and the customers who wrote
/// those reviews, materialized by the persistence layer.
///
/// Reviews are in load order (date ascending, id ascending within a date) and
/// `reviewers` holds each distinct customer once, in first-seen order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestaurantSnapshot {
    pub restaurant: Restaurant,
    pub reviews: Vec<Review>,
    pub reviewers: Vec<Customer>,
}

impl RestaurantSnapshot {
    pub fn new(restaurant: Restaurant, reviews: Vec<Review>, reviewers: Vec<Customer>) -> Self {
        Self { restaurant, reviews, reviewers }
    }

    /// Mean star rating across all reviews; 0.0 when there are none.
    pub fn average_rating(&self) -> f64 {
        agg::mean_rating(&self.reviews)
    }

    /// The date of the most recent review, if any.
    pub fn latest_review_date(&self) -> Option<DateTime<Utc>> {
        self.reviews.iter().map(|r| r.date).max()
    }

    pub fn review_count(&self) -> usize {
        self.reviews.len()
    }

    /// A formatted count-plus-average line for display.
    pub fn review_summary(&self) -> String {
        agg::summary_line(&self.reviews)
    }

    /// Up to `limit` reviews, newest first. Stable: equal dates keep load
    /// order.
    pub fn recent_reviews(&self, limit: usize) -> Vec<&Review> {
        agg::recent(&self.reviews, limit)
    }

    /// Reviews rated within `min..=max`. An inverted range matches nothing.
    pub fn reviews_by_rating(&self, min: i32, max: i32) -> Vec<&Review> {
        agg::by_rating(&self.reviews, min, max)
    }

    /// Reviews dated within `start..=end` inclusive.
    pub fn reviews_by_date(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Vec<&Review> {
        agg::by_date(&self.reviews, start, end)
    }

    /// Reviews carrying a present, non-empty comment.
    pub fn reviews_with_comments(&self) -> Vec<&Review> {
        agg::with_comments(&self.reviews)
    }

    /// Review count per star rating.
    pub fn reviews_grouped_by_rating(&self) -> BTreeMap<i32, usize> {
        let mut counts = BTreeMap::new();
        for review in &self.reviews {
            *counts.entry(review.star_rating).or_insert(0) += 1;
        }
        counts
    }

    /// Review count per hour of day (0..=23), from review timestamps.
    pub fn popular_times(&self) -> BTreeMap<u32, usize> {
        let mut counts = BTreeMap::new();
        for review in &self.reviews {
            *counts.entry(review.date.hour()).or_insert(0) += 1;
        }
        counts
    }

    /// Reviews whose comment contains any of `keywords` as a case-sensitive
    /// substring. Reviews without a comment never match.
    pub fn reviews_with_keywords(&self, keywords: &[&str]) -> Vec<&Review> {
        self.reviews
            .iter()
            .filter(|r| {
                r.comment
                    .as_deref()
                    .is_some_and(|c| keywords.iter().any(|k| c.contains(k)))
            })
            .collect()
    }

    /// Mean comment length in characters. The divisor is the total review
    /// count, including reviews without a comment; 0.0 when there are no
    /// reviews at all.
    pub fn average_review_length(&self) -> f64 {
        if self.reviews.is_empty() {
            return 0.0;
        }
        let total_chars: usize = self
            .reviews
            .iter()
            .filter_map(|r| r.comment.as_deref())
            .map(|c| c.chars().count())
            .sum();
        total_chars as f64 / self.reviews.len() as f64
    }

    /// The reviewer of each review, in review order. Duplicates are
    /// preserved: a customer with three reviews appears three times.
    pub fn reviewing_customers(&self) -> Result<Vec<&Customer>, InsightsError> {
        self.reviews
            .iter()
            .map(|review| {
                self.reviewers
                    .iter()
                    .find(|c| c.id == review.customer_id)
                    .ok_or(InsightsError::MissingCustomer {
                        review_id: review.id,
                        customer_id: review.customer_id,
                    })
            })
            .collect()
    }

    /// All reviews, stably sorted by date.
    pub fn reviews_sorted_by_date(&self, descending: bool) -> Vec<&Review> {
        agg::sorted_by_date(&self.reviews, descending)
    }

    /// Among commented reviews, the highest rated; the first such review wins
    /// a tie. `None` when no review has a comment.
    pub fn highest_rated_review_with_comment(&self) -> Option<&Review> {
        agg::first_max_by_key(
            self.reviews.iter().filter(|r| agg::has_comment(r)),
            |r| r.star_rating,
        )
    }

    /// The lowest-rated review; the first such review wins a tie.
    pub fn lowest_rated_review(&self) -> Option<&Review> {
        agg::first_min_by_key(self.reviews.iter(), |r| r.star_rating)
    }

    /// Other reviews of this restaurant rated within one star of `review`.
    /// The probe review itself is excluded by id.
    pub fn related_reviews(&self, review: &Review) -> Vec<&Review> {
        self.reviews
            .iter()
            .filter(|r| r.id != review.id && (r.star_rating - review.star_rating).abs() <= 1)
            .collect()
    }
}
