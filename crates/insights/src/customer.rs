use crate::agg;
use crate::error::InsightsError;
use crate::restaurant::RestaurantSnapshot;
use chrono::{DateTime, Utc};
use core_types::{Customer, Restaurant, Review};
use serde::{Deserialize, Serialize};

/// Sort key for [`CustomerSnapshot::reviewed_restaurants_sorted`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RestaurantSortKey {
    AverageRating,
    LatestReviewDate,
}

/// A customer together with their reviews and the reviewed restaurants,
/// materialized by the persistence layer.
///
/// `reviews` is in load order (date ascending, id ascending within a date).
/// `restaurants` holds each distinct reviewed restaurant once, in first-seen
/// order, and each entry carries the restaurant's *full* review set so that
/// restaurant-level averages reflect all reviewers, not just this customer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerSnapshot {
    pub customer: Customer,
    pub reviews: Vec<Review>,
    pub restaurants: Vec<RestaurantSnapshot>,
}

impl CustomerSnapshot {
    pub fn new(customer: Customer, reviews: Vec<Review>, restaurants: Vec<RestaurantSnapshot>) -> Self {
        Self { customer, reviews, restaurants }
    }

    fn restaurant_for(&self, review: &Review) -> Result<&RestaurantSnapshot, InsightsError> {
        self.restaurants
            .iter()
            .find(|s| s.restaurant.id == review.restaurant_id)
            .ok_or(InsightsError::MissingRestaurant {
                review_id: review.id,
                restaurant_id: review.restaurant_id,
            })
    }

    /// Mean star rating across this customer's reviews; 0.0 when there are
    /// none.
    pub fn average_rating(&self) -> f64 {
        agg::mean_rating(&self.reviews)
    }

    pub fn review_count(&self) -> usize {
        self.reviews.len()
    }

    /// A formatted count-plus-average line for display.
    pub fn review_summary(&self) -> String {
        agg::summary_line(&self.reviews)
    }

    /// The reviewed restaurant with the highest average rating (over all of
    /// that restaurant's reviews). The first maximal restaurant in first-seen
    /// order wins a tie; `None` when the customer has no reviews.
    pub fn highest_rated_restaurant(&self) -> Option<&RestaurantSnapshot> {
        agg::first_max_by_key(self.restaurants.iter(), |s| s.average_rating())
    }

    /// Alias for [`Self::highest_rated_restaurant`].
    pub fn favorite_restaurant(&self) -> Option<&RestaurantSnapshot> {
        self.highest_rated_restaurant()
    }

    /// The cuisine with the highest *sum* of this customer's star ratings
    /// (not the average). The first-seen cuisine wins a tie; `None` when the
    /// customer has no reviews.
    pub fn favorite_cuisine(&self) -> Result<Option<&str>, InsightsError> {
        // Vec accumulator keyed by first-seen cuisine keeps the tie-break
        // deterministic.
        let mut totals: Vec<(&str, i64)> = Vec::new();
        for review in &self.reviews {
            let cuisine = self.restaurant_for(review)?.restaurant.cuisine.as_str();
            match totals.iter_mut().find(|(c, _)| *c == cuisine) {
                Some((_, total)) => *total += i64::from(review.star_rating),
                None => totals.push((cuisine, i64::from(review.star_rating))),
            }
        }
        Ok(agg::first_max_by_key(totals.iter(), |(_, total)| *total).map(|(c, _)| *c))
    }

    /// The date of this customer's most recent review, if any.
    pub fn latest_review_date(&self) -> Option<DateTime<Utc>> {
        self.reviews.iter().map(|r| r.date).max()
    }

    /// This customer's reviews of one restaurant, in load order.
    pub fn reviews_for_restaurant(&self, restaurant_id: i64) -> Vec<&Review> {
        self.reviews
            .iter()
            .filter(|r| r.restaurant_id == restaurant_id)
            .collect()
    }

    /// Reviews rated within `min..=max`. An inverted range matches nothing.
    pub fn reviews_by_rating(&self, min: i32, max: i32) -> Vec<&Review> {
        agg::by_rating(&self.reviews, min, max)
    }

    /// Reviews dated within `start..=end` inclusive.
    pub fn reviews_by_date(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Vec<&Review> {
        agg::by_date(&self.reviews, start, end)
    }

    /// Reviews of restaurants serving `cuisine`, in load order.
    pub fn reviews_for_cuisine(&self, cuisine: &str) -> Result<Vec<&Review>, InsightsError> {
        let mut matching = Vec::new();
        for review in &self.reviews {
            if self.restaurant_for(review)?.restaurant.cuisine == cuisine {
                matching.push(review);
            }
        }
        Ok(matching)
    }

    /// Reviews carrying a present, non-empty comment.
    pub fn reviews_with_comments(&self) -> Vec<&Review> {
        agg::with_comments(&self.reviews)
    }

    /// Up to `limit` reviews, newest first. Stable: equal dates keep load
    /// order.
    pub fn recent_reviews(&self, limit: usize) -> Vec<&Review> {
        agg::recent(&self.reviews, limit)
    }

    /// The modal review timestamp. The first timestamp to reach the highest
    /// count wins a tie; `None` when the customer has no reviews.
    pub fn most_active_period(&self) -> Option<DateTime<Utc>> {
        let mut counts: Vec<(DateTime<Utc>, usize)> = Vec::new();
        for review in &self.reviews {
            match counts.iter_mut().find(|(date, _)| *date == review.date) {
                Some((_, n)) => *n += 1,
                None => counts.push((review.date, 1)),
            }
        }
        agg::first_max_by_key(counts.iter(), |(_, n)| *n).map(|(date, _)| *date)
    }

    /// The highest-rated review; the first such review wins a tie.
    pub fn highest_rated_review(&self) -> Option<&Review> {
        agg::first_max_by_key(self.reviews.iter(), |r| r.star_rating)
    }

    /// The lowest-rated review; the first such review wins a tie.
    pub fn lowest_rated_review(&self) -> Option<&Review> {
        agg::first_min_by_key(self.reviews.iter(), |r| r.star_rating)
    }

    /// The restaurant of each review, in review order. Duplicates are
    /// preserved: a restaurant reviewed twice appears twice.
    pub fn reviewed_restaurants(&self) -> Result<Vec<&Restaurant>, InsightsError> {
        self.reviews
            .iter()
            .map(|review| self.restaurant_for(review).map(|s| &s.restaurant))
            .collect()
    }

    /// The number of distinct restaurants this customer has reviewed.
    pub fn reviewed_restaurant_count(&self) -> usize {
        self.restaurants.len()
    }

    /// The distinct reviewed restaurants, stably sorted by the given key.
    /// Restaurants without any review sort before dated ones when ordering by
    /// latest review date ascending.
    pub fn reviewed_restaurants_sorted(
        &self,
        key: RestaurantSortKey,
        descending: bool,
    ) -> Vec<&RestaurantSnapshot> {
        let mut sorted: Vec<&RestaurantSnapshot> = self.restaurants.iter().collect();
        // Flipping the comparator, not the result, keeps the sort stable for
        // tied keys.
        sorted.sort_by(|a, b| {
            let ord = match key {
                RestaurantSortKey::AverageRating => a.average_rating().total_cmp(&b.average_rating()),
                RestaurantSortKey::LatestReviewDate => a.latest_review_date().cmp(&b.latest_review_date()),
            };
            if descending { ord.reverse() } else { ord }
        });
        sorted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn customer() -> Customer {
        Customer {
            id: 1,
            first_name: "John".to_string(),
            last_name: "Doe".to_string(),
            location: None,
            date_of_birth: None,
        }
    }

    fn restaurant(id: i64, name: &str, cuisine: &str) -> Restaurant {
        Restaurant {
            id,
            name: name.to_string(),
            price: dec!(3),
            cuisine: cuisine.to_string(),
        }
    }

    fn review(id: i64, restaurant_id: i64, rating: i32, day: u32) -> Review {
        Review {
            id,
            star_rating: rating,
            comment: Some("Fine.".to_string()),
            date: Utc.with_ymd_and_hms(2024, 3, day, 12, 0, 0).unwrap(),
            customer_id: 1,
            restaurant_id,
        }
    }

    /// Customer 1 reviewed two restaurants; restaurant 2 also has a review
    /// from another customer, which lifts its own average above what this
    /// customer gave it.
    fn snapshot() -> CustomerSnapshot {
        let r1_reviews = vec![review(1, 1, 4, 10), review(2, 1, 2, 11)];
        let mut r2_reviews = vec![review(3, 2, 3, 12)];
        r2_reviews.push(Review {
            id: 99,
            star_rating: 5,
            comment: None,
            date: Utc.with_ymd_and_hms(2024, 3, 13, 20, 0, 0).unwrap(),
            customer_id: 7,
            restaurant_id: 2,
        });
        CustomerSnapshot::new(
            customer(),
            vec![review(1, 1, 4, 10), review(2, 1, 2, 11), review(3, 2, 3, 12)],
            vec![
                RestaurantSnapshot::new(restaurant(1, "Trattoria Uno", "Italian"), r1_reviews, vec![customer()]),
                RestaurantSnapshot::new(restaurant(2, "Taqueria Dos", "Mexican"), r2_reviews, vec![customer()]),
            ],
        )
    }

    #[test]
    fn empty_snapshot_sentinels() {
        let snap = CustomerSnapshot::new(customer(), vec![], vec![]);
        assert_eq!(snap.average_rating(), 0.0);
        assert_eq!(snap.review_count(), 0);
        assert_eq!(snap.review_summary(), "No reviews available.");
        assert_eq!(snap.latest_review_date(), None);
        assert_eq!(snap.favorite_restaurant(), None);
        assert_eq!(snap.favorite_cuisine().unwrap(), None);
        assert_eq!(snap.most_active_period(), None);
        assert_eq!(snap.highest_rated_review(), None);
    }

    #[test]
    fn review_count_matches_reviews_len() {
        let snap = snapshot();
        assert_eq!(snap.review_count(), snap.reviews.len());
        assert_eq!(snap.average_rating(), 3.0);
        assert_eq!(snap.review_summary(), "Total Reviews: 3, Average Rating: 3.00");
        assert_eq!(
            snap.latest_review_date(),
            Some(Utc.with_ymd_and_hms(2024, 3, 12, 12, 0, 0).unwrap())
        );
    }

    #[test]
    fn favorite_restaurant_uses_restaurant_wide_average() {
        let snap = snapshot();
        // Restaurant 1 averages (4+2)/2 = 3.0; restaurant 2 averages
        // (3+5)/2 = 4.0 thanks to the other reviewer.
        let favorite = snap.favorite_restaurant().unwrap();
        assert_eq!(favorite.restaurant.id, 2);
        assert_eq!(snap.highest_rated_restaurant().unwrap().restaurant.id, 2);
    }

    #[test]
    fn favorite_cuisine_sums_ratings_first_seen_wins_ties() {
        let snap = snapshot();
        // Italian total 4+2 = 6, Mexican total 3: Italian wins.
        assert_eq!(snap.favorite_cuisine().unwrap(), Some("Italian"));

        // Force a tie: one 3-star review each for two cuisines. The
        // first-seen cuisine must win.
        let tied = CustomerSnapshot::new(
            customer(),
            vec![review(1, 1, 3, 10), review(2, 2, 3, 11)],
            vec![
                RestaurantSnapshot::new(restaurant(1, "A", "Italian"), vec![review(1, 1, 3, 10)], vec![customer()]),
                RestaurantSnapshot::new(restaurant(2, "B", "Mexican"), vec![review(2, 2, 3, 11)], vec![customer()]),
            ],
        );
        assert_eq!(tied.favorite_cuisine().unwrap(), Some("Italian"));
    }

    #[test]
    fn favorite_cuisine_fails_on_dangling_restaurant() {
        let mut snap = snapshot();
        snap.restaurants.clear();
        assert!(matches!(
            snap.favorite_cuisine(),
            Err(InsightsError::MissingRestaurant { review_id: 1, restaurant_id: 1 })
        ));
    }

    #[test]
    fn filters_preserve_order_and_are_non_destructive() {
        let snap = snapshot();
        let by_rating = snap.reviews_by_rating(3, 5);
        let ids: Vec<i64> = by_rating.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 3]);
        // Inverted range is vacuous for all inputs.
        assert!(snap.reviews_by_rating(5, 1).is_empty());
        // The snapshot itself is untouched.
        assert_eq!(snap.review_count(), 3);

        let start = Utc.with_ymd_and_hms(2024, 3, 11, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 3, 12, 23, 59, 59).unwrap();
        let by_date: Vec<i64> = snap.reviews_by_date(start, end).iter().map(|r| r.id).collect();
        assert_eq!(by_date, vec![2, 3]);

        let italian: Vec<i64> = snap
            .reviews_for_cuisine("Italian")
            .unwrap()
            .iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(italian, vec![1, 2]);

        let for_restaurant: Vec<i64> = snap.reviews_for_restaurant(1).iter().map(|r| r.id).collect();
        assert_eq!(for_restaurant, vec![1, 2]);
    }

    #[test]
    fn recent_reviews_is_a_capped_descending_subsequence() {
        let snap = snapshot();
        let recent = snap.recent_reviews(2);
        assert_eq!(recent.len(), 2);
        assert!(recent[0].date >= recent[1].date);
        let ids: Vec<i64> = recent.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![3, 2]);
        // Every returned review is one of the customer's reviews.
        for r in &recent {
            assert!(snap.reviews.iter().any(|own| own == *r));
        }
    }

    #[test]
    fn most_active_period_is_modal_first_wins() {
        let date = |day| Utc.with_ymd_and_hms(2024, 3, day, 12, 0, 0).unwrap();
        let mut reviews = vec![review(1, 1, 4, 10), review(2, 1, 3, 11), review(3, 1, 5, 11)];
        let snap = CustomerSnapshot::new(
            customer(),
            reviews.clone(),
            vec![RestaurantSnapshot::new(restaurant(1, "A", "Italian"), reviews.clone(), vec![customer()])],
        );
        assert_eq!(snap.most_active_period(), Some(date(11)));

        // All counts equal: the first timestamp wins.
        reviews.pop();
        let snap = CustomerSnapshot::new(customer(), reviews.clone(), vec![]);
        assert_eq!(snap.most_active_period(), Some(date(10)));
    }

    #[test]
    fn extremum_reviews_first_wins_ties() {
        let snap = CustomerSnapshot::new(
            customer(),
            vec![review(1, 1, 5, 10), review(2, 1, 5, 11), review(3, 1, 2, 12), review(4, 1, 2, 13)],
            vec![],
        );
        assert_eq!(snap.highest_rated_review().unwrap().id, 1);
        assert_eq!(snap.lowest_rated_review().unwrap().id, 3);
    }

    #[test]
    fn reviewed_restaurants_and_counts() {
        let snap = snapshot();
        let per_review: Vec<i64> = snap
            .reviewed_restaurants()
            .unwrap()
            .iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(per_review, vec![1, 1, 2]);
        assert_eq!(snap.reviewed_restaurant_count(), 2);
    }

    #[test]
    fn reviewed_restaurants_sorted_by_rating_and_date() {
        let snap = snapshot();
        let by_rating: Vec<i64> = snap
            .reviewed_restaurants_sorted(RestaurantSortKey::AverageRating, true)
            .iter()
            .map(|s| s.restaurant.id)
            .collect();
        assert_eq!(by_rating, vec![2, 1]);

        let by_date_asc: Vec<i64> = snap
            .reviewed_restaurants_sorted(RestaurantSortKey::LatestReviewDate, false)
            .iter()
            .map(|s| s.restaurant.id)
            .collect();
        assert_eq!(by_date_asc, vec![1, 2]);
    }
}
