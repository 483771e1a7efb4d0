use crate::enums::Sentiment;
use crate::error::CoreError;
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A customer row. Identity is assigned by the database on insert.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Customer {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub location: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
}

impl Customer {
    /// Returns the customer's display name, first and last joined by a space.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Returns the customer's location, or a placeholder when none is on file.
    pub fn location_or_default(&self) -> &str {
        self.location.as_deref().unwrap_or("Location not provided")
    }

    /// Returns the customer's age in years as of `today`, computed by year
    /// subtraction only (no month/day adjustment). `None` when no date of
    /// birth is on file.
    pub fn age_years(&self, today: NaiveDate) -> Option<i32> {
        self.date_of_birth
            .map(|dob| today.year() - dob.year())
    }

    /// Returns the relative URL of the customer's profile page.
    pub fn profile_url(&self) -> String {
        format!("/profile/{}", self.id)
    }
}

/// A restaurant row.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Restaurant {
    pub id: i64,
    pub name: String,
    pub price: Decimal,
    pub cuisine: String,
}

/// A review row: the join between one customer and one restaurant.
///
/// `star_rating` is expected to be in 1..=5 but is not enforced here, and
/// `comment` is nullable in the store (an empty string is a present comment).
/// A review's associations never change after creation.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Review {
    pub id: i64,
    pub star_rating: i32,
    pub comment: Option<String>,
    pub date: DateTime<Utc>,
    pub customer_id: i64,
    pub restaurant_id: i64,
}

impl Review {
    /// Returns the review's age in whole days as of `now`.
    pub fn age_days(&self, now: DateTime<Utc>) -> i64 {
        (now - self.date).num_days()
    }

    /// Returns whether the review is at most `days_threshold` days old.
    pub fn is_recent(&self, now: DateTime<Utc>, days_threshold: i64) -> bool {
        self.age_days(now) <= days_threshold
    }

    /// `is_recent` with the standard 30-day window.
    pub fn is_recent_default(&self, now: DateTime<Utc>) -> bool {
        self.is_recent(now, 30)
    }

    /// Classifies the review's tone from its star rating: 4 and up is
    /// positive, 2 and below is negative, everything else is neutral.
    pub fn sentiment(&self) -> Sentiment {
        if self.star_rating >= 4 {
            Sentiment::Positive
        } else if self.star_rating <= 2 {
            Sentiment::Negative
        } else {
            Sentiment::Neutral
        }
    }

    /// Returns whether the rating meets `threshold`.
    pub fn is_positive(&self, threshold: i32) -> bool {
        self.star_rating >= threshold
    }

    /// `is_positive` with the standard threshold of 3.
    pub fn is_positive_default(&self) -> bool {
        self.is_positive(3)
    }

    /// Returns the number of whitespace-separated words in the comment.
    /// An empty comment counts zero; a missing one is an error.
    pub fn comment_word_count(&self) -> Result<usize, CoreError> {
        let comment = self.comment.as_deref().ok_or(CoreError::MissingComment(self.id))?;
        Ok(comment.split_whitespace().count())
    }

    /// Returns the number of characters in the comment.
    /// An empty comment counts zero; a missing one is an error.
    pub fn comment_char_count(&self) -> Result<usize, CoreError> {
        let comment = self.comment.as_deref().ok_or(CoreError::MissingComment(self.id))?;
        Ok(comment.chars().count())
    }

    /// Returns the comment split into whitespace-separated words. This stands
    /// in for real keyword extraction.
    pub fn keywords(&self) -> Result<Vec<&str>, CoreError> {
        let comment = self.comment.as_deref().ok_or(CoreError::MissingComment(self.id))?;
        Ok(comment.split_whitespace().collect())
    }

    /// Returns a one-line summary of the review.
    pub fn summary(&self) -> String {
        format!(
            "Rating: {}, Comment: {}",
            self.star_rating,
            self.comment.as_deref().unwrap_or("(no comment)")
        )
    }
}

/// A customer that has not yet been persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewCustomer {
    pub first_name: String,
    pub last_name: String,
    pub location: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
}

impl NewCustomer {
    pub fn new(first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            location: None,
            date_of_birth: None,
        }
    }
}

/// A restaurant that has not yet been persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewRestaurant {
    pub name: String,
    pub price: Decimal,
    pub cuisine: String,
}

/// A review that has not yet been persisted. Constructing one does not store
/// it; only the database layer assigns identity and makes it durable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewReview {
    pub star_rating: i32,
    pub comment: Option<String>,
    /// When `None`, the store assigns the insertion time.
    pub date: Option<DateTime<Utc>>,
    pub customer_id: i64,
    pub restaurant_id: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn review(star_rating: i32, comment: Option<&str>) -> Review {
        Review {
            id: 1,
            star_rating,
            comment: comment.map(str::to_string),
            date: Utc.with_ymd_and_hms(2024, 3, 10, 18, 30, 0).unwrap(),
            customer_id: 1,
            restaurant_id: 1,
        }
    }

    #[test]
    fn full_name_joins_first_and_last() {
        let customer = Customer {
            id: 1,
            first_name: "John".to_string(),
            last_name: "Doe".to_string(),
            location: None,
            date_of_birth: None,
        };
        assert_eq!(customer.full_name(), "John Doe");
        assert_eq!(customer.location_or_default(), "Location not provided");
        assert_eq!(customer.profile_url(), "/profile/1");
        assert_eq!(customer.age_years(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()), None);
    }

    #[test]
    fn age_years_subtracts_birth_year_only() {
        let customer = Customer {
            id: 2,
            first_name: "Alice".to_string(),
            last_name: "Smith".to_string(),
            location: Some("Springfield".to_string()),
            date_of_birth: NaiveDate::from_ymd_opt(1990, 12, 31),
        };
        // Year subtraction, even though the birthday hasn't occurred yet.
        let today = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert_eq!(customer.age_years(today), Some(34));
        assert_eq!(customer.location_or_default(), "Springfield");
    }

    #[test]
    fn sentiment_thresholds() {
        assert_eq!(review(5, None).sentiment(), Sentiment::Positive);
        assert_eq!(review(4, None).sentiment(), Sentiment::Positive);
        assert_eq!(review(3, None).sentiment(), Sentiment::Neutral);
        assert_eq!(review(2, None).sentiment(), Sentiment::Negative);
        assert_eq!(review(1, None).sentiment(), Sentiment::Negative);
    }

    #[test]
    fn empty_comment_counts_zero_but_is_not_missing() {
        let r = review(4, Some(""));
        assert_eq!(r.comment_word_count().unwrap(), 0);
        assert_eq!(r.comment_char_count().unwrap(), 0);
        assert!(r.is_positive(3));
    }

    #[test]
    fn missing_comment_is_an_error() {
        let r = review(4, None);
        assert!(matches!(r.comment_word_count(), Err(CoreError::MissingComment(1))));
        assert!(matches!(r.comment_char_count(), Err(CoreError::MissingComment(1))));
        assert!(matches!(r.keywords(), Err(CoreError::MissingComment(1))));
        assert_eq!(r.summary(), "Rating: 4, Comment: (no comment)");
    }

    #[test]
    fn word_and_char_counts() {
        let r = review(4, Some("Great food!"));
        assert_eq!(r.comment_word_count().unwrap(), 2);
        assert_eq!(r.comment_char_count().unwrap(), 11);
        assert_eq!(r.keywords().unwrap(), vec!["Great", "food!"]);
        assert_eq!(r.summary(), "Rating: 4, Comment: Great food!");
    }

    #[test]
    fn review_age_and_recency() {
        let r = review(3, None);
        let now = Utc.with_ymd_and_hms(2024, 3, 25, 12, 0, 0).unwrap();
        assert_eq!(r.age_days(now), 14);
        assert!(r.is_recent_default(now));
        assert!(!r.is_recent(now, 7));
    }
}
