//! # Palate Insights
//!
//! This crate provides the aggregation and query helpers of the system: the
//! derived views over customers, restaurants and their reviews.
//!
//! ## Architectural Principles
//!
//! - **Layer 1 Logic:** This is a pure logic crate. It has no knowledge of
//!   the database. It depends only on `core-types` (Layer 0).
//! - **Read-Only Snapshots:** Relationships between entities are owned by the
//!   persistence layer. The snapshot types here are materialized, read-only
//!   views of those relationships; nothing in this crate mutates them. This
//!   makes every helper trivially idempotent and easy to test.
//! - **Deterministic Tie-Breaks:** Every extremum or mode helper picks the
//!   first maximal element in iteration order, which is the order the rows
//!   were loaded in. No helper iterates a hash map.
//!
//! ## Public API
//!
//! - `CustomerSnapshot`: a customer together with their reviews and the
//!   reviewed restaurants.
//! - `RestaurantSnapshot`: a restaurant together with its reviews and
//!   reviewers.
//! - `draft_review`: constructs an unsaved review draft for later persistence.
//! - `InsightsError`: the specific error types that can be returned from this
//!   crate.

mod agg;
pub mod customer;
pub mod error;
pub mod restaurant;

// Re-export the key components to create a clean, public-facing API.
pub use customer::{CustomerSnapshot, RestaurantSortKey};
pub use error::InsightsError;
pub use restaurant::RestaurantSnapshot;

use chrono::{DateTime, Utc};
use core_types::{Customer, NewReview, Restaurant};

/// Constructs a review draft linking `customer` to `restaurant`.
///
/// The draft is not persisted; identity and durability come only from the
/// database layer, and when `date` is `None` the store assigns the insertion
/// time.
pub fn draft_review(
    customer: &Customer,
    restaurant: &Restaurant,
    star_rating: i32,
    comment: Option<String>,
    date: Option<DateTime<Utc>>,
) -> NewReview {
    NewReview {
        star_rating,
        comment,
        date,
        customer_id: customer.id,
        restaurant_id: restaurant.id,
    }
}
