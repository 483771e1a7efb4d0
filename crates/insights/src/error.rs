use thiserror::Error;

#[derive(Error, Debug)]
pub enum InsightsError {
    #[error("Review {review_id} references restaurant {restaurant_id}, which is not part of this snapshot")]
    MissingRestaurant { review_id: i64, restaurant_id: i64 },

    #[error("Review {review_id} references customer {customer_id}, which is not part of this snapshot")]
    MissingCustomer { review_id: i64, customer_id: i64 },
}
