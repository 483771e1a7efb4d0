use crate::DbError;
use core_types::{Customer, NewCustomer, NewRestaurant, NewReview, Restaurant, Review};
use insights::{CustomerSnapshot, RestaurantSnapshot};
use sqlx::postgres::PgPool;
use sqlx::Postgres;
use sqlx::Transaction;

/// The `ReviewRepository` provides a high-level, application-specific
/// interface to the database. It encapsulates all SQL queries and data access
/// logic, and it is the sole owner of the relationships between entities.
#[derive(Debug, Clone)]
pub struct ReviewRepository {
    pool: PgPool,
}

/// A transactional batch of pending writes.
///
/// Writes issued through a `UnitOfWork` are visible to each other but not to
/// the rest of the process until `commit`. Dropping the unit without
/// committing discards its writes, same as `rollback`.
#[derive(Debug)]
pub struct UnitOfWork {
    tx: Transaction<'static, Postgres>,
}

/// Maps an insert failure onto `ForeignKeyViolation` when the database
/// rejected the row for referencing a nonexistent parent (Postgres reports
/// these as SQLSTATE 23503). Every other failure passes through unchanged.
fn map_insert_err(e: sqlx::Error) -> DbError {
    if let sqlx::Error::Database(db) = &e {
        if matches!(db.kind(), sqlx::error::ErrorKind::ForeignKeyViolation) {
            return DbError::ForeignKeyViolation(db.message().to_string());
        }
    }
    DbError::Sqlx(e)
}

impl UnitOfWork {
    /// Stores a new customer and returns the row with its assigned identity.
    pub async fn insert_customer(&mut self, new: &NewCustomer) -> Result<Customer, DbError> {
        let customer = sqlx::query_as::<_, Customer>(
            r#"
            INSERT INTO customers (first_name, last_name, location, date_of_birth)
            VALUES ($1, $2, $3, $4)
            RETURNING id, first_name, last_name, location, date_of_birth
            "#,
        )
        .bind(&new.first_name)
        .bind(&new.last_name)
        .bind(&new.location)
        .bind(new.date_of_birth)
        .fetch_one(&mut *self.tx)
        .await?;
        Ok(customer)
    }

    /// Stores a new restaurant and returns the row with its assigned identity.
    pub async fn insert_restaurant(&mut self, new: &NewRestaurant) -> Result<Restaurant, DbError> {
        let restaurant = sqlx::query_as::<_, Restaurant>(
            r#"
            INSERT INTO restaurants (name, price, cuisine)
            VALUES ($1, $2, $3)
            RETURNING id, name, price, cuisine
            "#,
        )
        .bind(&new.name)
        .bind(new.price)
        .bind(&new.cuisine)
        .fetch_one(&mut *self.tx)
        .await?;
        Ok(restaurant)
    }

    /// Stores a new review and returns the row with its assigned identity.
    /// When the draft carries no date, the store assigns the insertion time.
    /// A draft referencing a nonexistent customer or restaurant is rejected
    /// with `DbError::ForeignKeyViolation`.
    pub async fn insert_review(&mut self, new: &NewReview) -> Result<Review, DbError> {
        let review = sqlx::query_as::<_, Review>(
            r#"
            INSERT INTO reviews (star_rating, comment, date, customer_id, restaurant_id)
            VALUES ($1, $2, COALESCE($3, NOW()), $4, $5)
            RETURNING id, star_rating, comment, date, customer_id, restaurant_id
            "#,
        )
        .bind(new.star_rating)
        .bind(&new.comment)
        .bind(new.date)
        .bind(new.customer_id)
        .bind(new.restaurant_id)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(map_insert_err)?;
        Ok(review)
    }

    /// Flushes all pending writes atomically.
    pub async fn commit(self) -> Result<(), DbError> {
        self.tx.commit().await?;
        Ok(())
    }

    /// Discards all pending writes.
    pub async fn rollback(self) -> Result<(), DbError> {
        self.tx.rollback().await?;
        Ok(())
    }
}

impl ReviewRepository {
    /// Creates a new `ReviewRepository` with a shared database connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Opens a new unit of work. The caller decides when to commit or roll
    /// back; nothing here is ambient or process-global.
    pub async fn begin(&self) -> Result<UnitOfWork, DbError> {
        let tx = self.pool.begin().await?;
        Ok(UnitOfWork { tx })
    }

    /// Fetches all customers, oldest identity first.
    pub async fn list_customers(&self) -> Result<Vec<Customer>, DbError> {
        let customers = sqlx::query_as::<_, Customer>(
            "SELECT id, first_name, last_name, location, date_of_birth FROM customers ORDER BY id ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(customers)
    }

    /// Fetches all restaurants ordered by price, most expensive first.
    pub async fn list_restaurants_by_price_desc(&self) -> Result<Vec<Restaurant>, DbError> {
        let restaurants = sqlx::query_as::<_, Restaurant>(
            "SELECT id, name, price, cuisine FROM restaurants ORDER BY price DESC, id ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(restaurants)
    }

    /// Fetches one restaurant's reviews in load order: date ascending, id
    /// ascending within a date.
    pub async fn reviews_for_restaurant(&self, restaurant_id: i64) -> Result<Vec<Review>, DbError> {
        let reviews = sqlx::query_as::<_, Review>(
            r#"
            SELECT id, star_rating, comment, date, customer_id, restaurant_id
            FROM reviews
            WHERE restaurant_id = $1
            ORDER BY date ASC, id ASC
            "#,
        )
        .bind(restaurant_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(reviews)
    }

    /// Deletes one customer's reviews of one restaurant from the store and
    /// returns the number of rows removed. Both sides of the relationship see
    /// the deletion on their next snapshot load; there is no in-memory
    /// mutation path.
    pub async fn delete_reviews_by_customer_for_restaurant(
        &self,
        customer_id: i64,
        restaurant_id: i64,
    ) -> Result<u64, DbError> {
        let result = sqlx::query("DELETE FROM reviews WHERE customer_id = $1 AND restaurant_id = $2")
            .bind(customer_id)
            .bind(restaurant_id)
            .execute(&self.pool)
            .await?;
        tracing::debug!(
            customer_id,
            restaurant_id,
            rows = result.rows_affected(),
            "deleted reviews"
        );
        Ok(result.rows_affected())
    }

    /// Materializes a read-only snapshot of one customer: their reviews plus
    /// every reviewed restaurant with its full review set, in first-seen
    /// order. `None` when the customer does not exist.
    pub async fn customer_snapshot(&self, customer_id: i64) -> Result<Option<CustomerSnapshot>, DbError> {
        let customer = sqlx::query_as::<_, Customer>(
            "SELECT id, first_name, last_name, location, date_of_birth FROM customers WHERE id = $1",
        )
        .bind(customer_id)
        .fetch_optional(&self.pool)
        .await?;
        let Some(customer) = customer else {
            return Ok(None);
        };

        let reviews = sqlx::query_as::<_, Review>(
            r#"
            SELECT id, star_rating, comment, date, customer_id, restaurant_id
            FROM reviews
            WHERE customer_id = $1
            ORDER BY date ASC, id ASC
            "#,
        )
        .bind(customer_id)
        .fetch_all(&self.pool)
        .await?;

        let mut restaurant_ids: Vec<i64> = Vec::new();
        for review in &reviews {
            if !restaurant_ids.contains(&review.restaurant_id) {
                restaurant_ids.push(review.restaurant_id);
            }
        }

        let mut restaurants = Vec::with_capacity(restaurant_ids.len());
        for id in restaurant_ids {
            // The review row guarantees the restaurant exists; surface a
            // missing one as NotFound rather than skipping it silently.
            let snapshot = self.restaurant_snapshot(id).await?.ok_or(DbError::NotFound)?;
            restaurants.push(snapshot);
        }

        Ok(Some(CustomerSnapshot::new(customer, reviews, restaurants)))
    }

    /// Materializes a read-only snapshot of one restaurant: its reviews plus
    /// each distinct reviewer, in first-seen order. `None` when the
    /// restaurant does not exist.
    pub async fn restaurant_snapshot(&self, restaurant_id: i64) -> Result<Option<RestaurantSnapshot>, DbError> {
        let restaurant = sqlx::query_as::<_, Restaurant>(
            "SELECT id, name, price, cuisine FROM restaurants WHERE id = $1",
        )
        .bind(restaurant_id)
        .fetch_optional(&self.pool)
        .await?;
        let Some(restaurant) = restaurant else {
            return Ok(None);
        };

        let reviews = self.reviews_for_restaurant(restaurant_id).await?;

        let mut reviewer_ids: Vec<i64> = Vec::new();
        for review in &reviews {
            if !reviewer_ids.contains(&review.customer_id) {
                reviewer_ids.push(review.customer_id);
            }
        }

        let fetched = sqlx::query_as::<_, Customer>(
            "SELECT id, first_name, last_name, location, date_of_birth FROM customers WHERE id = ANY($1)",
        )
        .bind(&reviewer_ids)
        .fetch_all(&self.pool)
        .await?;

        // Reorder the fetched rows into first-seen review order.
        let mut reviewers = Vec::with_capacity(reviewer_ids.len());
        for id in &reviewer_ids {
            if let Some(customer) = fetched.iter().find(|c| c.id == *id) {
                reviewers.push(customer.clone());
            }
        }

        Ok(Some(RestaurantSnapshot::new(restaurant, reviews, reviewers)))
    }
}
