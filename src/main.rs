use chrono::Utc;
use clap::{Parser, Subcommand};
use core_types::{NewCustomer, NewRestaurant};
// Import database types directly from the database crate
use database::connection::{connect, run_migrations};
use database::repository::{ReviewRepository, UnitOfWork};
use database::DbError;
use insights::draft_review;
use rust_decimal_macros::dec;
use tracing_subscriber::EnvFilter;

/// The main entry point for the Palate review application.
#[tokio::main]
async fn main() {
    // Load environment variables from .env file, if one exists.
    dotenvy::dotenv().ok();

    // Initialize structured logging; RUST_LOG controls the filter.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // Parse command-line arguments
    let cli = Cli::parse();

    // Execute the appropriate command. Storage failures are caught once here:
    // logged and non-fatal, so the process still exits 0.
    match cli.command {
        Commands::Demo => {
            let db_pool = match connect().await {
                Ok(pool) => pool,
                Err(e) => {
                    tracing::error!("Failed to connect to the database: {e}");
                    // Handled storage failure: the process still exits 0.
                    return;
                }
            };
            if let Err(e) = run_migrations(&db_pool).await {
                tracing::error!("Failed to run database migrations: {e}");
                // Handled storage failure: the process still exits 0.
                return;
            }
            if let Err(e) = handle_demo(db_pool).await {
                tracing::error!("An error occurred: {e}");
            }
        }
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// A small restaurant-review data layer: customers, restaurants, reviews.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Seed sample customers, restaurants and reviews, then run the queries.
    Demo,
}

// ==============================================================================
// Demo Command Logic
// ==============================================================================

/// The entities created by the seeding phase, used by the query phase.
struct SeededData {
    customer1_id: i64,
    restaurant1_id: i64,
    restaurant2_id: i64,
}

/// Creates the sample customers, restaurants and reviews inside one unit of
/// work. Nothing is durable until the caller commits.
async fn seed_demo_data(uow: &mut UnitOfWork) -> Result<SeededData, DbError> {
    let john = uow.insert_customer(&NewCustomer::new("John", "Doe")).await?;
    let alice = uow.insert_customer(&NewCustomer::new("Alice", "Smith")).await?;

    let restaurant1 = uow
        .insert_restaurant(&NewRestaurant {
            name: "Sample Restaurant 1".to_string(),
            price: dec!(3),
            cuisine: "Italian".to_string(),
        })
        .await?;
    let restaurant2 = uow
        .insert_restaurant(&NewRestaurant {
            name: "Sample Restaurant 2".to_string(),
            price: dec!(2),
            cuisine: "Mexican".to_string(),
        })
        .await?;

    uow.insert_review(&draft_review(&john, &restaurant1, 4, Some("Great food!".to_string()), None))
        .await?;
    uow.insert_review(&draft_review(&alice, &restaurant1, 3, Some("Good service.".to_string()), None))
        .await?;
    uow.insert_review(&draft_review(&john, &restaurant2, 5, Some("Excellent!".to_string()), None))
        .await?;

    Ok(SeededData {
        customer1_id: john.id,
        restaurant1_id: restaurant1.id,
        restaurant2_id: restaurant2.id,
    })
}

/// Handles the orchestration of the demo flow: seed inside a unit of work,
/// commit, then query through the repository and the snapshot helpers.
async fn handle_demo(db_pool: sqlx::PgPool) -> anyhow::Result<()> {
    let repo = ReviewRepository::new(db_pool);

    // Seed phase: one unit of work, rolled back in full on any failure.
    let mut uow = repo.begin().await?;
    let seeded = match seed_demo_data(&mut uow).await {
        Ok(seeded) => {
            uow.commit().await?;
            seeded
        }
        Err(e) => {
            uow.rollback().await?;
            return Err(e.into());
        }
    };

    // Query customers
    let customers = repo.list_customers().await?;
    println!("All Customers:");
    for customer in &customers {
        println!("Customer: {}", customer.full_name());
    }

    // Query restaurants
    let restaurants = repo.list_restaurants_by_price_desc().await?;
    println!("\nRestaurants Ordered by Price (Descending):");
    for restaurant in &restaurants {
        println!("Restaurant: {}, Price: {}", restaurant.name, restaurant.price);
    }

    // Query reviews for a specific restaurant, with reviewer names resolved
    // through the snapshot.
    let snapshot = repo
        .restaurant_snapshot(seeded.restaurant1_id)
        .await?
        .ok_or(DbError::NotFound)?;
    println!("\nReviews for {}:", snapshot.restaurant.name);
    for (review, reviewer) in snapshot.reviews.iter().zip(snapshot.reviewing_customers()?) {
        println!(
            "Review for {} by {}: {} stars ({})",
            snapshot.restaurant.name,
            reviewer.full_name(),
            review.star_rating,
            review.sentiment()
        );
    }
    println!("Summary: {}", snapshot.review_summary());

    // Relationship loading through the customer snapshot.
    let snapshot = repo
        .customer_snapshot(seeded.customer1_id)
        .await?
        .ok_or(DbError::NotFound)?;
    let now = Utc::now();
    println!("\nReviews by {}:", snapshot.customer.full_name());
    for review in &snapshot.reviews {
        println!("  {} ({} days old)", review.summary(), review.age_days(now));
    }
    println!("Average rating given: {:.2}", snapshot.average_rating());
    if let Some(favorite) = snapshot.favorite_restaurant() {
        println!("Favorite restaurant: {}", favorite.restaurant.name);
    }
    if let Some(cuisine) = snapshot.favorite_cuisine()? {
        println!("Favorite cuisine: {cuisine}");
    }

    // Full snapshot dump for debugging and downstream tooling.
    tracing::debug!(snapshot = %serde_json::to_string(&snapshot)?, "customer snapshot");

    // Deletion goes through the store, so both sides of the relationship
    // agree on the next load.
    let removed = repo
        .delete_reviews_by_customer_for_restaurant(seeded.customer1_id, seeded.restaurant2_id)
        .await?;
    let snapshot = repo
        .customer_snapshot(seeded.customer1_id)
        .await?
        .ok_or(DbError::NotFound)?;
    println!(
        "\nRemoved {} review(s) of Sample Restaurant 2; {} remain for {}.",
        removed,
        snapshot.review_count(),
        snapshot.customer.full_name()
    );

    Ok(())
}
