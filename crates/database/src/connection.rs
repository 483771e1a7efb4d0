use crate::error::DbError;
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::env;
use std::time::Duration;

/// Establishes a connection pool to the PostgreSQL database.
///
/// The connection string comes from the `DATABASE_URL` environment variable.
/// A `.env` file is honored when present but is not required; the variable
/// itself is. The returned pool is cheap to clone and is shared by every
/// repository in the process.
pub async fn connect() -> Result<PgPool, DbError> {
    // A missing .env file is fine; a missing DATABASE_URL is not.
    dotenvy::dotenv().ok();

    let database_url = env::var("DATABASE_URL")
        .map_err(|_e| DbError::ConnectionConfigError("DATABASE_URL must be set.".to_string()))?;

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .acquire_timeout(Duration::from_secs(5))
        .connect(&database_url)
        .await?;

    Ok(pool)
}

/// Applies the embedded schema migrations.
///
/// The demo runs this on startup so a fresh database gets the customers,
/// restaurants and reviews tables (and their foreign keys) before any write.
pub async fn run_migrations(pool: &PgPool) -> Result<(), DbError> {
    // Path is relative to this crate's root.
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}
