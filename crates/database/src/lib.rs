//! # Palate Database Crate
//!
//! This crate acts as a high-level, application-specific interface to the
//! PostgreSQL database. It is the system's persistence collaborator: the sole
//! owner of entity identity and of the relationships between customers,
//! restaurants and reviews.
//!
//! ## Architectural Principles
//!
//! - **Layer 3 Adapter:** This crate is an adapter that encapsulates all
//!   database-specific logic. It provides a clean, abstract API to the rest of
//!   the application, hiding the underlying SQL.
//! - **Explicit Unit of Work:** Writes go through a `UnitOfWork` handed to
//!   the caller by `ReviewRepository::begin`. Pending writes are visible to
//!   reads inside the same unit and are committed or rolled back atomically.
//!   There is no ambient, process-global session.
//! - **Snapshots Out, Drafts In:** Reads materialize read-only snapshot types
//!   from the `insights` crate; writes accept the unsaved `New*` drafts from
//!   `core-types` and return the stored rows with their assigned identity.
//!
//! ## Public API
//!
//! - `connect`: The async function to establish the database connection pool.
//! - `run_migrations`: A utility to apply database migrations, ensuring the
//!   schema is up-to-date.
//! - `ReviewRepository`: The main struct that holds the connection pool and
//!   provides all the high-level data access methods.
//! - `UnitOfWork`: A transactional batch of pending writes.
//! - `DbError`: The specific error types that can be returned from this crate.

// Declare the modules that constitute this crate.
pub mod connection;
pub mod error;
pub mod repository;

// Re-export the key components to create a clean, public-facing API.
pub use connection::{connect, run_migrations};
pub use error::DbError;
pub use repository::{ReviewRepository, UnitOfWork};
