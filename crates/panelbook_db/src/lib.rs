//! Database integration for Panelbook
//!
//! This crate provides a database client that is designed to be database agnostic,
//! using SQLx as the underlying database library. It supports SQLite, PostgreSQL,
//! and MySQL databases through feature flags, and hosts the SQL repositories
//! backing the slot, booking and template stores.
//!
//! # Features
//!
//! - Database agnostic design
//! - Connection pooling
//! - Integration with the Panelbook configuration system
//! - Support for SQLite, PostgreSQL, and MySQL
//!
//! # Example
//!
//! ```rust,no_run
//! use panelbook_db::DbClient;
//!
//! async fn setup_db() -> Result<DbClient, Box<dyn std::error::Error>> {
//!     let db_client = DbClient::from_url("sqlite://data/panelbook.db").await?;
//!     Ok(db_client)
//! }
//! ```

pub mod client;
pub mod error;
pub mod repositories;

// Register the SQLite driver when the crate is loaded
#[cfg(feature = "sqlite")]
mod sqlite_driver {
    // This import ensures the SQLite driver is linked and registered
    #[allow(unused_imports)]
    use sqlx::sqlite::SqlitePoolOptions as _;
}

pub use client::{DbClient, DbTransaction};
pub use error::DbError;
pub use repositories::{SqlBookingRepository, SqlSlotRepository, SqlTemplateRepository};
