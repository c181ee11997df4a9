//! Database layer with `SeaORM` entities and repositories.
//!
//! This crate provides:
//! - The `financial_transactions` entity, which is the single column map
//! - [`TransactionRepository`], the `SeaORM` implementation of the remote store
//! - Database migrations (table, id sequence, insert procedure)

pub mod entities;
pub mod migration;
pub mod repositories;

pub use repositories::TransactionRepository;

use std::time::Duration;

use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use vitrine_shared::config::DatabaseConfig;

/// Creates a connection pool to the database.
///
/// The pool connects lazily, so an unreachable server surfaces as an error on
/// the first query instead of at startup.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(config: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(config.url.clone());
    options
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .connect_lazy(true)
        .sqlx_logging(false);

    Database::connect(options).await
}
