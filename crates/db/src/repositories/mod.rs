//! Repository implementations for data access.
//!
//! Repositories hide the `SeaORM` details behind the store ports defined in
//! the core crate.

pub mod transaction;

pub use transaction::{INSERT_PROCEDURE, TransactionRepository};
