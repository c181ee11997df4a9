//! Core business logic for Vitrine.
//!
//! This crate contains the financial transaction store with ZERO database
//! dependencies. The remote backend is reached through the
//! [`finance::RemoteStore`] port, implemented by `vitrine-db`.
//!
//! # Modules
//!
//! - `finance` - Transactions, dual-path store, local cache and summaries

pub mod finance;
