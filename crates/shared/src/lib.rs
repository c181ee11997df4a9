//! Shared types and configuration for Vitrine.
//!
//! This crate provides common types used across all other crates:
//! - Typed transaction IDs with the local `TRX` sequence scheme
//! - Pagination types for list operations
//! - Configuration management

pub mod config;
pub mod types;

pub use config::AppConfig;
