//! Financial transaction store.
//!
//! - Domain types and validation
//! - Business calendar dates and canonical ordering
//! - Local snapshot cache with baseline seeding
//! - Remote store port and the dual-path orchestrator

pub mod cache;
pub mod date;
pub mod error;
pub mod filter;
pub mod ordering;
pub mod remote;
pub mod seed;
pub mod store;
pub mod summary;
pub mod types;
pub mod validation;

#[cfg(test)]
mod fake;
#[cfg(test)]
mod store_props;

pub use cache::{
    DEFAULT_STORAGE_KEY, FsSnapshotStore, LocalCache, MemorySnapshotStore, PendingWrites, SnapshotStore,
};
pub use date::DateNormalizer;
pub use error::{CacheError, RemoteError, StoreError};
pub use filter::{DateRange, LinkFilter, TransactionFilter};
pub use ordering::{canonical_cmp, is_canonical, sort_canonical};
pub use remote::{RemotePage, RemoteStore};
pub use store::{Served, Source, TransactionPage, TransactionStore};
pub use summary::{FinancialSummary, confirmed_balance};
pub use types::{
    LinkedEntityType, NewTransaction, PaymentMethod, Transaction, TransactionDraft, TransactionPatch,
    TransactionStatus, TransactionType,
};
pub use validation::{validate_draft, validate_patch};
