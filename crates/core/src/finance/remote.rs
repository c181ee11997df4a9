//! Port to the authoritative remote store.
//!
//! Implementations apply filters and canonical ordering server-side and speak
//! in domain types only. Any `Err` makes the caller fall back to the local
//! cache.

use async_trait::async_trait;
use rust_decimal::Decimal;
use vitrine_shared::types::{PageRequest, TransactionId};

use super::error::RemoteError;
use super::filter::TransactionFilter;
use super::types::{NewTransaction, Transaction, TransactionPatch};

/// One page of remote rows plus the total matching the filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemotePage {
    /// Rows in canonical order.
    pub items: Vec<Transaction>,
    /// Number of rows matching the filter across all pages.
    pub total: u64,
}

/// Query and command interface of the remote backend.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Filtered page in canonical order.
    async fn list(
        &self,
        filter: &TransactionFilter,
        page: &PageRequest,
    ) -> Result<RemotePage, RemoteError>;

    /// Every row in canonical order.
    async fn list_all(&self) -> Result<Vec<Transaction>, RemoteError>;

    /// Net balance over all confirmed rows, ignoring any filter.
    async fn confirmed_balance(&self) -> Result<Decimal, RemoteError>;

    /// Row by id.
    async fn find(&self, id: &TransactionId) -> Result<Option<Transaction>, RemoteError>;

    /// Inserts a row and returns it with its assigned id.
    async fn insert(&self, new: &NewTransaction) -> Result<Transaction, RemoteError>;

    /// Applies a partial update. `Ok(None)` means the row does not exist.
    async fn update(
        &self,
        id: &TransactionId,
        patch: &TransactionPatch,
    ) -> Result<Option<Transaction>, RemoteError>;

    /// Deletes a row. `Ok(false)` means the row did not exist.
    async fn delete(&self, id: &TransactionId) -> Result<bool, RemoteError>;
}
