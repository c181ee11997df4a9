//! In-memory [`RemoteStore`] used by the store tests.
//!
//! Applies the same predicate and canonical order the SQL adapter expresses
//! server-side, and can be switched offline or slowed down.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use rust_decimal::Decimal;
use vitrine_shared::types::{PageRequest, TransactionId};

use super::error::RemoteError;
use super::filter::TransactionFilter;
use super::ordering::sort_canonical;
use super::remote::{RemotePage, RemoteStore};
use super::summary::confirmed_balance;
use super::types::{NewTransaction, Transaction, TransactionPatch};

#[derive(Debug, Default)]
pub struct InMemoryRemote {
    rows: Mutex<Vec<Transaction>>,
    next_id: AtomicU64,
    offline: AtomicBool,
    delay: Mutex<Option<Duration>>,
}

impl InMemoryRemote {
    pub fn with_rows(rows: Vec<Transaction>) -> Self {
        let remote = Self::default();
        *remote.rows.lock().unwrap() = rows;
        remote
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = Some(delay);
    }

    pub fn rows(&self) -> Vec<Transaction> {
        let mut rows = self.rows.lock().unwrap().clone();
        sort_canonical(&mut rows);
        rows
    }

    async fn reachable(&self) -> Result<(), RemoteError> {
        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.offline.load(Ordering::SeqCst) {
            return Err(RemoteError::Database("connection refused".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl RemoteStore for InMemoryRemote {
    async fn list(
        &self,
        filter: &TransactionFilter,
        page: &PageRequest,
    ) -> Result<RemotePage, RemoteError> {
        self.reachable().await?;
        let matching: Vec<Transaction> =
            self.rows().into_iter().filter(|tx| filter.matches(tx)).collect();
        let total = matching.len() as u64;
        let items = matching[page.window(matching.len())].to_vec();
        Ok(RemotePage { items, total })
    }

    async fn list_all(&self) -> Result<Vec<Transaction>, RemoteError> {
        self.reachable().await?;
        Ok(self.rows())
    }

    async fn confirmed_balance(&self) -> Result<Decimal, RemoteError> {
        self.reachable().await?;
        Ok(confirmed_balance(&self.rows()))
    }

    async fn find(&self, id: &TransactionId) -> Result<Option<Transaction>, RemoteError> {
        self.reachable().await?;
        Ok(self.rows().into_iter().find(|tx| &tx.id == id))
    }

    async fn insert(&self, new: &NewTransaction) -> Result<Transaction, RemoteError> {
        self.reachable().await?;
        let seq = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let tx = new.clone().into_transaction(TransactionId::new(format!("FT{seq:06}")));
        self.rows.lock().unwrap().push(tx.clone());
        Ok(tx)
    }

    async fn update(
        &self,
        id: &TransactionId,
        patch: &TransactionPatch,
    ) -> Result<Option<Transaction>, RemoteError> {
        self.reachable().await?;
        let mut rows = self.rows.lock().unwrap();
        Ok(rows.iter_mut().find(|tx| &tx.id == id).map(|tx| {
            tx.apply(patch);
            tx.clone()
        }))
    }

    async fn delete(&self, id: &TransactionId) -> Result<bool, RemoteError> {
        self.reachable().await?;
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|tx| &tx.id != id);
        Ok(rows.len() != before)
    }
}
