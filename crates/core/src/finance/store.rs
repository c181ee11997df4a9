//! Transaction store orchestrator.
//!
//! Every operation tries the remote store first, bounded by a timeout. On any
//! remote failure the same operation runs against the local cache with the
//! same predicate and ordering. The returned [`Served`] records which path
//! answered.
//!
//! The cache lock is held for the whole remote-then-fallback sequence, so a
//! concurrent caller never observes a half-applied mutation.
//!
//! Updates and deletes of remote records served by the cache are journaled
//! and replayed before the next remote call. Until the replay succeeds the
//! remote store is treated as unavailable, so a stale remote row never
//! overwrites or resurrects a cached change.

use std::future::Future;
use std::time::Duration;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, warn};
use vitrine_shared::types::{PageMeta, PageRequest, TransactionId};

use super::cache::LocalCache;
use super::date::DateNormalizer;
use super::error::{RemoteError, StoreError};
use super::filter::{DateRange, TransactionFilter};
use super::remote::RemoteStore;
use super::summary::{FinancialSummary, confirmed_balance};
use super::types::{Transaction, TransactionDraft, TransactionPatch};
use super::validation::{validate_draft, validate_patch};

/// Default bound on a single remote call.
pub const DEFAULT_REMOTE_TIMEOUT: Duration = Duration::from_secs(5);

/// Which path served a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    /// The remote store answered.
    Remote,
    /// The remote store failed and the local cache answered.
    Fallback,
}

/// A result together with the path that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Served<T> {
    /// The result.
    pub value: T,
    /// The serving path.
    pub source: Source,
}

impl<T> Served<T> {
    /// Result served by the remote store.
    pub const fn remote(value: T) -> Self {
        Self {
            value,
            source: Source::Remote,
        }
    }

    /// Result served by the local cache.
    pub const fn fallback(value: T) -> Self {
        Self {
            value,
            source: Source::Fallback,
        }
    }

    /// Returns true if the local cache served the request.
    #[must_use]
    pub fn is_fallback(&self) -> bool {
        self.source == Source::Fallback
    }

    /// Maps the value, keeping the source.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Served<U> {
        Served {
            value: f(self.value),
            source: self.source,
        }
    }
}

/// One page of a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionPage {
    /// Transactions in canonical order.
    pub data: Vec<Transaction>,
    /// Pagination metadata.
    pub meta: PageMeta,
    /// Net balance of every confirmed transaction, regardless of the filter.
    pub current_balance: Decimal,
}

/// Dual-path store over a remote backend and the local cache.
pub struct TransactionStore<R> {
    remote: R,
    cache: Mutex<LocalCache>,
    normalizer: DateNormalizer,
    remote_timeout: Duration,
}

impl<R: RemoteStore> TransactionStore<R> {
    /// Creates a store with the default timeout and business timezone.
    pub fn new(remote: R, cache: LocalCache) -> Self {
        Self {
            remote,
            cache: Mutex::new(cache),
            normalizer: DateNormalizer::default(),
            remote_timeout: DEFAULT_REMOTE_TIMEOUT,
        }
    }

    /// Sets the bound on each remote call.
    #[must_use]
    pub fn with_timeout(mut self, remote_timeout: Duration) -> Self {
        self.remote_timeout = remote_timeout;
        self
    }

    /// Sets the business timezone.
    #[must_use]
    pub fn with_normalizer(mut self, normalizer: DateNormalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    /// The business timezone.
    pub fn normalizer(&self) -> &DateNormalizer {
        &self.normalizer
    }

    /// The remote backend.
    pub fn remote(&self) -> &R {
        &self.remote
    }

    /// Copy of the local cache contents.
    pub async fn cached(&self) -> Vec<Transaction> {
        self.cache.lock().await.all().to_vec()
    }

    /// Lists one page of transactions matching `filter`.
    ///
    /// # Errors
    ///
    /// This operation recovers from every remote failure and currently never
    /// fails; the `Result` keeps the signature uniform.
    pub async fn list(
        &self,
        filter: &TransactionFilter,
        page: PageRequest,
    ) -> Result<Served<TransactionPage>, StoreError> {
        let mut cache = self.cache.lock().await;

        let remote = self
            .remote_call(&mut cache, "list", async {
                let rows = self.remote.list(filter, &page).await?;
                let balance = self.remote.confirmed_balance().await?;
                Ok::<_, RemoteError>((rows, balance))
            })
            .await;

        if let Ok((rows, current_balance)) = remote {
            if let Err(e) = cache.upsert_many(rows.items.iter().cloned()) {
                warn!(error = %e, "Failed to mirror remote page into local cache");
            }
            return Ok(Served::remote(TransactionPage {
                data: rows.items,
                meta: PageMeta::new(page, rows.total),
                current_balance,
            }));
        }

        let matching = cache.query(|tx| filter.matches(tx));
        let total = u64::try_from(matching.len()).unwrap_or(u64::MAX);
        let data = matching[page.window(matching.len())].to_vec();
        Ok(Served::fallback(TransactionPage {
            data,
            meta: PageMeta::new(page, total),
            current_balance: confirmed_balance(cache.all()),
        }))
    }

    /// Fetches a transaction by id.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if neither path knows the id.
    pub async fn get_by_id(&self, id: &TransactionId) -> Result<Served<Transaction>, StoreError> {
        let mut cache = self.cache.lock().await;

        if let Ok(Some(tx)) = self
            .remote_call(&mut cache, "get_by_id", self.remote.find(id))
            .await
        {
            if let Err(e) = cache.upsert(tx.clone()) {
                warn!(error = %e, id = %id, "Failed to mirror remote record into local cache");
            }
            return Ok(Served::remote(tx));
        }

        cache
            .find_by_id(id)
            .cloned()
            .map(Served::fallback)
            .ok_or_else(|| StoreError::NotFound(id.clone()))
    }

    /// Validates and records a new transaction.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Validation` for an invalid draft (the remote store
    /// is not contacted), or `StoreError::Cache` if the fallback write fails.
    pub async fn create(&self, draft: &TransactionDraft) -> Result<Served<Transaction>, StoreError> {
        let new = validate_draft(draft)?;
        let mut cache = self.cache.lock().await;

        match self
            .remote_call(&mut cache, "create", self.remote.insert(&new))
            .await
        {
            Ok(tx) => {
                if let Err(e) = cache.upsert(tx.clone()) {
                    warn!(error = %e, id = %tx.id, "Failed to mirror created record into local cache");
                }
                debug!(id = %tx.id, "Transaction created remotely");
                Ok(Served::remote(tx))
            }
            Err(_) => {
                let tx = new.into_transaction(cache.next_local_id());
                cache.insert_local(tx.clone())?;
                debug!(id = %tx.id, "Transaction created in local cache");
                Ok(Served::fallback(tx))
            }
        }
    }

    /// Applies a partial update.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Validation` for an invalid patch,
    /// `StoreError::NotFound` if neither path knows the id, or
    /// `StoreError::Cache` if the fallback write fails.
    pub async fn update(
        &self,
        id: &TransactionId,
        patch: &TransactionPatch,
    ) -> Result<Served<Transaction>, StoreError> {
        validate_patch(patch)?;
        let mut cache = self.cache.lock().await;

        let remote = self
            .remote_call(&mut cache, "update", self.remote.update(id, patch))
            .await;
        let remote_failed = remote.is_err();
        if let Ok(Some(tx)) = remote {
            if let Err(e) = cache.upsert(tx.clone()) {
                warn!(error = %e, id = %id, "Failed to mirror updated record into local cache");
            }
            return Ok(Served::remote(tx));
        }

        let mut tx = cache
            .find_by_id(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;
        tx.apply(patch);
        cache.upsert(tx.clone())?;
        if remote_failed {
            cache.mark_updated(id)?;
        }
        Ok(Served::fallback(tx))
    }

    /// Deletes a transaction from both paths.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if neither path knew the id, or
    /// `StoreError::Cache` if the cache write fails.
    pub async fn delete(&self, id: &TransactionId) -> Result<Served<()>, StoreError> {
        let mut cache = self.cache.lock().await;

        let remote = self
            .remote_call(&mut cache, "delete", self.remote.delete(id))
            .await;
        let cached = cache.remove(id)?;
        if remote.is_err() && cached.is_some() {
            cache.mark_deleted(id)?;
        }

        match (remote, cached) {
            (Ok(true), _) => Ok(Served::remote(())),
            (_, Some(_)) => Ok(Served::fallback(())),
            (_, None) => Err(StoreError::NotFound(id.clone())),
        }
    }

    /// Summarizes every transaction in `range`.
    ///
    /// # Errors
    ///
    /// See [`TransactionStore::list`].
    pub async fn summarize(&self, range: DateRange) -> Result<Served<FinancialSummary>, StoreError> {
        let page = self
            .list(&TransactionFilter::in_range(range), PageRequest::unbounded())
            .await?;
        Ok(page.map(|page| FinancialSummary::from_transactions(&page.data)))
    }

    /// Marks a transaction as paid, on `payment_date` or today.
    ///
    /// # Errors
    ///
    /// See [`TransactionStore::update`].
    pub async fn confirm_payment(
        &self,
        id: &TransactionId,
        payment_date: Option<NaiveDate>,
    ) -> Result<Served<Transaction>, StoreError> {
        let date = payment_date.unwrap_or_else(|| self.normalizer.today());
        self.update(id, &TransactionPatch::confirm_payment(date)).await
    }

    /// Cancels a transaction.
    ///
    /// # Errors
    ///
    /// See [`TransactionStore::update`].
    pub async fn cancel(&self, id: &TransactionId) -> Result<Served<Transaction>, StoreError> {
        self.update(id, &TransactionPatch::cancel()).await
    }

    /// Replaces the local cache with the full remote collection.
    ///
    /// Records created in the cache while the remote store was unreachable
    /// are kept under their local ids. Returns the number of cached
    /// transactions. When the remote store is unreachable the cache is left
    /// untouched.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Cache` if the new snapshot cannot be written.
    pub async fn refresh(&self) -> Result<Served<usize>, StoreError> {
        let mut cache = self.cache.lock().await;

        match self
            .remote_call(&mut cache, "refresh", self.remote.list_all())
            .await
        {
            Ok(rows) => {
                cache.merge_remote(rows)?;
                debug!(count = cache.all().len(), "Local cache refreshed from remote");
                Ok(Served::remote(cache.all().len()))
            }
            Err(_) => Ok(Served::fallback(cache.all().len())),
        }
    }

    /// Replays journaled fallback writes, then runs `call`. A failed replay
    /// fails the call without running it.
    async fn remote_call<T, F>(
        &self,
        cache: &mut LocalCache,
        operation: &'static str,
        call: F,
    ) -> Result<T, RemoteError>
    where
        F: Future<Output = Result<T, RemoteError>>,
    {
        if cache.pending().needs_replay() {
            self.replay_pending(cache).await?;
        }
        self.attempt(operation, call).await
    }

    async fn replay_pending(&self, cache: &mut LocalCache) -> Result<(), RemoteError> {
        let pending = cache.pending().clone();

        for id in &pending.updated {
            let Some(tx) = cache.find_by_id(id).cloned() else {
                settle(cache, id);
                continue;
            };
            let patch = TransactionPatch::from(&tx);
            match self.attempt("replay_update", self.remote.update(id, &patch)).await? {
                Some(stored) => {
                    if let Err(e) = cache.upsert(stored) {
                        warn!(error = %e, id = %id, "Failed to mirror replayed update into local cache");
                    }
                }
                None => debug!(id = %id, "Replayed update found no remote row"),
            }
            settle(cache, id);
        }

        for id in &pending.deleted {
            self.attempt("replay_delete", self.remote.delete(id)).await?;
            settle(cache, id);
        }

        debug!(
            updated = pending.updated.len(),
            deleted = pending.deleted.len(),
            "Replayed fallback writes to remote store"
        );
        Ok(())
    }

    /// Runs a remote call under the timeout, logging any failure.
    async fn attempt<T, F>(&self, operation: &'static str, call: F) -> Result<T, RemoteError>
    where
        F: Future<Output = Result<T, RemoteError>>,
    {
        let result = match tokio::time::timeout(self.remote_timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(RemoteError::Timeout(
                u64::try_from(self.remote_timeout.as_millis()).unwrap_or(u64::MAX),
            )),
        };
        if let Err(e) = &result {
            warn!(error = %e, operation, "Remote store unavailable, falling back to local cache");
        }
        result
    }
}

fn settle(cache: &mut LocalCache, id: &TransactionId) {
    if let Err(e) = cache.settle(id) {
        warn!(error = %e, id = %id, "Failed to update pending-writes journal");
    }
}
