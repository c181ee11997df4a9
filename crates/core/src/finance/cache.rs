//! Local durable cache of the full transaction collection.
//!
//! The collection is kept in memory and written through to a [`SnapshotStore`]
//! as a pretty-printed JSON array after every mutation, always in canonical
//! order. A missing or undecodable snapshot is replaced by the baseline seed.
//!
//! Writes served while the remote store was unreachable are tracked in a
//! [`PendingWrites`] journal stored under `<key>.pending`, together with the
//! highest local sequence ever minted.

use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use vitrine_shared::types::TransactionId;

use super::error::CacheError;
use super::ordering::sort_canonical;
use super::seed;
use super::types::Transaction;

/// Storage key of the transaction snapshot.
pub const DEFAULT_STORAGE_KEY: &str = "financial_transactions";

/// Durable key-value storage for snapshots.
pub trait SnapshotStore: Send + Sync {
    /// Reads the bytes stored under `key`, or `None` if nothing was stored.
    ///
    /// # Errors
    ///
    /// Returns `CacheError::Io` if the backing storage cannot be read.
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError>;

    /// Replaces the bytes stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns `CacheError::Io` if the backing storage cannot be written.
    fn write(&self, key: &str, bytes: &[u8]) -> Result<(), CacheError>;
}

/// Snapshots stored as `<dir>/<key>.json`.
#[derive(Debug, Clone)]
pub struct FsSnapshotStore {
    dir: PathBuf,
}

impl FsSnapshotStore {
    /// Creates a store rooted at `dir`. The directory is created on first write.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Root directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the snapshot for `key`.
    #[must_use]
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl SnapshotStore for FsSnapshotStore {
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        match fs::read(self.path_for(key)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, key: &str, bytes: &[u8]) -> Result<(), CacheError> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path_for(key);
        // Write to a sibling temp file, then rename over the snapshot.
        let temp_path = self.dir.join(format!("{key}.json.tmp"));
        fs::write(&temp_path, bytes)?;
        fs::rename(&temp_path, &path)?;
        Ok(())
    }
}

/// In-memory snapshots. Clones share the same storage.
#[derive(Debug, Clone, Default)]
pub struct MemorySnapshotStore {
    entries: Arc<Mutex<HashMap<String, Vec<u8>>>>,
}

impl MemorySnapshotStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current bytes under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    /// Stores raw bytes under `key`, bypassing the cache.
    pub fn put(&self, key: &str, bytes: impl Into<Vec<u8>>) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), bytes.into());
    }
}

impl SnapshotStore for MemorySnapshotStore {
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        Ok(self.get(key))
    }

    fn write(&self, key: &str, bytes: &[u8]) -> Result<(), CacheError> {
        self.put(key, bytes);
        Ok(())
    }
}

/// Fallback writes the remote store has not seen yet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingWrites {
    /// Highest local sequence ever minted. Local ids are never reused.
    #[serde(default)]
    pub last_local_sequence: u64,
    /// Records created in the cache. They keep their local ids.
    #[serde(default)]
    pub created: BTreeSet<TransactionId>,
    /// Remote records edited in the cache, to be written back.
    #[serde(default)]
    pub updated: BTreeSet<TransactionId>,
    /// Remote records deleted in the cache, to be deleted remotely.
    #[serde(default)]
    pub deleted: BTreeSet<TransactionId>,
}

impl PendingWrites {
    /// Returns true if some write still has to reach the remote store.
    #[must_use]
    pub fn needs_replay(&self) -> bool {
        !self.updated.is_empty() || !self.deleted.is_empty()
    }
}

/// The local transaction collection and its durable snapshot.
pub struct LocalCache {
    store: Box<dyn SnapshotStore>,
    key: String,
    transactions: Vec<Transaction>,
    pending: PendingWrites,
}

impl std::fmt::Debug for LocalCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalCache")
            .field("key", &self.key)
            .field("len", &self.transactions.len())
            .field("pending", &self.pending)
            .finish_non_exhaustive()
    }
}

impl LocalCache {
    /// Creates an empty, unloaded cache over `store`.
    pub fn new(store: impl SnapshotStore + 'static, key: impl Into<String>) -> Self {
        Self {
            store: Box::new(store),
            key: key.into(),
            transactions: Vec::new(),
            pending: PendingWrites::default(),
        }
    }

    /// Creates a cache and loads it with [`LocalCache::load_or_seed`].
    ///
    /// # Errors
    ///
    /// See [`LocalCache::load_or_seed`].
    pub fn open(store: impl SnapshotStore + 'static, key: impl Into<String>) -> Result<Self, CacheError> {
        let mut cache = Self::new(store, key);
        cache.load_or_seed()?;
        Ok(cache)
    }

    /// Storage key of the snapshot.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Storage key of the pending-writes journal.
    #[must_use]
    pub fn pending_key(&self) -> String {
        format!("{}.pending", self.key)
    }

    /// Fallback writes not yet seen by the remote store.
    #[must_use]
    pub fn pending(&self) -> &PendingWrites {
        &self.pending
    }

    /// Loads the persisted snapshot, seeding and persisting the baseline set
    /// when the snapshot is absent or cannot be decoded.
    ///
    /// A decodable snapshot is never rewritten here, so repeated calls leave
    /// the stored bytes unchanged.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage cannot be read, or if the seed cannot
    /// be written.
    pub fn load_or_seed(&mut self) -> Result<&[Transaction], CacheError> {
        self.load_pending()?;
        match self.store.read(&self.key)? {
            Some(bytes) => match serde_json::from_slice::<Vec<Transaction>>(&bytes) {
                Ok(mut transactions) => {
                    sort_canonical(&mut transactions);
                    debug!(key = %self.key, count = transactions.len(), "Loaded local snapshot");
                    self.transactions = transactions;
                }
                Err(e) => {
                    let corrupt = CacheError::Corrupt {
                        key: self.key.clone(),
                        reason: e.to_string(),
                    };
                    warn!(error = %corrupt, "Discarding local snapshot and re-seeding");
                    self.seed()?;
                }
            },
            None => {
                debug!(key = %self.key, "No local snapshot, seeding baseline");
                self.seed()?;
            }
        }
        Ok(&self.transactions)
    }

    /// Sorts the collection and writes it to the snapshot store.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding or writing fails.
    pub fn persist(&mut self) -> Result<(), CacheError> {
        sort_canonical(&mut self.transactions);
        let bytes = serde_json::to_vec_pretty(&self.transactions)?;
        self.store.write(&self.key, &bytes)
    }

    fn load_pending(&mut self) -> Result<(), CacheError> {
        let key = self.pending_key();
        self.pending = match self.store.read(&key)? {
            Some(bytes) => serde_json::from_slice(&bytes).unwrap_or_else(|e| {
                warn!(key = %key, error = %e, "Discarding undecodable pending-writes journal");
                PendingWrites::default()
            }),
            None => PendingWrites::default(),
        };
        Ok(())
    }

    fn persist_pending(&self) -> Result<(), CacheError> {
        let bytes = serde_json::to_vec_pretty(&self.pending)?;
        self.store.write(&self.pending_key(), &bytes)
    }

    /// The full collection in canonical order.
    #[must_use]
    pub fn all(&self) -> &[Transaction] {
        &self.transactions
    }

    /// Looks up a transaction by id.
    #[must_use]
    pub fn find_by_id(&self, id: &TransactionId) -> Option<&Transaction> {
        self.transactions.iter().find(|tx| &tx.id == id)
    }

    /// Transactions accepted by `predicate`, in canonical order.
    pub fn query<P>(&self, predicate: P) -> Vec<Transaction>
    where
        P: Fn(&Transaction) -> bool,
    {
        self.transactions
            .iter()
            .filter(|tx| predicate(tx))
            .cloned()
            .collect()
    }

    /// Inserts or replaces a transaction by id, then persists.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be written.
    pub fn upsert(&mut self, transaction: Transaction) -> Result<(), CacheError> {
        self.merge(transaction);
        self.persist()
    }

    /// Inserts or replaces several transactions with a single write.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be written.
    pub fn upsert_many(&mut self, transactions: impl IntoIterator<Item = Transaction>) -> Result<(), CacheError> {
        let mut changed = false;
        for transaction in transactions {
            changed |= self.merge(transaction);
        }
        if changed { self.persist() } else { Ok(()) }
    }

    /// Removes a transaction by id, then persists.
    ///
    /// Returns the removed transaction, or `None` if the id was not cached.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be written.
    pub fn remove(&mut self, id: &TransactionId) -> Result<Option<Transaction>, CacheError> {
        let Some(index) = self.transactions.iter().position(|tx| &tx.id == id) else {
            return Ok(None);
        };
        let removed = self.transactions.remove(index);
        self.persist()?;
        let retired = self.note_local_sequence(id);
        let forgotten = self.pending.created.remove(id) | self.pending.updated.remove(id);
        if retired || forgotten {
            self.persist_pending()?;
        }
        Ok(Some(removed))
    }

    /// Replaces the whole collection, then persists.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be written.
    pub fn replace_all(&mut self, transactions: Vec<Transaction>) -> Result<(), CacheError> {
        self.transactions = transactions;
        self.persist()
    }

    /// Replaces the collection with the remote rows, keeping records created
    /// in the cache that the remote store does not know.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be written.
    pub fn merge_remote(&mut self, rows: Vec<Transaction>) -> Result<(), CacheError> {
        let remote_ids: BTreeSet<&TransactionId> = rows.iter().map(|tx| &tx.id).collect();
        let kept: Vec<Transaction> = self
            .transactions
            .iter()
            .filter(|tx| self.pending.created.contains(&tx.id) && !remote_ids.contains(&tx.id))
            .cloned()
            .collect();
        self.transactions = rows;
        self.transactions.extend(kept);
        self.persist()
    }

    /// Next locally minted id: one past both the largest numeric suffix
    /// cached and the highest local sequence ever minted.
    #[must_use]
    pub fn next_local_id(&self) -> TransactionId {
        let max = self
            .transactions
            .iter()
            .filter_map(|tx| tx.id.sequence())
            .max()
            .unwrap_or(0)
            .max(self.pending.last_local_sequence);
        TransactionId::local(max.saturating_add(1))
    }

    /// Inserts a record created while the remote store was unreachable.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot or the journal cannot be written.
    pub fn insert_local(&mut self, transaction: Transaction) -> Result<(), CacheError> {
        self.note_local_sequence(&transaction.id);
        self.pending.created.insert(transaction.id.clone());
        self.upsert(transaction)?;
        self.persist_pending()
    }

    /// Records an edit of a remote record made while the remote store was
    /// unreachable. Records created locally need no write-back.
    ///
    /// # Errors
    ///
    /// Returns an error if the journal cannot be written.
    pub fn mark_updated(&mut self, id: &TransactionId) -> Result<(), CacheError> {
        if self.pending.created.contains(id) || id.is_local() {
            return Ok(());
        }
        if self.pending.updated.insert(id.clone()) {
            self.persist_pending()?;
        }
        Ok(())
    }

    /// Records a delete of a remote record made while the remote store was
    /// unreachable.
    ///
    /// # Errors
    ///
    /// Returns an error if the journal cannot be written.
    pub fn mark_deleted(&mut self, id: &TransactionId) -> Result<(), CacheError> {
        if id.is_local() {
            return Ok(());
        }
        self.pending.updated.remove(id);
        if self.pending.deleted.insert(id.clone()) {
            self.persist_pending()?;
        }
        Ok(())
    }

    /// Forgets a pending update or delete once the remote store applied it.
    ///
    /// # Errors
    ///
    /// Returns an error if the journal cannot be written.
    pub fn settle(&mut self, id: &TransactionId) -> Result<(), CacheError> {
        let updated = self.pending.updated.remove(id);
        let deleted = self.pending.deleted.remove(id);
        if updated || deleted {
            self.persist_pending()?;
        }
        Ok(())
    }

    /// Returns true if the high-water mark moved.
    fn note_local_sequence(&mut self, id: &TransactionId) -> bool {
        match id.sequence() {
            Some(seq) if id.is_local() && seq > self.pending.last_local_sequence => {
                self.pending.last_local_sequence = seq;
                true
            }
            _ => false,
        }
    }

    /// Returns true if the collection changed.
    fn merge(&mut self, transaction: Transaction) -> bool {
        match self.transactions.iter_mut().find(|tx| tx.id == transaction.id) {
            Some(existing) if *existing == transaction => false,
            Some(existing) => {
                *existing = transaction;
                true
            }
            None => {
                self.transactions.push(transaction);
                true
            }
        }
    }

    fn seed(&mut self) -> Result<(), CacheError> {
        self.transactions = seed::baseline();
        self.persist()
    }
}
