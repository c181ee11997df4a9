//! Error types for the transaction store.
//!
//! Only [`StoreError`] ever reaches callers. Remote and cache failures are
//! recovered inside the store and logged.

use thiserror::Error;
use vitrine_shared::types::TransactionId;

/// Errors surfaced by the transaction store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A required field is missing or malformed.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The record is absent from the path that served the request.
    #[error("Transaction not found: {0}")]
    NotFound(TransactionId),

    /// The local snapshot could not be written.
    #[error("Local cache write failed: {0}")]
    Cache(#[from] CacheError),
}

impl StoreError {
    /// Create a validation error.
    #[must_use]
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Returns the error code for client responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Cache(_) => "CACHE_ERROR",
        }
    }
}

/// Failures of the remote store. Every variant triggers the local fallback.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// Query or connection failure reported by the backend.
    #[error("Database error: {0}")]
    Database(String),

    /// The call did not finish within the configured bound.
    #[error("Remote call timed out after {0} ms")]
    Timeout(u64),

    /// A row could not be translated into a transaction.
    #[error("Malformed remote row: {0}")]
    Mapping(String),
}

/// Failures of the local snapshot.
#[derive(Debug, Error)]
pub enum CacheError {
    /// The snapshot exists but cannot be decoded.
    #[error("Corrupt snapshot under '{key}': {reason}")]
    Corrupt {
        /// Storage key of the snapshot.
        key: String,
        /// Decoder message.
        reason: String,
    },

    /// Reading or writing the backing storage failed.
    #[error("Snapshot I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// The collection could not be encoded.
    #[error("Snapshot encoding failed: {0}")]
    Serialize(#[from] serde_json::Error),
}
