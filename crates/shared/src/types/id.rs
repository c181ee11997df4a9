//! Transaction identifiers.
//!
//! Remote ids are opaque strings assigned by the database. Ids minted while the
//! remote store is unreachable follow the `TRX` + zero-padded sequence scheme so
//! they still sort by creation order.

use serde::{Deserialize, Serialize};

/// Prefix of locally minted transaction ids.
pub const LOCAL_ID_PREFIX: &str = "TRX";

/// Minimum digit count of the local sequence.
const LOCAL_ID_WIDTH: usize = 3;

/// Unique identifier for a financial transaction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(String);

impl TransactionId {
    /// Wraps an existing id.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Mints a local id for the given sequence number, e.g. `TRX007`.
    #[must_use]
    pub fn local(sequence: u64) -> Self {
        Self(format!("{LOCAL_ID_PREFIX}{sequence:0width$}", width = LOCAL_ID_WIDTH))
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true for ids minted by [`TransactionId::local`].
    #[must_use]
    pub fn is_local(&self) -> bool {
        self.0.starts_with(LOCAL_ID_PREFIX)
    }

    /// All digits of the id with leading zeros removed (`"FT000120"` → `"120"`).
    ///
    /// Empty when the id carries no digits or only zeros.
    #[must_use]
    pub fn digits(&self) -> String {
        self.0
            .chars()
            .filter(char::is_ascii_digit)
            .skip_while(|c| *c == '0')
            .collect()
    }

    /// The numeric suffix as an integer, if it has one that fits in `u64`.
    #[must_use]
    pub fn sequence(&self) -> Option<u64> {
        let has_digits = self.0.chars().any(|c| c.is_ascii_digit());
        if !has_digits {
            return None;
        }
        let digits = self.digits();
        if digits.is_empty() {
            return Some(0);
        }
        digits.parse().ok()
    }
}

impl std::fmt::Display for TransactionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for TransactionId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_string()))
    }
}

impl From<&str> for TransactionId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for TransactionId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl AsRef<str> for TransactionId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
