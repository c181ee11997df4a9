//! Canonical transaction order.
//!
//! 1. `transaction_date` descending.
//! 2. Numeric suffix of the id descending (most recently created first).
//!    Ids without digits sort after ids with digits.
//! 3. Full id descending, which makes the order total.

use std::cmp::Ordering;

use vitrine_shared::types::TransactionId;

use super::types::Transaction;

/// Compares two transactions in canonical order.
#[must_use]
pub fn canonical_cmp(a: &Transaction, b: &Transaction) -> Ordering {
    b.transaction_date
        .cmp(&a.transaction_date)
        .then_with(|| compare_id_suffix(&b.id, &a.id))
        .then_with(|| b.id.cmp(&a.id))
}

/// Sorts a collection in canonical order.
pub fn sort_canonical(transactions: &mut [Transaction]) {
    transactions.sort_by(canonical_cmp);
}

/// Returns true if the collection already satisfies the canonical order.
#[must_use]
pub fn is_canonical(transactions: &[Transaction]) -> bool {
    transactions
        .windows(2)
        .all(|pair| canonical_cmp(&pair[0], &pair[1]) != Ordering::Greater)
}

/// Ascending comparison of the numeric suffixes of two ids.
///
/// Digit strings are compared by length then lexically, so arbitrarily long
/// suffixes never overflow.
#[must_use]
pub fn compare_id_suffix(a: &TransactionId, b: &TransactionId) -> Ordering {
    let (a_digits, b_digits) = (a.digits(), b.digits());
    let (a_has, b_has) = (has_digits(a), has_digits(b));

    match (a_has, b_has) {
        (false, false) => Ordering::Equal,
        (false, true) => Ordering::Less,
        (true, false) => Ordering::Greater,
        (true, true) => a_digits
            .len()
            .cmp(&b_digits.len())
            .then_with(|| a_digits.cmp(&b_digits)),
    }
}

fn has_digits(id: &TransactionId) -> bool {
    id.as_str().chars().any(|c| c.is_ascii_digit())
}
