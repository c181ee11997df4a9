//! Property-based tests for TransactionStore.
//!
//! - Canonical order holds after any sequence of create/update/delete
//! - Business dates round-trip through the storage instant
//! - Balance counts confirmed transactions only

use chrono::{Days, NaiveDate};
use proptest::prelude::*;
use rust_decimal::Decimal;
use vitrine_shared::types::PageRequest;

use super::cache::{DEFAULT_STORAGE_KEY, LocalCache, MemorySnapshotStore};
use super::date::DateNormalizer;
use super::fake::InMemoryRemote;
use super::filter::{DateRange, TransactionFilter};
use super::ordering::is_canonical;
use super::store::TransactionStore;
use super::types::{TransactionDraft, TransactionPatch, TransactionStatus, TransactionType};

/// Strategy to generate positive amounts (0.01 to 10,000.00).
fn positive_amount() -> impl Strategy<Value = Decimal> {
    (1i64..1_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy to generate dates across several years, leap days included.
fn any_date() -> impl Strategy<Value = NaiveDate> {
    (0u64..3_000).prop_map(|offset| {
        NaiveDate::from_ymd_opt(2020, 1, 1)
            .unwrap()
            .checked_add_days(Days::new(offset))
            .unwrap()
    })
}

fn transaction_type() -> impl Strategy<Value = TransactionType> {
    prop_oneof![Just(TransactionType::Income), Just(TransactionType::Expense)]
}

fn status() -> impl Strategy<Value = TransactionStatus> {
    prop_oneof![
        Just(TransactionStatus::Confirmed),
        Just(TransactionStatus::Pending),
        Just(TransactionStatus::Canceled),
    ]
}

fn draft() -> impl Strategy<Value = TransactionDraft> {
    (positive_amount(), transaction_type(), status(), any_date()).prop_map(
        |(amount, transaction_type, status, date)| TransactionDraft {
            description: Some(format!("{transaction_type} of {amount}")),
            amount: Some(amount),
            transaction_type: Some(transaction_type),
            category: Some("General".to_string()),
            status: Some(status),
            transaction_date: Some(date),
            ..TransactionDraft::default()
        },
    )
}

#[derive(Debug, Clone)]
enum Op {
    Create(TransactionDraft),
    /// Re-date the n-th cached transaction.
    Redate(usize, NaiveDate),
    /// Delete the n-th cached transaction.
    Delete(usize),
    /// Toggle remote availability.
    Outage(bool),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => draft().prop_map(Op::Create),
        1 => (any::<usize>(), any_date()).prop_map(|(n, d)| Op::Redate(n, d)),
        1 => any::<usize>().prop_map(Op::Delete),
        1 => any::<bool>().prop_map(Op::Outage),
    ]
}

fn block_on<F: std::future::Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
        .block_on(future)
}

fn new_store() -> TransactionStore<InMemoryRemote> {
    let cache = LocalCache::open(MemorySnapshotStore::new(), DEFAULT_STORAGE_KEY).unwrap();
    TransactionStore::new(InMemoryRemote::default(), cache)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Both paths return canonically ordered listings after any mutation sequence.
    #[test]
    fn prop_order_holds_after_mutations(ops in prop::collection::vec(op(), 1..25)) {
        block_on(async {
            let store = new_store();
            for op in ops {
                match op {
                    Op::Create(draft) => {
                        store.create(&draft).await.unwrap();
                    }
                    Op::Redate(n, date) => {
                        let cached = store.cached().await;
                        if !cached.is_empty() {
                            let id = &cached[n % cached.len()].id;
                            let patch = TransactionPatch {
                                transaction_date: Some(date),
                                ..TransactionPatch::default()
                            };
                            let _ = store.update(id, &patch).await;
                        }
                    }
                    Op::Delete(n) => {
                        let cached = store.cached().await;
                        if !cached.is_empty() {
                            let _ = store.delete(&cached[n % cached.len()].id).await;
                        }
                    }
                    Op::Outage(offline) => store.remote().set_offline(offline),
                }

                assert!(is_canonical(&store.cached().await));
                let page = store
                    .list(&TransactionFilter::default(), PageRequest::unbounded())
                    .await
                    .unwrap();
                assert!(is_canonical(&page.value.data));
            }
        });
    }

    /// `to_calendar_date(to_storage_instant(d)) == d` for every date and offset.
    #[test]
    fn prop_date_round_trip(date in any_date(), minutes in -720i32..=840) {
        let normalizer = DateNormalizer::from_offset_minutes(minutes).unwrap();
        prop_assert_eq!(normalizer.to_calendar_date(normalizer.to_storage_instant(date)), date);

        let (start, end) = normalizer.day_bounds(date);
        prop_assert!(start < end);
        prop_assert_eq!(normalizer.to_calendar_date(start), date);
    }

    /// The summary balance equals confirmed income minus confirmed expense.
    #[test]
    fn prop_balance_counts_confirmed_only(
        drafts in prop::collection::vec(draft(), 0..30),
        offline in any::<bool>(),
    ) {
        let expected: Decimal = drafts
            .iter()
            .filter(|d| d.status == Some(TransactionStatus::Confirmed))
            .map(|d| match d.transaction_type {
                Some(TransactionType::Income) => d.amount.unwrap_or_default(),
                _ => -d.amount.unwrap_or_default(),
            })
            .sum();

        let balance = block_on(async {
            let cache = LocalCache::open(MemorySnapshotStore::new(), DEFAULT_STORAGE_KEY).unwrap();
            let store = TransactionStore::new(InMemoryRemote::default(), cache);
            store.remote().set_offline(offline);
            // Start from an empty collection so the seed does not count.
            let seeded = store.cached().await;
            for tx in &seeded {
                store.delete(&tx.id).await.unwrap();
            }
            for draft in &drafts {
                store.create(draft).await.unwrap();
            }
            let summary = store.summarize(DateRange::all()).await.unwrap().value;
            let page = store
                .list(&TransactionFilter::default(), PageRequest::new(1, 1))
                .await
                .unwrap()
                .value;
            assert_eq!(summary.balance, page.current_balance);
            summary.balance
        });

        prop_assert_eq!(balance, expected);
    }
}
