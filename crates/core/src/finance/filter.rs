//! List filters.
//!
//! [`TransactionFilter::matches`] is the in-process predicate used by the local
//! cache. The remote adapter translates the same fields into SQL with the same
//! semantics: inclusive date bounds, exact category, case-insensitive search
//! over description, id and notes.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::types::{LinkedEntityType, Transaction, TransactionStatus, TransactionType};

/// Inclusive range of business calendar dates. Open ends are unbounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    /// First day included.
    pub from: Option<NaiveDate>,
    /// Last day included.
    pub to: Option<NaiveDate>,
}

impl DateRange {
    /// Range between two inclusive bounds.
    #[must_use]
    pub const fn new(from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        Self { from, to }
    }

    /// Range with no bounds.
    #[must_use]
    pub const fn all() -> Self {
        Self { from: None, to: None }
    }

    /// Returns true if `date` lies inside the range.
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from.is_none_or(|from| date >= from) && self.to.is_none_or(|to| date <= to)
    }
}

/// Back-reference filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkFilter {
    /// Originating entity id.
    pub entity_id: String,
    /// Originating entity kind, if it matters.
    pub entity_type: Option<LinkedEntityType>,
}

/// Filter options for listing transactions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionFilter {
    /// Filter by direction.
    pub transaction_type: Option<TransactionType>,
    /// Filter by status.
    pub status: Option<TransactionStatus>,
    /// Filter by business date range.
    pub date_range: DateRange,
    /// Filter by exact category.
    pub category: Option<String>,
    /// Case-insensitive text over description, id and notes.
    pub search: Option<String>,
    /// Filter by originating entity.
    pub link: Option<LinkFilter>,
}

impl TransactionFilter {
    /// Filter selecting a date range only.
    #[must_use]
    pub fn in_range(date_range: DateRange) -> Self {
        Self {
            date_range,
            ..Self::default()
        }
    }

    /// Trimmed, non-empty search text.
    #[must_use]
    pub fn search_text(&self) -> Option<&str> {
        self.search.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }

    /// Returns true if the transaction passes every active criterion.
    #[must_use]
    pub fn matches(&self, tx: &Transaction) -> bool {
        if self.transaction_type.is_some_and(|t| t != tx.transaction_type) {
            return false;
        }
        if self.status.is_some_and(|s| s != tx.status) {
            return false;
        }
        if !self.date_range.contains(tx.transaction_date) {
            return false;
        }
        if self.category.as_deref().is_some_and(|c| c != tx.category) {
            return false;
        }
        if let Some(link) = &self.link {
            if tx.linked_entity_id.as_deref() != Some(link.entity_id.as_str()) {
                return false;
            }
            if link.entity_type.is_some() && link.entity_type != tx.linked_entity_type {
                return false;
            }
        }
        if let Some(needle) = self.search_text() {
            let needle = needle.to_lowercase();
            let hit = tx.description.to_lowercase().contains(&needle)
                || tx.id.as_str().to_lowercase().contains(&needle)
                || tx
                    .notes
                    .as_deref()
                    .is_some_and(|n| n.to_lowercase().contains(&needle));
            if !hit {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use vitrine_shared::types::TransactionId;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sale_income() -> Transaction {
        Transaction {
            id: TransactionId::new("TRX014"),
            description: "Sale #88 - Blue sneakers".to_string(),
            amount: dec!(289.90),
            transaction_type: TransactionType::Income,
            category: "Sales".to_string(),
            status: TransactionStatus::Confirmed,
            transaction_date: date(2024, 3, 15),
            due_date: None,
            payment_date: Some(date(2024, 3, 15)),
            payment_method: None,
            notes: Some("Paid via PIX".to_string()),
            linked_entity_id: Some("SALE-88".to_string()),
            linked_entity_type: Some(LinkedEntityType::Sale),
            receipt_url: None,
            related_sale_link: None,
        }
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        assert!(TransactionFilter::default().matches(&sale_income()));
    }

    #[test]
    fn test_date_range_is_inclusive() {
        let tx = sale_income();
        let exact = DateRange::new(Some(date(2024, 3, 15)), Some(date(2024, 3, 15)));
        assert!(TransactionFilter::in_range(exact).matches(&tx));

        let before = DateRange::new(None, Some(date(2024, 3, 14)));
        assert!(!TransactionFilter::in_range(before).matches(&tx));

        let after = DateRange::new(Some(date(2024, 3, 16)), None);
        assert!(!TransactionFilter::in_range(after).matches(&tx));
    }

    #[test]
    fn test_search_covers_description_id_and_notes() {
        let tx = sale_income();
        for needle in ["sneakers", "trx014", "pix", "  SALE #88  "] {
            let filter = TransactionFilter {
                search: Some(needle.to_string()),
                ..TransactionFilter::default()
            };
            assert!(filter.matches(&tx), "search {needle:?} should match");
        }

        let miss = TransactionFilter {
            search: Some("rent".to_string()),
            ..TransactionFilter::default()
        };
        assert!(!miss.matches(&tx));
    }

    #[test]
    fn test_blank_search_is_ignored() {
        let filter = TransactionFilter {
            search: Some("   ".to_string()),
            ..TransactionFilter::default()
        };
        assert!(filter.search_text().is_none());
        assert!(filter.matches(&sale_income()));
    }

    #[test]
    fn test_category_is_exact() {
        let filter = TransactionFilter {
            category: Some("sales".to_string()),
            ..TransactionFilter::default()
        };
        assert!(!filter.matches(&sale_income()));
    }

    #[test]
    fn test_link_filter() {
        let tx = sale_income();
        let by_id = TransactionFilter {
            link: Some(LinkFilter {
                entity_id: "SALE-88".to_string(),
                entity_type: None,
            }),
            ..TransactionFilter::default()
        };
        assert!(by_id.matches(&tx));

        let wrong_kind = TransactionFilter {
            link: Some(LinkFilter {
                entity_id: "SALE-88".to_string(),
                entity_type: Some(LinkedEntityType::Purchase),
            }),
            ..TransactionFilter::default()
        };
        assert!(!wrong_kind.matches(&tx));
    }

    #[test]
    fn test_type_and_status() {
        let tx = sale_income();
        let expenses = TransactionFilter {
            transaction_type: Some(TransactionType::Expense),
            ..TransactionFilter::default()
        };
        assert!(!expenses.matches(&tx));

        let pending = TransactionFilter {
            status: Some(TransactionStatus::Pending),
            ..TransactionFilter::default()
        };
        assert!(!pending.matches(&tx));
    }
}
