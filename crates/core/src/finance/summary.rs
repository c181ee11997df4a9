//! Balance and period summaries.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::types::{Transaction, TransactionStatus, TransactionType};

/// Income and expense totals for a set of transactions.
///
/// Totals, balance and category breakdowns count confirmed transactions only.
/// Pending amounts are reported separately; canceled ones are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialSummary {
    /// Confirmed income.
    pub total_income: Decimal,
    /// Confirmed expense.
    pub total_expense: Decimal,
    /// `total_income - total_expense`.
    pub balance: Decimal,
    /// Confirmed income per category.
    pub income_by_category: BTreeMap<String, Decimal>,
    /// Confirmed expense per category.
    pub expense_by_category: BTreeMap<String, Decimal>,
    /// Income still awaiting payment.
    pub pending_income: Decimal,
    /// Expense still awaiting payment.
    pub pending_expense: Decimal,
}

impl FinancialSummary {
    /// Summarizes a set of transactions.
    #[must_use]
    pub fn from_transactions<'a, I>(transactions: I) -> Self
    where
        I: IntoIterator<Item = &'a Transaction>,
    {
        let mut summary = Self::default();
        for tx in transactions {
            summary.add(tx);
        }
        summary.balance = summary.total_income - summary.total_expense;
        summary
    }

    fn add(&mut self, tx: &Transaction) {
        match (tx.status, tx.transaction_type) {
            (TransactionStatus::Canceled, _) => {}
            (TransactionStatus::Pending, TransactionType::Income) => {
                self.pending_income += tx.amount;
            }
            (TransactionStatus::Pending, TransactionType::Expense) => {
                self.pending_expense += tx.amount;
            }
            (TransactionStatus::Confirmed, TransactionType::Income) => {
                self.total_income += tx.amount;
                *self
                    .income_by_category
                    .entry(tx.category.clone())
                    .or_default() += tx.amount;
            }
            (TransactionStatus::Confirmed, TransactionType::Expense) => {
                self.total_expense += tx.amount;
                *self
                    .expense_by_category
                    .entry(tx.category.clone())
                    .or_default() += tx.amount;
            }
        }
    }
}

/// Net balance of the confirmed transactions in `transactions`.
#[must_use]
pub fn confirmed_balance<'a, I>(transactions: I) -> Decimal
where
    I: IntoIterator<Item = &'a Transaction>,
{
    transactions
        .into_iter()
        .filter(|tx| tx.is_confirmed())
        .map(Transaction::signed_amount)
        .sum()
}
