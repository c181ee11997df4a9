//! Baseline sample set used to initialize an empty store.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use vitrine_shared::types::TransactionId;

use super::ordering::sort_canonical;
use super::types::{
    LinkedEntityType, PaymentMethod, Transaction, TransactionStatus, TransactionType,
};

struct SeedRow {
    seq: u64,
    description: &'static str,
    cents: i64,
    transaction_type: TransactionType,
    category: &'static str,
    status: TransactionStatus,
    date: (i32, u32, u32),
    due: Option<(i32, u32, u32)>,
    payment_method: Option<PaymentMethod>,
    sale: Option<&'static str>,
}

const SEED: &[SeedRow] = &[
    SeedRow {
        seq: 1,
        description: "Sale #1001 - Summer collection",
        cents: 125_000,
        transaction_type: TransactionType::Income,
        category: "Sales",
        status: TransactionStatus::Confirmed,
        date: (2024, 1, 5),
        due: None,
        payment_method: Some(PaymentMethod::Pix),
        sale: Some("1001"),
    },
    SeedRow {
        seq: 2,
        description: "Store rent - January",
        cents: 180_000,
        transaction_type: TransactionType::Expense,
        category: "Rent",
        status: TransactionStatus::Confirmed,
        date: (2024, 1, 10),
        due: Some((2024, 1, 10)),
        payment_method: Some(PaymentMethod::BankSlip),
        sale: None,
    },
    SeedRow {
        seq: 3,
        description: "Sale #1002 - Leather bags",
        cents: 89_990,
        transaction_type: TransactionType::Income,
        category: "Sales",
        status: TransactionStatus::Confirmed,
        date: (2024, 1, 12),
        due: None,
        payment_method: Some(PaymentMethod::Credit),
        sale: Some("1002"),
    },
    SeedRow {
        seq: 4,
        description: "Supplier restock - Denim",
        cents: 54_000,
        transaction_type: TransactionType::Expense,
        category: "Suppliers",
        status: TransactionStatus::Pending,
        date: (2024, 1, 15),
        due: Some((2024, 2, 15)),
        payment_method: Some(PaymentMethod::Transfer),
        sale: None,
    },
    SeedRow {
        seq: 5,
        description: "Electricity bill",
        cents: 23_450,
        transaction_type: TransactionType::Expense,
        category: "Utilities",
        status: TransactionStatus::Confirmed,
        date: (2024, 1, 20),
        due: Some((2024, 1, 25)),
        payment_method: Some(PaymentMethod::Debit),
        sale: None,
    },
    SeedRow {
        seq: 6,
        description: "Sale #1003 - Canceled order",
        cents: 31_000,
        transaction_type: TransactionType::Income,
        category: "Sales",
        status: TransactionStatus::Canceled,
        date: (2024, 1, 20),
        due: None,
        payment_method: Some(PaymentMethod::Cash),
        sale: Some("1003"),
    },
];

/// The baseline sample transactions, in canonical order.
#[must_use]
pub fn baseline() -> Vec<Transaction> {
    let mut transactions: Vec<Transaction> = SEED.iter().filter_map(SeedRow::materialize).collect();
    sort_canonical(&mut transactions);
    transactions
}

impl SeedRow {
    fn materialize(&self) -> Option<Transaction> {
        let transaction_date = ymd(self.date)?;
        let paid = self.status == TransactionStatus::Confirmed;
        Some(Transaction {
            id: TransactionId::local(self.seq),
            description: self.description.to_string(),
            amount: Decimal::new(self.cents, 2),
            transaction_type: self.transaction_type,
            category: self.category.to_string(),
            status: self.status,
            transaction_date,
            due_date: self.due.and_then(ymd),
            payment_date: paid.then_some(transaction_date),
            payment_method: self.payment_method,
            notes: None,
            linked_entity_id: self.sale.map(str::to_string),
            linked_entity_type: self.sale.map(|_| LinkedEntityType::Sale),
            receipt_url: None,
            related_sale_link: self.sale.map(|sale| format!("/sales/{sale}")),
        })
    }
}

fn ymd((y, m, d): (i32, u32, u32)) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(y, m, d)
}
