//! `SeaORM` entity definitions.

pub mod financial_transactions;
