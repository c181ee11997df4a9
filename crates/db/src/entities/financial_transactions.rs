//! `SeaORM` Entity for the financial_transactions table.
//!
//! The `column_name` attributes are the only mapping between domain field
//! names and stored column names. Reads, writes, filters and the insert
//! procedure's argument list all go through this entity.

use sea_orm::entity::prelude::*;
use sea_orm::Iterable;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "financial_transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    #[sea_orm(column_name = "descricao")]
    pub description: String,
    #[sea_orm(column_name = "valor", column_type = "Decimal(Some((14, 2)))")]
    pub amount: Decimal,
    #[sea_orm(column_name = "tipo")]
    pub transaction_type: String,
    #[sea_orm(column_name = "categoria")]
    pub category: String,
    pub status: String,
    #[sea_orm(column_name = "data")]
    pub transaction_date: DateTimeWithTimeZone,
    #[sea_orm(column_name = "datavencimento")]
    pub due_date: Option<DateTimeWithTimeZone>,
    #[sea_orm(column_name = "datapagamento")]
    pub payment_date: Option<DateTimeWithTimeZone>,
    #[sea_orm(column_name = "formapagamento")]
    pub payment_method: Option<String>,
    #[sea_orm(column_name = "observacoes")]
    pub notes: Option<String>,
    #[sea_orm(column_name = "vinculoid")]
    pub linked_entity_id: Option<String>,
    #[sea_orm(column_name = "vinculotipo")]
    pub linked_entity_type: Option<String>,
    #[sea_orm(column_name = "comprovanteurl")]
    pub receipt_url: Option<String>,
    #[sea_orm(column_name = "linkvenda")]
    pub related_sale_link: Option<String>,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Column {
    /// Columns filled by the database on insert.
    #[must_use]
    pub const fn is_generated(self) -> bool {
        matches!(self, Self::Id | Self::CreatedAt)
    }

    /// Columns supplied by the caller on insert, in declaration order.
    pub fn writable() -> impl Iterator<Item = Self> {
        Self::iter().filter(|column| !column.is_generated())
    }
}
