//! Financial transaction repository, the `SeaORM` implementation of
//! [`RemoteStore`].
//!
//! Business dates are stored as the noon instant of the business day.
//! Date-range filters use the half-open UTC bounds of the business days, and
//! the canonical order is expressed in SQL over the same business date.

use std::str::FromStr;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::sea_query::{Expr, NullOrdering};
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, Condition, DatabaseBackend, DatabaseConnection,
    DbErr, EntityTrait, FromQueryResult, IdenStatic, Order, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Select, Set, Statement,
};
use tracing::{debug, warn};
use vitrine_core::finance::{
    DateNormalizer, NewTransaction, RemoteError, RemotePage, RemoteStore, Transaction,
    TransactionFilter, TransactionPatch, TransactionStatus, TransactionType,
};
use vitrine_shared::types::{PageRequest, TransactionId};

use crate::entities::financial_transactions::{ActiveModel, Column, Entity, Model};

/// Name of the server-side insert procedure.
pub const INSERT_PROCEDURE: &str = "insert_financial_transaction";

/// Transaction repository backed by `SeaORM`.
#[derive(Debug, Clone)]
pub struct TransactionRepository {
    db: DatabaseConnection,
    normalizer: DateNormalizer,
    use_insert_procedure: bool,
}

impl TransactionRepository {
    /// Creates a new transaction repository using the generic insert.
    #[must_use]
    pub const fn new(db: DatabaseConnection, normalizer: DateNormalizer) -> Self {
        Self {
            db,
            normalizer,
            use_insert_procedure: false,
        }
    }

    /// Prefer the insert procedure for creates. The generic insert is still
    /// used when the procedure call fails.
    #[must_use]
    pub const fn with_insert_procedure(mut self, enabled: bool) -> Self {
        self.use_insert_procedure = enabled;
        self
    }

    /// The underlying connection.
    #[must_use]
    pub const fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    fn filtered(&self, filter: &TransactionFilter) -> Select<Entity> {
        let mut query = Entity::find();

        if let Some(transaction_type) = filter.transaction_type {
            query = query.filter(Column::TransactionType.eq(transaction_type.as_str()));
        }
        if let Some(status) = filter.status {
            query = query.filter(Column::Status.eq(status.as_str()));
        }
        if let Some(from) = filter.date_range.from {
            let (start, _) = self.normalizer.day_bounds(from);
            query = query.filter(Column::TransactionDate.gte(start));
        }
        if let Some(to) = filter.date_range.to {
            let (_, end) = self.normalizer.day_bounds(to);
            query = query.filter(Column::TransactionDate.lt(end));
        }
        if let Some(category) = &filter.category {
            query = query.filter(Column::Category.eq(category.as_str()));
        }
        if let Some(link) = &filter.link {
            query = query.filter(Column::LinkedEntityId.eq(link.entity_id.as_str()));
            if let Some(kind) = link.entity_type {
                query = query.filter(Column::LinkedEntityType.eq(kind.as_str()));
            }
        }
        if let Some(needle) = filter.search_text() {
            let pattern = format!("%{}%", escape_like(needle));
            query = query.filter(
                Condition::any()
                    .add(Expr::col(Column::Description).ilike(pattern.as_str()))
                    .add(Expr::col(Column::Id).ilike(pattern.as_str()))
                    .add(Expr::col(Column::Notes).ilike(pattern.as_str())),
            );
        }

        query
    }

    /// Canonical order: business date, then numeric id suffix, then id.
    fn ordered(&self, query: Select<Entity>) -> Select<Entity> {
        let offset_minutes = self.normalizer.offset().local_minus_utc() / 60;
        let business_date = format!(
            "((\"{column}\" AT TIME ZONE 'UTC') + interval '{offset_minutes} minutes')::date",
            column = Column::TransactionDate.as_str(),
        );
        let id_suffix = format!(
            "NULLIF(regexp_replace(\"{column}\", '\\D', '', 'g'), '')::numeric",
            column = Column::Id.as_str(),
        );

        query
            .order_by(Expr::cust(business_date), Order::Desc)
            .order_by_with_nulls(Expr::cust(id_suffix), Order::Desc, NullOrdering::Last)
            .order_by(Column::Id, Order::Desc)
    }

    fn stored(&self, date: NaiveDate) -> DateTimeWithTimeZone {
        self.normalizer.to_storage_instant(date).fixed_offset()
    }

    fn calendar(&self, instant: DateTimeWithTimeZone) -> NaiveDate {
        self.normalizer.to_calendar_date(instant.with_timezone(&Utc))
    }

    fn new_active_model(&self, new: &NewTransaction) -> ActiveModel {
        ActiveModel {
            id: ActiveValue::NotSet,
            description: Set(new.description.clone()),
            amount: Set(new.amount),
            transaction_type: Set(new.transaction_type.as_str().to_string()),
            category: Set(new.category.clone()),
            status: Set(new.status.as_str().to_string()),
            transaction_date: Set(self.stored(new.transaction_date)),
            due_date: Set(new.due_date.map(|d| self.stored(d))),
            payment_date: Set(new.payment_date.map(|d| self.stored(d))),
            payment_method: Set(new.payment_method.map(|m| m.as_str().to_string())),
            notes: Set(new.notes.clone()),
            linked_entity_id: Set(new.linked_entity_id.clone()),
            linked_entity_type: Set(new.linked_entity_type.map(|t| t.as_str().to_string())),
            receipt_url: Set(new.receipt_url.clone()),
            related_sale_link: Set(new.related_sale_link.clone()),
            created_at: ActiveValue::NotSet,
        }
    }

    fn apply_patch(&self, active: &mut ActiveModel, patch: &TransactionPatch) {
        if let Some(description) = &patch.description {
            active.description = Set(description.clone());
        }
        if let Some(amount) = patch.amount {
            active.amount = Set(amount);
        }
        if let Some(transaction_type) = patch.transaction_type {
            active.transaction_type = Set(transaction_type.as_str().to_string());
        }
        if let Some(category) = &patch.category {
            active.category = Set(category.clone());
        }
        if let Some(status) = patch.status {
            active.status = Set(status.as_str().to_string());
        }
        if let Some(date) = patch.transaction_date {
            active.transaction_date = Set(self.stored(date));
        }
        if let Some(due_date) = patch.due_date {
            active.due_date = Set(due_date.map(|d| self.stored(d)));
        }
        if let Some(payment_date) = patch.payment_date {
            active.payment_date = Set(payment_date.map(|d| self.stored(d)));
        }
        if let Some(payment_method) = patch.payment_method {
            active.payment_method = Set(payment_method.map(|m| m.as_str().to_string()));
        }
        if let Some(notes) = &patch.notes {
            active.notes = Set(notes.clone());
        }
        if let Some(linked_entity_id) = &patch.linked_entity_id {
            active.linked_entity_id = Set(linked_entity_id.clone());
        }
        if let Some(linked_entity_type) = patch.linked_entity_type {
            active.linked_entity_type = Set(linked_entity_type.map(|t| t.as_str().to_string()));
        }
        if let Some(receipt_url) = &patch.receipt_url {
            active.receipt_url = Set(receipt_url.clone());
        }
        if let Some(related_sale_link) = &patch.related_sale_link {
            active.related_sale_link = Set(related_sale_link.clone());
        }
    }

    fn to_domain(&self, model: Model) -> Result<Transaction, RemoteError> {
        Ok(Transaction {
            transaction_type: parse(&model.transaction_type)?,
            status: parse(&model.status)?,
            transaction_date: self.calendar(model.transaction_date),
            due_date: model.due_date.map(|d| self.calendar(d)),
            payment_date: model.payment_date.map(|d| self.calendar(d)),
            payment_method: model.payment_method.as_deref().map(parse).transpose()?,
            linked_entity_type: model.linked_entity_type.as_deref().map(parse).transpose()?,
            id: TransactionId::new(model.id),
            description: model.description,
            amount: model.amount,
            category: model.category,
            notes: model.notes,
            linked_entity_id: model.linked_entity_id,
            receipt_url: model.receipt_url,
            related_sale_link: model.related_sale_link,
        })
    }

    fn to_domain_all(&self, models: Vec<Model>) -> Result<Vec<Transaction>, RemoteError> {
        models.into_iter().map(|model| self.to_domain(model)).collect()
    }

    /// Calls the insert procedure with one argument per writable column.
    async fn insert_with_procedure(&self, active: &ActiveModel) -> Result<Option<Model>, DbErr> {
        let mut placeholders = Vec::new();
        let mut values = Vec::new();
        for (index, column) in Column::writable().enumerate() {
            let value = active.get(column).into_value().ok_or_else(|| {
                DbErr::Custom(format!("no value for column {}", column.as_str()))
            })?;
            placeholders.push(format!("${}", index + 1));
            values.push(value);
        }

        let sql = format!("SELECT * FROM {INSERT_PROCEDURE}({})", placeholders.join(", "));
        Entity::find()
            .from_raw_sql(Statement::from_sql_and_values(
                DatabaseBackend::Postgres,
                sql,
                values,
            ))
            .one(&self.db)
            .await
    }
}

/// Confirmed total per direction.
#[derive(Debug, FromQueryResult)]
struct TypeTotal {
    tipo: String,
    total: Option<Decimal>,
}

#[async_trait]
impl RemoteStore for TransactionRepository {
    async fn list(
        &self,
        filter: &TransactionFilter,
        page: &PageRequest,
    ) -> Result<RemotePage, RemoteError> {
        let query = self.filtered(filter);
        let total = query.clone().count(&self.db).await.map_err(db_err)?;

        let models = self
            .ordered(query)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await
            .map_err(db_err)?;

        Ok(RemotePage {
            items: self.to_domain_all(models)?,
            total,
        })
    }

    async fn list_all(&self) -> Result<Vec<Transaction>, RemoteError> {
        let models = self
            .ordered(Entity::find())
            .all(&self.db)
            .await
            .map_err(db_err)?;
        self.to_domain_all(models)
    }

    async fn confirmed_balance(&self) -> Result<Decimal, RemoteError> {
        let totals = Entity::find()
            .select_only()
            .column(Column::TransactionType)
            .column_as(Expr::col(Column::Amount).sum(), "total")
            .filter(Column::Status.eq(TransactionStatus::Confirmed.as_str()))
            .group_by(Column::TransactionType)
            .into_model::<TypeTotal>()
            .all(&self.db)
            .await
            .map_err(db_err)?;

        totals.into_iter().try_fold(Decimal::ZERO, |balance, row| {
            let total = row.total.unwrap_or_default();
            match parse::<TransactionType>(&row.tipo)? {
                TransactionType::Income => Ok(balance + total),
                TransactionType::Expense => Ok(balance - total),
            }
        })
    }

    async fn find(&self, id: &TransactionId) -> Result<Option<Transaction>, RemoteError> {
        Entity::find_by_id(id.as_str().to_owned())
            .one(&self.db)
            .await
            .map_err(db_err)?
            .map(|model| self.to_domain(model))
            .transpose()
    }

    async fn insert(&self, new: &NewTransaction) -> Result<Transaction, RemoteError> {
        let active = self.new_active_model(new);

        if self.use_insert_procedure {
            match self.insert_with_procedure(&active).await {
                Ok(Some(model)) => return self.to_domain(model),
                Ok(None) => {
                    warn!(procedure = INSERT_PROCEDURE, "Insert procedure returned no row, using generic insert");
                }
                Err(e) => {
                    warn!(error = %e, procedure = INSERT_PROCEDURE, "Insert procedure failed, using generic insert");
                }
            }
        }

        let model = active.insert(&self.db).await.map_err(db_err)?;
        debug!(id = %model.id, "Inserted financial transaction");
        self.to_domain(model)
    }

    async fn update(
        &self,
        id: &TransactionId,
        patch: &TransactionPatch,
    ) -> Result<Option<Transaction>, RemoteError> {
        let Some(model) = Entity::find_by_id(id.as_str().to_owned())
            .one(&self.db)
            .await
            .map_err(db_err)?
        else {
            return Ok(None);
        };

        let mut active: ActiveModel = model.clone().into();
        self.apply_patch(&mut active, patch);
        if !active.is_changed() {
            return self.to_domain(model).map(Some);
        }

        let updated = active.update(&self.db).await.map_err(db_err)?;
        self.to_domain(updated).map(Some)
    }

    async fn delete(&self, id: &TransactionId) -> Result<bool, RemoteError> {
        let result = Entity::delete_by_id(id.as_str().to_owned())
            .exec(&self.db)
            .await
            .map_err(db_err)?;
        Ok(result.rows_affected > 0)
    }
}

fn db_err(err: DbErr) -> RemoteError {
    RemoteError::Database(err.to_string())
}

fn parse<T>(value: &str) -> Result<T, RemoteError>
where
    T: FromStr<Err = String>,
{
    value.parse().map_err(RemoteError::Mapping)
}

/// Escapes `LIKE` wildcards so user text matches literally.
fn escape_like(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
