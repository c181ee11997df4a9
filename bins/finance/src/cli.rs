//! Command line definition and request building.

use anyhow::{Context, bail};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use rust_decimal::Decimal;
use vitrine_core::finance::{
    DateNormalizer, DateRange, LinkFilter, LinkedEntityType, PaymentMethod, TransactionDraft,
    TransactionFilter, TransactionPatch, TransactionStatus, TransactionType,
};
use vitrine_shared::types::{PageRequest, TransactionId};

#[derive(Debug, Parser)]
#[command(name = "finance")]
#[command(about = "Financial transactions with a PostgreSQL store and a local fallback cache", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List transactions, newest first
    List(ListArgs),

    /// Show one transaction
    Show {
        #[arg(value_name = "ID")]
        id: String,
    },

    /// Record a new transaction
    Create(CreateArgs),

    /// Change fields of a transaction
    Update {
        #[arg(value_name = "ID")]
        id: String,
        #[command(flatten)]
        fields: UpdateArgs,
    },

    /// Mark a transaction as paid
    Confirm {
        #[arg(value_name = "ID")]
        id: String,
        /// Payment date, defaults to today
        #[arg(long)]
        date: Option<String>,
    },

    /// Cancel a transaction
    Cancel {
        #[arg(value_name = "ID")]
        id: String,
    },

    /// Delete a transaction
    Delete {
        #[arg(value_name = "ID")]
        id: String,
    },

    /// Totals, balance and per-category breakdown
    Summary(RangeArgs),

    /// Replace the local cache with the remote collection
    Refresh,
}

#[derive(Debug, Args)]
pub struct RangeArgs {
    /// First business date, inclusive (YYYY-MM-DD or RFC 3339)
    #[arg(long)]
    pub from: Option<String>,
    /// Last business date, inclusive
    #[arg(long)]
    pub to: Option<String>,
}

#[derive(Debug, Args)]
pub struct ListArgs {
    #[arg(long = "type")]
    pub transaction_type: Option<TransactionType>,
    #[arg(long)]
    pub status: Option<TransactionStatus>,
    #[command(flatten)]
    pub range: RangeArgs,
    #[arg(long)]
    pub category: Option<String>,
    /// Text searched in description, id and notes
    #[arg(long)]
    pub search: Option<String>,
    /// Id of the originating sale or purchase
    #[arg(long)]
    pub link_id: Option<String>,
    #[arg(long, requires = "link_id")]
    pub link_type: Option<LinkedEntityType>,
    #[arg(long, default_value_t = 1)]
    pub page: u32,
    #[arg(long, default_value_t = 20)]
    pub per_page: u32,
}

#[derive(Debug, Args)]
pub struct CreateArgs {
    #[arg(long)]
    pub description: String,
    #[arg(long)]
    pub amount: Decimal,
    #[arg(long = "type")]
    pub transaction_type: TransactionType,
    #[arg(long)]
    pub category: String,
    #[arg(long, default_value = "confirmed")]
    pub status: TransactionStatus,
    /// Business date, defaults to today
    #[arg(long)]
    pub date: Option<String>,
    #[arg(long)]
    pub due_date: Option<String>,
    #[arg(long)]
    pub payment_date: Option<String>,
    #[arg(long)]
    pub payment_method: Option<PaymentMethod>,
    #[arg(long)]
    pub notes: Option<String>,
    #[arg(long)]
    pub link_id: Option<String>,
    #[arg(long, requires = "link_id")]
    pub link_type: Option<LinkedEntityType>,
    #[arg(long)]
    pub receipt_url: Option<String>,
    #[arg(long)]
    pub sale_link: Option<String>,
}

#[derive(Debug, Args)]
pub struct UpdateArgs {
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long)]
    pub amount: Option<Decimal>,
    #[arg(long = "type")]
    pub transaction_type: Option<TransactionType>,
    #[arg(long)]
    pub category: Option<String>,
    #[arg(long)]
    pub status: Option<TransactionStatus>,
    #[arg(long)]
    pub date: Option<String>,
    #[arg(long)]
    pub due_date: Option<String>,
    #[arg(long, conflicts_with = "due_date")]
    pub clear_due_date: bool,
    #[arg(long)]
    pub payment_date: Option<String>,
    #[arg(long, conflicts_with = "payment_date")]
    pub clear_payment_date: bool,
    #[arg(long)]
    pub payment_method: Option<PaymentMethod>,
    #[arg(long, conflicts_with = "payment_method")]
    pub clear_payment_method: bool,
    #[arg(long)]
    pub notes: Option<String>,
    /// Remove the notes
    #[arg(long, conflicts_with = "notes")]
    pub clear_notes: bool,
    #[arg(long)]
    pub link_id: Option<String>,
    #[arg(long)]
    pub link_type: Option<LinkedEntityType>,
    /// Remove the link id and kind
    #[arg(long, conflicts_with_all = ["link_id", "link_type"])]
    pub clear_link: bool,
    #[arg(long)]
    pub receipt_url: Option<String>,
    #[arg(long, conflicts_with = "receipt_url")]
    pub clear_receipt_url: bool,
    #[arg(long)]
    pub sale_link: Option<String>,
    #[arg(long, conflicts_with = "sale_link")]
    pub clear_sale_link: bool,
}

/// Parses a user supplied date in the business timezone.
pub fn parse_date(normalizer: &DateNormalizer, text: &str) -> anyhow::Result<NaiveDate> {
    normalizer
        .parse_calendar_date(text)
        .with_context(|| format!("invalid date: {text}"))
}

fn parse_opt(normalizer: &DateNormalizer, text: Option<&str>) -> anyhow::Result<Option<NaiveDate>> {
    text.map(|t| parse_date(normalizer, t)).transpose()
}

impl RangeArgs {
    pub fn to_range(&self, normalizer: &DateNormalizer) -> anyhow::Result<DateRange> {
        let from = parse_opt(normalizer, self.from.as_deref())?;
        let to = parse_opt(normalizer, self.to.as_deref())?;
        if let (Some(from), Some(to)) = (from, to)
            && from > to
        {
            bail!("--from {from} is after --to {to}");
        }
        Ok(DateRange::new(from, to))
    }
}

impl ListArgs {
    pub fn to_query(
        &self,
        normalizer: &DateNormalizer,
    ) -> anyhow::Result<(TransactionFilter, PageRequest)> {
        let filter = TransactionFilter {
            transaction_type: self.transaction_type,
            status: self.status,
            date_range: self.range.to_range(normalizer)?,
            category: self.category.clone(),
            search: self.search.clone(),
            link: self.link_id.clone().map(|entity_id| LinkFilter {
                entity_id,
                entity_type: self.link_type,
            }),
        };
        Ok((filter, PageRequest::new(self.page, self.per_page)))
    }
}

impl CreateArgs {
    pub fn to_draft(&self, normalizer: &DateNormalizer) -> anyhow::Result<TransactionDraft> {
        let date = match &self.date {
            Some(text) => parse_date(normalizer, text)?,
            None => normalizer.today(),
        };
        Ok(TransactionDraft {
            description: Some(self.description.clone()),
            amount: Some(self.amount),
            transaction_type: Some(self.transaction_type),
            category: Some(self.category.clone()),
            status: Some(self.status),
            transaction_date: Some(date),
            due_date: parse_opt(normalizer, self.due_date.as_deref())?,
            payment_date: parse_opt(normalizer, self.payment_date.as_deref())?,
            payment_method: self.payment_method,
            notes: self.notes.clone(),
            linked_entity_id: self.link_id.clone(),
            linked_entity_type: self.link_type,
            receipt_url: self.receipt_url.clone(),
            related_sale_link: self.sale_link.clone(),
        })
    }
}

/// `Some(None)` clears the field, `Some(Some(v))` sets it, `None` keeps it.
fn clearable<T>(value: Option<T>, clear: bool) -> Option<Option<T>> {
    if clear { Some(None) } else { value.map(Some) }
}

impl UpdateArgs {
    pub fn to_patch(&self, normalizer: &DateNormalizer) -> anyhow::Result<TransactionPatch> {
        Ok(TransactionPatch {
            description: self.description.clone(),
            amount: self.amount,
            transaction_type: self.transaction_type,
            category: self.category.clone(),
            status: self.status,
            transaction_date: parse_opt(normalizer, self.date.as_deref())?,
            due_date: clearable(parse_opt(normalizer, self.due_date.as_deref())?, self.clear_due_date),
            payment_date: clearable(
                parse_opt(normalizer, self.payment_date.as_deref())?,
                self.clear_payment_date,
            ),
            payment_method: clearable(self.payment_method, self.clear_payment_method),
            notes: clearable(self.notes.clone(), self.clear_notes),
            linked_entity_id: clearable(self.link_id.clone(), self.clear_link),
            linked_entity_type: clearable(self.link_type, self.clear_link),
            receipt_url: clearable(self.receipt_url.clone(), self.clear_receipt_url),
            related_sale_link: clearable(self.sale_link.clone(), self.clear_sale_link),
        })
    }
}

pub fn transaction_id(text: &str) -> TransactionId {
    TransactionId::new(text.trim())
}
