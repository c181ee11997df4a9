//! Financial transaction domain types.
//!
//! A transaction is a single income or expense record. The amount is always
//! positive; direction is carried by [`TransactionType`].

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use vitrine_shared::types::TransactionId;

/// Direction of money flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    /// Money coming in.
    Income,
    /// Money going out.
    Expense,
}

/// Settlement status. Only confirmed transactions count towards balances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    /// Settled.
    Confirmed,
    /// Awaiting payment.
    Pending,
    /// Canceled, ignored by every total.
    Canceled,
}

/// How a transaction was paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PaymentMethod {
    /// Cash.
    Cash,
    /// Credit card.
    Credit,
    /// Debit card.
    Debit,
    /// Instant payment (PIX).
    Pix,
    /// Bank slip (boleto).
    BankSlip,
    /// Bank transfer.
    Transfer,
}

/// Kind of entity a transaction originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkedEntityType {
    /// A sale.
    Sale,
    /// A purchase.
    Purchase,
}

macro_rules! wire_enum {
    ($name:ident { $($variant:ident => $wire:literal),+ $(,)? }) => {
        impl $name {
            /// Wire value used in storage and on the command line.
            #[must_use]
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $wire,)+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($wire => Ok(Self::$variant),)+
                    _ => Err(format!(concat!("Unknown ", stringify!($name), ": {}"), s)),
                }
            }
        }
    };
}

wire_enum!(TransactionType { Income => "income", Expense => "expense" });
wire_enum!(TransactionStatus {
    Confirmed => "confirmed",
    Pending => "pending",
    Canceled => "canceled",
});
wire_enum!(PaymentMethod {
    Cash => "cash",
    Credit => "credit",
    Debit => "debit",
    Pix => "pix",
    BankSlip => "bankSlip",
    Transfer => "transfer",
});
wire_enum!(LinkedEntityType { Sale => "sale", Purchase => "purchase" });

/// A persisted financial transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// Unique identifier, never reassigned.
    pub id: TransactionId,
    /// Human readable description.
    pub description: String,
    /// Positive amount.
    pub amount: Decimal,
    /// Income or expense.
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    /// Free-form category label.
    pub category: String,
    /// Settlement status.
    pub status: TransactionStatus,
    /// Business calendar date of the transaction.
    pub transaction_date: NaiveDate,
    /// Due date, mostly for pending expenses.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    /// Date the payment was settled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_date: Option<NaiveDate>,
    /// Payment method.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<PaymentMethod>,
    /// Free text notes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Id of the originating sale or purchase.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linked_entity_id: Option<String>,
    /// Kind of the originating entity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linked_entity_type: Option<LinkedEntityType>,
    /// Link to a receipt document.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receipt_url: Option<String>,
    /// Link to the related sale page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_sale_link: Option<String>,
}

impl Transaction {
    /// Amount signed by direction (income positive, expense negative).
    #[must_use]
    pub fn signed_amount(&self) -> Decimal {
        match self.transaction_type {
            TransactionType::Income => self.amount,
            TransactionType::Expense => -self.amount,
        }
    }

    /// Returns true if the transaction counts towards the balance.
    #[must_use]
    pub fn is_confirmed(&self) -> bool {
        self.status == TransactionStatus::Confirmed
    }

    /// Applies the supplied fields of a patch in place. The id never changes.
    pub fn apply(&mut self, patch: &TransactionPatch) {
        if let Some(description) = &patch.description {
            self.description.clone_from(description);
        }
        if let Some(amount) = patch.amount {
            self.amount = amount;
        }
        if let Some(transaction_type) = patch.transaction_type {
            self.transaction_type = transaction_type;
        }
        if let Some(category) = &patch.category {
            self.category.clone_from(category);
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(date) = patch.transaction_date {
            self.transaction_date = date;
        }
        if let Some(due_date) = patch.due_date {
            self.due_date = due_date;
        }
        if let Some(payment_date) = patch.payment_date {
            self.payment_date = payment_date;
        }
        if let Some(payment_method) = patch.payment_method {
            self.payment_method = payment_method;
        }
        if let Some(notes) = &patch.notes {
            self.notes.clone_from(notes);
        }
        if let Some(linked_entity_id) = &patch.linked_entity_id {
            self.linked_entity_id.clone_from(linked_entity_id);
        }
        if let Some(linked_entity_type) = patch.linked_entity_type {
            self.linked_entity_type = linked_entity_type;
        }
        if let Some(receipt_url) = &patch.receipt_url {
            self.receipt_url.clone_from(receipt_url);
        }
        if let Some(related_sale_link) = &patch.related_sale_link {
            self.related_sale_link.clone_from(related_sale_link);
        }
    }
}

/// Input for creating a transaction, as submitted by a form.
///
/// Required fields are optional here so that a missing value surfaces as a
/// validation error instead of a deserialization failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionDraft {
    /// Description.
    pub description: Option<String>,
    /// Positive amount.
    pub amount: Option<Decimal>,
    /// Income or expense.
    #[serde(rename = "type")]
    pub transaction_type: Option<TransactionType>,
    /// Category label.
    pub category: Option<String>,
    /// Initial status.
    pub status: Option<TransactionStatus>,
    /// Business calendar date.
    pub transaction_date: Option<NaiveDate>,
    /// Due date.
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    /// Payment date.
    #[serde(default)]
    pub payment_date: Option<NaiveDate>,
    /// Payment method.
    #[serde(default)]
    pub payment_method: Option<PaymentMethod>,
    /// Notes.
    #[serde(default)]
    pub notes: Option<String>,
    /// Originating entity id.
    #[serde(default)]
    pub linked_entity_id: Option<String>,
    /// Originating entity kind.
    #[serde(default)]
    pub linked_entity_type: Option<LinkedEntityType>,
    /// Receipt link.
    #[serde(default)]
    pub receipt_url: Option<String>,
    /// Related sale link.
    #[serde(default)]
    pub related_sale_link: Option<String>,
}

/// A validated draft: every required field is present and well formed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTransaction {
    /// Description (non-empty).
    pub description: String,
    /// Amount (positive).
    pub amount: Decimal,
    /// Income or expense.
    pub transaction_type: TransactionType,
    /// Category (non-empty).
    pub category: String,
    /// Initial status.
    pub status: TransactionStatus,
    /// Business calendar date.
    pub transaction_date: NaiveDate,
    /// Due date.
    pub due_date: Option<NaiveDate>,
    /// Payment date.
    pub payment_date: Option<NaiveDate>,
    /// Payment method.
    pub payment_method: Option<PaymentMethod>,
    /// Notes.
    pub notes: Option<String>,
    /// Originating entity id.
    pub linked_entity_id: Option<String>,
    /// Originating entity kind.
    pub linked_entity_type: Option<LinkedEntityType>,
    /// Receipt link.
    pub receipt_url: Option<String>,
    /// Related sale link.
    pub related_sale_link: Option<String>,
}

impl NewTransaction {
    /// Materializes the record under the given id.
    #[must_use]
    pub fn into_transaction(self, id: TransactionId) -> Transaction {
        Transaction {
            id,
            description: self.description,
            amount: self.amount,
            transaction_type: self.transaction_type,
            category: self.category,
            status: self.status,
            transaction_date: self.transaction_date,
            due_date: self.due_date,
            payment_date: self.payment_date,
            payment_method: self.payment_method,
            notes: self.notes,
            linked_entity_id: self.linked_entity_id,
            linked_entity_type: self.linked_entity_type,
            receipt_url: self.receipt_url,
            related_sale_link: self.related_sale_link,
        }
    }
}

/// Partial update. `None` leaves a field untouched; for nullable fields
/// `Some(None)` clears it.
#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionPatch {
    /// New description.
    pub description: Option<String>,
    /// New amount.
    pub amount: Option<Decimal>,
    /// New direction.
    #[serde(rename = "type")]
    pub transaction_type: Option<TransactionType>,
    /// New category.
    pub category: Option<String>,
    /// New status.
    pub status: Option<TransactionStatus>,
    /// New business date.
    pub transaction_date: Option<NaiveDate>,
    /// New or cleared due date.
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub due_date: Option<Option<NaiveDate>>,
    /// New or cleared payment date.
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub payment_date: Option<Option<NaiveDate>>,
    /// New or cleared payment method.
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub payment_method: Option<Option<PaymentMethod>>,
    /// New or cleared notes.
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub notes: Option<Option<String>>,
    /// New or cleared linked entity id.
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub linked_entity_id: Option<Option<String>>,
    /// New or cleared linked entity kind.
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub linked_entity_type: Option<Option<LinkedEntityType>>,
    /// New or cleared receipt link.
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub receipt_url: Option<Option<String>>,
    /// New or cleared related sale link.
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub related_sale_link: Option<Option<String>>,
}

impl TransactionPatch {
    /// Returns true if the patch changes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Patch marking a transaction as paid on `payment_date`.
    #[must_use]
    pub fn confirm_payment(payment_date: NaiveDate) -> Self {
        Self {
            status: Some(TransactionStatus::Confirmed),
            payment_date: Some(Some(payment_date)),
            ..Self::default()
        }
    }

    /// Patch canceling a transaction.
    #[must_use]
    pub fn cancel() -> Self {
        Self {
            status: Some(TransactionStatus::Canceled),
            ..Self::default()
        }
    }
}

/// Patch overwriting every field with the values of `tx`.
impl From<&Transaction> for TransactionPatch {
    fn from(tx: &Transaction) -> Self {
        Self {
            description: Some(tx.description.clone()),
            amount: Some(tx.amount),
            transaction_type: Some(tx.transaction_type),
            category: Some(tx.category.clone()),
            status: Some(tx.status),
            transaction_date: Some(tx.transaction_date),
            due_date: Some(tx.due_date),
            payment_date: Some(tx.payment_date),
            payment_method: Some(tx.payment_method),
            notes: Some(tx.notes.clone()),
            linked_entity_id: Some(tx.linked_entity_id.clone()),
            linked_entity_type: Some(tx.linked_entity_type),
            receipt_url: Some(tx.receipt_url.clone()),
            related_sale_link: Some(tx.related_sale_link.clone()),
        }
    }
}
