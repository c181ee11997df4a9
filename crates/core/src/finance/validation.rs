//! Business rule validation for create and update.

use rust_decimal::Decimal;

use super::error::StoreError;
use super::types::{NewTransaction, TransactionDraft, TransactionPatch};

/// Validates a draft and returns the complete record input.
///
/// # Errors
///
/// Returns `StoreError::Validation` naming the first missing or malformed field.
pub fn validate_draft(draft: &TransactionDraft) -> Result<NewTransaction, StoreError> {
    let description = required_text(draft.description.as_deref(), "description")?;
    let amount = draft
        .amount
        .ok_or_else(|| missing("amount"))
        .and_then(positive_amount)?;
    let transaction_type = draft.transaction_type.ok_or_else(|| missing("type"))?;
    let category = required_text(draft.category.as_deref(), "category")?;
    let status = draft.status.ok_or_else(|| missing("status"))?;
    let transaction_date = draft
        .transaction_date
        .ok_or_else(|| missing("transactionDate"))?;

    Ok(NewTransaction {
        description,
        amount,
        transaction_type,
        category,
        status,
        transaction_date,
        due_date: draft.due_date,
        payment_date: draft.payment_date,
        payment_method: draft.payment_method,
        notes: draft.notes.clone(),
        linked_entity_id: draft.linked_entity_id.clone(),
        linked_entity_type: draft.linked_entity_type,
        receipt_url: draft.receipt_url.clone(),
        related_sale_link: draft.related_sale_link.clone(),
    })
}

/// Validates the supplied fields of a patch.
///
/// # Errors
///
/// Returns `StoreError::Validation` if the patch is empty or a supplied
/// required field is blank or non-positive.
pub fn validate_patch(patch: &TransactionPatch) -> Result<(), StoreError> {
    if patch.is_empty() {
        return Err(StoreError::validation("update contains no fields"));
    }
    if let Some(description) = patch.description.as_deref() {
        required_text(Some(description), "description")?;
    }
    if let Some(category) = patch.category.as_deref() {
        required_text(Some(category), "category")?;
    }
    if let Some(amount) = patch.amount {
        positive_amount(amount)?;
    }
    Ok(())
}

fn required_text(value: Option<&str>, field: &str) -> Result<String, StoreError> {
    match value.map(str::trim) {
        Some(text) if !text.is_empty() => Ok(text.to_string()),
        Some(_) => Err(StoreError::validation(format!("{field} must not be blank"))),
        None => Err(missing(field)),
    }
}

fn positive_amount(amount: Decimal) -> Result<Decimal, StoreError> {
    if amount > Decimal::ZERO {
        Ok(amount)
    } else {
        Err(StoreError::validation("amount must be positive"))
    }
}

fn missing(field: &str) -> StoreError {
    StoreError::validation(format!("{field} is required"))
}
