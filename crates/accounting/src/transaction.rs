use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use mizan_core::{DomainError, DomainResult, Entity, InvoiceId, TransactionId};

/// Direction of a ledger movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Income,
    Expense,
}

/// Settlement status, mirrored from the originating invoice at creation
/// time. Never recomputed later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Paid,
    Partial,
    Unpaid,
}

/// A dated monetary movement in the general ledger.
///
/// Created either by invoice posting (carrying `ref_id` back to the
/// invoice) or manually by a user (no `ref_id`). The back-reference is a
/// non-owning relation used only for lookup, never for cascading deletes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: TransactionId,
    pub date: NaiveDate,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    /// Free text, e.g. "Sales", "Rent".
    pub category: String,
    pub amount: f64,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ref_id: Option<InvoiceId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<PaymentStatus>,
}

impl Transaction {
    /// Manual ledger entry (no invoice back-reference).
    pub fn manual(
        id: TransactionId,
        date: NaiveDate,
        kind: TransactionKind,
        category: impl Into<String>,
        amount: f64,
        description: impl Into<String>,
    ) -> DomainResult<Self> {
        if amount < 0.0 {
            return Err(DomainError::validation(
                "transaction amount cannot be negative",
            ));
        }

        Ok(Self {
            id,
            date,
            kind,
            category: category.into(),
            amount,
            description: description.into(),
            ref_id: None,
            status: None,
        })
    }
}

impl Entity for Transaction {
    type Id = TransactionId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
