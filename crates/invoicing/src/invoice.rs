use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use mizan_accounting::PaymentStatus;
use mizan_core::{ContactId, DomainError, DomainResult, Entity, InvoiceId, ProductId};

/// Invoice kind: sale (owed to us) or purchase (owed by us).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceKind {
    Sale,
    Purchase,
}

impl InvoiceKind {
    /// Prefix used in human-readable invoice numbers.
    pub fn number_prefix(&self) -> &'static str {
        match self {
            InvoiceKind::Sale => "SAL",
            InvoiceKind::Purchase => "PUR",
        }
    }
}

/// How the settled portion of an invoice was paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Cash,
    Transfer,
    Credit,
}

/// One invoice line.
///
/// `name` and `price` are point-in-time snapshots taken when the item was
/// added to the draft; they are deliberately decoupled from later edits to
/// the product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceItem {
    pub product_id: ProductId,
    pub name: String,
    pub quantity: i64,
    pub price: f64,
    pub total: f64,
}

impl InvoiceItem {
    pub fn new(
        product_id: ProductId,
        name: impl Into<String>,
        quantity: i64,
        price: f64,
    ) -> DomainResult<Self> {
        if quantity <= 0 {
            return Err(DomainError::validation(
                "invoice line quantity must be positive",
            ));
        }
        if price < 0.0 {
            return Err(DomainError::validation(
                "invoice line price cannot be negative",
            ));
        }

        Ok(Self {
            product_id,
            name: name.into(),
            quantity,
            price,
            total: quantity as f64 * price,
        })
    }
}

/// A posted invoice. Treated as immutable once created: there is no edit or
/// void operation.
///
/// `contact_name` is a snapshot of the contact's name at posting time and is
/// intentionally not kept in sync with later renames.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    pub id: InvoiceId,
    pub number: String,
    pub date: NaiveDate,
    #[serde(rename = "type")]
    pub kind: InvoiceKind,
    pub contact_id: ContactId,
    pub contact_name: String,
    pub items: Vec<InvoiceItem>,
    pub subtotal: f64,
    pub tax: f64,
    pub discount: f64,
    pub total: f64,
    pub payment_status: PaymentStatus,
    pub payment_method: PaymentMethod,
    pub paid_amount: f64,
}

impl Entity for Invoice {
    type Id = InvoiceId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Format a sequential invoice number: `{SAL|PUR}-{year}-{seq, 4 digits}`.
pub fn format_invoice_number(kind: InvoiceKind, year: i32, seq: usize) -> String {
    format!("{}-{}-{:04}", kind.number_prefix(), year, seq)
}

/// Next free invoice number, starting from `existing_count + 1`.
///
/// The sequence is derived from the in-memory invoice count, which is not
/// safe under concurrent posting; the post-hoc scan over existing numbers
/// bumps past any number already taken. A multi-writer deployment needs a
/// server-assigned counter instead.
pub fn next_invoice_number(kind: InvoiceKind, year: i32, existing: &[Invoice]) -> String {
    let mut seq = existing.len() + 1;
    loop {
        let candidate = format_invoice_number(kind, year, seq);
        if existing.iter().all(|inv| inv.number != candidate) {
            return candidate;
        }
        seq += 1;
    }
}
