//! Invoice posting engine.
//!
//! `post_invoice` turns a draft into an [`EffectBatch`]: the new invoice
//! record plus the inventory, contact-balance, and ledger side effects
//! derived from the same computed totals. The caller applies the batch as
//! one atomic unit (see `mizan-store`); the engine itself mutates nothing.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use mizan_accounting::{PaymentStatus, Transaction, TransactionKind};
use mizan_core::{ContactId, DomainError, DomainResult, InvoiceId, ProductId, TransactionId};
use mizan_parties::Contact;

use crate::invoice::{next_invoice_number, Invoice, InvoiceItem, InvoiceKind, PaymentMethod};

/// Fixed tax rate applied to every invoice subtotal.
pub const TAX_RATE: f64 = 0.14;

/// Draft invoice gathered by the UI.
///
/// Line items carry prices snapshotted when they were added to the draft;
/// they are not re-read from the product at posting time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostInvoice {
    pub kind: InvoiceKind,
    pub contact_id: ContactId,
    pub items: Vec<InvoiceItem>,
    pub discount: f64,
    /// Payment status as requested by the user. The persisted status is
    /// recomputed from the clamped paid amount and may disagree.
    pub requested_status: PaymentStatus,
    /// Only meaningful when `requested_status` is `Partial`.
    pub paid_amount_input: f64,
    pub payment_method: PaymentMethod,
}

/// Signed stock adjustment for one product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockDelta {
    pub product_id: ProductId,
    pub delta: i64,
}

/// Signed balance adjustment for the invoice's contact.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BalanceDelta {
    pub contact_id: ContactId,
    pub delta: f64,
}

/// Everything a posted invoice changes, emitted as one unit.
///
/// All members are derived deterministically from the same computed totals
/// and must be applied together or not at all.
#[derive(Debug, Clone, PartialEq)]
pub struct EffectBatch {
    pub invoice: Invoice,
    pub stock_deltas: Vec<StockDelta>,
    pub balance_delta: Option<BalanceDelta>,
    pub transaction: Option<Transaction>,
}

/// Post a draft invoice.
///
/// Validation failures (no items, mismatched contact) abort before any
/// effect is computed. `existing` is the full invoice collection; it drives
/// the sequential number and the duplicate-number scan.
pub fn post_invoice(
    cmd: &PostInvoice,
    contact: &Contact,
    existing: &[Invoice],
    date: NaiveDate,
) -> DomainResult<EffectBatch> {
    if cmd.contact_id != contact.id {
        return Err(DomainError::validation("selected contact does not match"));
    }
    if cmd.items.is_empty() {
        return Err(DomainError::validation(
            "cannot post an invoice without line items",
        ));
    }
    for item in &cmd.items {
        if item.quantity <= 0 {
            return Err(DomainError::validation(
                "invoice line quantity must be positive",
            ));
        }
        if item.price < 0.0 {
            return Err(DomainError::validation(
                "invoice line price cannot be negative",
            ));
        }
    }
    if cmd.discount < 0.0 {
        return Err(DomainError::validation("discount cannot be negative"));
    }

    let subtotal: f64 = cmd
        .items
        .iter()
        .map(|item| item.quantity as f64 * item.price)
        .sum();
    let tax = subtotal * TAX_RATE;
    let total = (subtotal + tax - cmd.discount).max(0.0);

    let final_paid = match cmd.requested_status {
        PaymentStatus::Paid => total,
        PaymentStatus::Unpaid => 0.0,
        PaymentStatus::Partial => cmd.paid_amount_input.clamp(0.0, total),
    };
    let remaining = (total - final_paid).max(0.0);

    // Authoritative status: the clamped paid amount wins over the
    // requested status.
    let status = if remaining == 0.0 {
        PaymentStatus::Paid
    } else if final_paid == 0.0 {
        PaymentStatus::Unpaid
    } else {
        PaymentStatus::Partial
    };

    let number = next_invoice_number(cmd.kind, date.year(), existing);
    let invoice_id = InvoiceId::new();

    let invoice = Invoice {
        id: invoice_id,
        number: number.clone(),
        date,
        kind: cmd.kind,
        contact_id: contact.id,
        contact_name: contact.name.clone(),
        items: cmd.items.clone(),
        subtotal,
        tax,
        discount: cmd.discount,
        total,
        payment_status: status,
        payment_method: cmd.payment_method,
        paid_amount: final_paid,
    };

    // Sales consume stock, purchases replenish it. No floor at zero: an
    // oversold product goes negative.
    let stock_deltas = cmd
        .items
        .iter()
        .map(|item| StockDelta {
            product_id: item.product_id,
            delta: match cmd.kind {
                InvoiceKind::Sale => -item.quantity,
                InvoiceKind::Purchase => item.quantity,
            },
        })
        .collect();

    // Only the unsettled remainder moves the contact balance; the paid
    // portion never does.
    let balance_delta = (remaining != 0.0).then(|| BalanceDelta {
        contact_id: contact.id,
        delta: match cmd.kind {
            InvoiceKind::Sale => -remaining,
            InvoiceKind::Purchase => remaining,
        },
    });

    // The ledger records the collected amount, or the full invoice value
    // tagged `unpaid` when nothing was collected.
    let transaction = (final_paid > 0.0 || status == PaymentStatus::Unpaid).then(|| {
        let (kind, category, label) = match cmd.kind {
            InvoiceKind::Sale => (TransactionKind::Income, "Sales", "Sales"),
            InvoiceKind::Purchase => (TransactionKind::Expense, "Purchases", "Purchase"),
        };
        Transaction {
            id: TransactionId::new(),
            date,
            kind,
            category: category.to_string(),
            amount: if final_paid > 0.0 { final_paid } else { total },
            description: format!("{label} invoice {number}"),
            ref_id: Some(invoice_id),
            status: Some(status),
        }
    });

    Ok(EffectBatch {
        invoice,
        stock_deltas,
        balance_delta,
        transaction,
    })
}
