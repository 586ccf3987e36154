//! Invoicing domain module.
//!
//! Contains the invoice entity and the posting engine: the one place that
//! keeps inventory quantities, contact balances, payment status, and the
//! transaction ledger mutually consistent. Pure domain logic; the emitted
//! [`posting::EffectBatch`] is applied atomically by the store.

pub mod invoice;
pub mod posting;

pub use invoice::{
    format_invoice_number, next_invoice_number, Invoice, InvoiceItem, InvoiceKind, PaymentMethod,
};
pub use posting::{post_invoice, BalanceDelta, EffectBatch, PostInvoice, StockDelta, TAX_RATE};
