//! Accounting module: the general transaction ledger.
//!
//! Pure domain logic only: no IO, no HTTP, no persistence concerns.

pub mod transaction;

pub use transaction::{PaymentStatus, Transaction, TransactionKind};
