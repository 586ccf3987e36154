//! Read-only reporting views.
//!
//! Everything here is a pure function of its inputs: contact statements,
//! dashboard aggregates, and ledger filters. No module in this crate holds
//! state or mutates its arguments, so the views are safe to recompute on
//! every render from any number of concurrent readers.

pub mod filter;
pub mod statement;
pub mod stats;

pub use filter::LedgerFilter;
pub use statement::{build_statement, StatementRow, StatementRowKind};
pub use stats::{dashboard_stats, DashboardStats};
