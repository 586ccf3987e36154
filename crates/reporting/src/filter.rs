//! Ledger view filters.

use chrono::NaiveDate;

use mizan_accounting::{PaymentStatus, Transaction, TransactionKind};

/// Criteria for narrowing the ledger view. Unset fields match everything.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LedgerFilter {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub kind: Option<TransactionKind>,
    pub status: Option<PaymentStatus>,
}

impl LedgerFilter {
    pub fn matches(&self, tx: &Transaction) -> bool {
        if self.from.is_some_and(|from| tx.date < from) {
            return false;
        }
        if self.to.is_some_and(|to| tx.date > to) {
            return false;
        }
        if self.kind.is_some_and(|kind| tx.kind != kind) {
            return false;
        }
        if let Some(status) = self.status {
            if tx.status != Some(status) {
                return false;
            }
        }
        true
    }

    /// Matching transactions in input order.
    pub fn apply<'a>(&self, transactions: &'a [Transaction]) -> Vec<&'a Transaction> {
        transactions.iter().filter(|tx| self.matches(tx)).collect()
    }
}
