//! Dashboard aggregates.

use serde::{Deserialize, Serialize};

use mizan_accounting::{Transaction, TransactionKind};
use mizan_inventory::Product;
use mizan_invoicing::{Invoice, InvoiceKind};

/// Headline figures shown on the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_sales: f64,
    pub total_purchases: f64,
    /// Full ledger sum of expense transactions, including the echoes of
    /// posted purchase invoices, so it matches the ledger view.
    pub total_expenses: f64,
    pub net_profit: f64,
    pub low_stock_count: usize,
}

/// Reduce the full collections into [`DashboardStats`].
///
/// Net profit subtracts purchase-invoice totals once and manual expenses
/// once: expense transactions carrying a `ref_id` are the ledger echoes of
/// purchase invoices already counted in `total_purchases` and are excluded
/// from the profit term.
pub fn dashboard_stats(
    invoices: &[Invoice],
    transactions: &[Transaction],
    products: &[Product],
) -> DashboardStats {
    let total_sales: f64 = invoices
        .iter()
        .filter(|inv| inv.kind == InvoiceKind::Sale)
        .map(|inv| inv.total)
        .sum();
    let total_purchases: f64 = invoices
        .iter()
        .filter(|inv| inv.kind == InvoiceKind::Purchase)
        .map(|inv| inv.total)
        .sum();

    let total_expenses: f64 = transactions
        .iter()
        .filter(|tx| tx.kind == TransactionKind::Expense)
        .map(|tx| tx.amount)
        .sum();
    let manual_expenses: f64 = transactions
        .iter()
        .filter(|tx| tx.kind == TransactionKind::Expense && tx.ref_id.is_none())
        .map(|tx| tx.amount)
        .sum();

    let low_stock_count = products.iter().filter(|p| p.is_low_stock()).count();

    DashboardStats {
        total_sales,
        total_purchases,
        total_expenses,
        net_profit: total_sales - total_purchases - manual_expenses,
        low_stock_count,
    }
}
