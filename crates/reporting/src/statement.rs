//! Contact statement: chronological debit/credit rows with a running
//! balance.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use mizan_accounting::Transaction;
use mizan_invoicing::{Invoice, InvoiceKind};
use mizan_parties::{Contact, ContactKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatementRowKind {
    Invoice,
    Payment,
}

/// One line of a contact statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatementRow {
    pub kind: StatementRowKind,
    pub date: NaiveDate,
    /// Invoice number for invoice rows, transaction description for
    /// payment rows.
    pub reference: String,
    pub debit: f64,
    pub credit: f64,
    /// Running balance after this row.
    pub balance: f64,
}

/// Build the statement for one contact.
///
/// Invoice rows book the full invoice value: debit for sales, credit for
/// purchases, regardless of contact kind (in practice the contact kind
/// already constrains which invoice kinds it sees). Payment rows are the
/// ledger transactions referencing those invoices, booked on the opposite
/// side: a client payment is a credit, a supplier payment is a debit.
///
/// Rows sort by date ascending; same-day rows keep their emission order
/// (invoices in input order, then payments in input order), which makes the
/// output deterministic for identical inputs.
///
/// The final balance may differ from the contact's stored `balance`:
/// opening balances and manual edits have no rows here. That gap is
/// reported, not papered over.
pub fn build_statement(
    contact: &Contact,
    invoices: &[Invoice],
    transactions: &[Transaction],
) -> Vec<StatementRow> {
    let own_invoices: Vec<&Invoice> = invoices
        .iter()
        .filter(|inv| inv.contact_id == contact.id)
        .collect();

    let mut rows: Vec<StatementRow> = Vec::new();

    for inv in &own_invoices {
        let (debit, credit) = match inv.kind {
            InvoiceKind::Sale => (inv.total, 0.0),
            InvoiceKind::Purchase => (0.0, inv.total),
        };
        rows.push(StatementRow {
            kind: StatementRowKind::Invoice,
            date: inv.date,
            reference: inv.number.clone(),
            debit,
            credit,
            balance: 0.0,
        });
    }

    for tx in transactions {
        let Some(ref_id) = tx.ref_id else { continue };
        if !own_invoices.iter().any(|inv| inv.id == ref_id) {
            continue;
        }
        let (debit, credit) = match contact.kind {
            ContactKind::Client => (0.0, tx.amount),
            ContactKind::Supplier => (tx.amount, 0.0),
        };
        rows.push(StatementRow {
            kind: StatementRowKind::Payment,
            date: tx.date,
            reference: tx.description.clone(),
            debit,
            credit,
            balance: 0.0,
        });
    }

    // Stable sort keeps emission order as the tiebreak for same-day rows.
    rows.sort_by_key(|row| row.date);

    let mut balance = 0.0;
    for row in &mut rows {
        balance += match contact.kind {
            ContactKind::Client => row.debit - row.credit,
            ContactKind::Supplier => row.credit - row.debit,
        };
        row.balance = balance;
    }

    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use mizan_accounting::{PaymentStatus, TransactionKind};
    use mizan_core::{ContactId, InvoiceId, TransactionId};
    use mizan_invoicing::PaymentMethod;

    fn day(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn client() -> Contact {
        Contact::new(ContactId::new(), ContactKind::Client, "Delta Traders", "", "", 0.0).unwrap()
    }

    fn supplier() -> Contact {
        Contact::new(ContactId::new(), ContactKind::Supplier, "Tech Import", "", "", 0.0).unwrap()
    }

    fn invoice(contact: &Contact, kind: InvoiceKind, date: &str, total: f64) -> Invoice {
        Invoice {
            id: InvoiceId::new(),
            number: "SAL-2024-0001".to_string(),
            date: day(date),
            kind,
            contact_id: contact.id,
            contact_name: contact.name.clone(),
            items: vec![],
            subtotal: total,
            tax: 0.0,
            discount: 0.0,
            total,
            payment_status: PaymentStatus::Unpaid,
            payment_method: PaymentMethod::Credit,
            paid_amount: 0.0,
        }
    }

    fn payment(inv: &Invoice, date: &str, amount: f64) -> Transaction {
        Transaction {
            id: TransactionId::new(),
            date: day(date),
            kind: TransactionKind::Income,
            category: "Sales".to_string(),
            amount,
            description: format!("Payment for {}", inv.number),
            ref_id: Some(inv.id),
            status: Some(PaymentStatus::Partial),
        }
    }

    #[test]
    fn client_running_balance_decreases_with_payments() {
        let contact = client();
        let inv = invoice(&contact, InvoiceKind::Sale, "2024-01-01", 500.0);
        let pay = payment(&inv, "2024-01-05", 200.0);

        let rows = build_statement(&contact, &[inv], &[pay]);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].kind, StatementRowKind::Invoice);
        assert_eq!(rows[0].balance, 500.0);
        assert_eq!(rows[1].kind, StatementRowKind::Payment);
        assert_eq!(rows[1].balance, 300.0);
    }

    #[test]
    fn supplier_balance_runs_on_the_credit_side() {
        let contact = supplier();
        let inv = invoice(&contact, InvoiceKind::Purchase, "2024-02-01", 800.0);
        let pay = payment(&inv, "2024-02-10", 300.0);

        let rows = build_statement(&contact, &[inv], &[pay]);
        assert_eq!(rows[0].credit, 800.0);
        assert_eq!(rows[0].balance, 800.0);
        assert_eq!(rows[1].debit, 300.0);
        assert_eq!(rows[1].balance, 500.0);
    }

    #[test]
    fn other_contacts_invoices_and_unlinked_transactions_are_excluded() {
        let contact = client();
        let other = client();
        let own = invoice(&contact, InvoiceKind::Sale, "2024-01-01", 100.0);
        let foreign = invoice(&other, InvoiceKind::Sale, "2024-01-02", 999.0);
        let manual = Transaction::manual(
            TransactionId::new(),
            day("2024-01-03"),
            TransactionKind::Expense,
            "Rent",
            50.0,
            "Office rent",
        )
        .unwrap();

        let rows = build_statement(&contact, &[own, foreign], &[manual]);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].debit, 100.0);
    }

    #[test]
    fn same_day_rows_keep_emission_order() {
        let contact = client();
        let inv = invoice(&contact, InvoiceKind::Sale, "2024-03-01", 400.0);
        let pay = payment(&inv, "2024-03-01", 400.0);

        let rows = build_statement(&contact, &[inv], &[pay]);
        // Invoice rows are emitted before payment rows; the stable sort
        // preserves that on a date tie.
        assert_eq!(rows[0].kind, StatementRowKind::Invoice);
        assert_eq!(rows[1].kind, StatementRowKind::Payment);
        assert_eq!(rows[1].balance, 0.0);
    }

    proptest::proptest! {
        /// Property: each row's balance is the signed prefix sum of the
        /// debit/credit columns up to that row.
        #[test]
        fn running_balance_is_a_prefix_sum(
            totals in proptest::collection::vec(1.0f64..10_000.0, 1..8),
            payment_ratio in 0.0f64..1.0,
        ) {
            let contact = client();
            let invoices: Vec<Invoice> = totals
                .iter()
                .enumerate()
                .map(|(i, total)| {
                    let mut inv =
                        invoice(&contact, InvoiceKind::Sale, "2024-01-01", *total);
                    inv.number = format!("SAL-2024-{:04}", i + 1);
                    inv
                })
                .collect();
            let payments: Vec<Transaction> = invoices
                .iter()
                .map(|inv| payment(inv, "2024-02-01", inv.total * payment_ratio))
                .collect();

            let rows = build_statement(&contact, &invoices, &payments);
            let mut expected = 0.0;
            for row in &rows {
                expected += row.debit - row.credit;
                proptest::prop_assert!((row.balance - expected).abs() < 1e-6);
            }
        }
    }

    #[test]
    fn builder_is_pure_and_repeatable() {
        let contact = client();
        let inv = invoice(&contact, InvoiceKind::Sale, "2024-01-01", 500.0);
        let pay = payment(&inv, "2024-01-05", 200.0);
        let invoices = vec![inv];
        let transactions = vec![pay];

        let first = build_statement(&contact, &invoices, &transactions);
        let second = build_statement(&contact, &invoices, &transactions);
        assert_eq!(first, second);
    }
}
