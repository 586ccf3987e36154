//! Built-in dataset used when the local store is empty.

use chrono::NaiveDate;

use mizan_accounting::{PaymentStatus, Transaction, TransactionKind};
use mizan_auth::{Role, User};
use mizan_core::{ContactId, InvoiceId, ProductId, TransactionId, UserId};
use mizan_inventory::Product;
use mizan_invoicing::{format_invoice_number, Invoice, InvoiceItem, InvoiceKind, PaymentMethod};
use mizan_parties::{Contact, ContactKind};
use mizan_store::AppState;

use crate::settings::CompanyInfo;

fn day(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default()
}

/// Entity collections for a fresh installation: a small catalog, three
/// contacts, one settled sale invoice with its ledger echo, and one manual
/// expense.
pub fn state() -> AppState {
    let laptop_id = ProductId::new();
    let products = vec![
        Product {
            id: laptop_id,
            code: "P001".to_string(),
            barcode: "123456".to_string(),
            name: "Dell XPS laptop".to_string(),
            category: "Electronics".to_string(),
            warehouse: "Main warehouse".to_string(),
            purchase_price: 45_000.0,
            sale_price: 55_000.0,
            quantity: 15,
            min_quantity: 5,
        },
        Product {
            id: ProductId::new(),
            code: "P002".to_string(),
            barcode: "234567".to_string(),
            name: "Samsung 27\" monitor".to_string(),
            category: "Electronics".to_string(),
            warehouse: "Main warehouse".to_string(),
            purchase_price: 8_000.0,
            sale_price: 12_000.0,
            quantity: 2,
            min_quantity: 10,
        },
        Product {
            id: ProductId::new(),
            code: "P003".to_string(),
            barcode: "345678".to_string(),
            name: "Wireless mouse".to_string(),
            category: "Accessories".to_string(),
            warehouse: "Annex warehouse".to_string(),
            purchase_price: 500.0,
            sale_price: 900.0,
            quantity: 50,
            min_quantity: 20,
        },
    ];

    let nile_id = ContactId::new();
    let contacts = vec![
        Contact {
            id: nile_id,
            kind: ContactKind::Client,
            name: "Nile Supplies Co".to_string(),
            phone: "01012345678".to_string(),
            email: "info@nile.example".to_string(),
            balance: -15_000.0,
        },
        Contact {
            id: ContactId::new(),
            kind: ContactKind::Client,
            name: "Mohamed Ali".to_string(),
            phone: "01298765432".to_string(),
            email: "m.ali@example.com".to_string(),
            balance: 0.0,
        },
        Contact {
            id: ContactId::new(),
            kind: ContactKind::Supplier,
            name: "Modern Tech Imports".to_string(),
            phone: "0223456789".to_string(),
            email: "sales@moderntech.example".to_string(),
            balance: 50_000.0,
        },
    ];

    let invoice_id = InvoiceId::new();
    let number = format_invoice_number(InvoiceKind::Sale, 2024, 1);
    let invoices = vec![Invoice {
        id: invoice_id,
        number: number.clone(),
        date: day(2024, 5, 1),
        kind: InvoiceKind::Sale,
        contact_id: nile_id,
        contact_name: "Nile Supplies Co".to_string(),
        items: vec![InvoiceItem {
            product_id: laptop_id,
            name: "Dell XPS laptop".to_string(),
            quantity: 1,
            price: 55_000.0,
            total: 55_000.0,
        }],
        subtotal: 55_000.0,
        tax: 7_700.0,
        discount: 0.0,
        total: 62_700.0,
        payment_status: PaymentStatus::Paid,
        payment_method: PaymentMethod::Transfer,
        paid_amount: 62_700.0,
    }];

    let transactions = vec![
        Transaction {
            id: TransactionId::new(),
            date: day(2024, 5, 1),
            kind: TransactionKind::Income,
            category: "Sales".to_string(),
            amount: 62_700.0,
            description: format!("Sales invoice {number}"),
            ref_id: Some(invoice_id),
            status: Some(PaymentStatus::Paid),
        },
        Transaction {
            id: TransactionId::new(),
            date: day(2024, 5, 2),
            kind: TransactionKind::Expense,
            category: "Rent".to_string(),
            amount: 20_000.0,
            description: "Office rent for May".to_string(),
            ref_id: None,
            status: None,
        },
    ];

    AppState {
        products,
        contacts,
        invoices,
        transactions,
    }
}

/// Default accounts: one admin, one sales user.
pub fn users() -> Vec<User> {
    vec![
        User {
            id: UserId::new(),
            name: "Ahmed the Accountant".to_string(),
            username: "admin".to_string(),
            password: "admin".to_string(),
            role: Role::Admin,
            email: "admin@system.example".to_string(),
        },
        User {
            id: UserId::new(),
            name: "Sara from Sales".to_string(),
            username: "sales".to_string(),
            password: "123".to_string(),
            role: Role::Sales,
            email: "sales@almohaseb.example".to_string(),
        },
    ]
}

pub fn company_info() -> CompanyInfo {
    CompanyInfo {
        name: "Almohaseb Trading Co".to_string(),
        logo: None,
        address: "Cairo, Nasr City, Abbas El Akkad St".to_string(),
        phone: "02-22700000".to_string(),
        email: "contact@almohaseb.example".to_string(),
        tax_number: "100-200-300".to_string(),
        currency: "EGP".to_string(),
        remote_url: None,
        remote_key: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_is_internally_consistent() {
        let state = state();
        let invoice = &state.invoices[0];

        // The seeded invoice references a seeded contact and product.
        assert!(state.contacts.iter().any(|c| c.id == invoice.contact_id));
        assert!(state
            .products
            .iter()
            .any(|p| p.id == invoice.items[0].product_id));

        // Its ledger echo points back at it with the full paid amount.
        let echo = state
            .transactions
            .iter()
            .find(|t| t.ref_id == Some(invoice.id))
            .unwrap();
        assert_eq!(echo.amount, invoice.total);
        assert_eq!(invoice.total, invoice.subtotal + invoice.tax);
    }

    #[test]
    fn seed_users_can_log_in() {
        let users = users();
        assert!(mizan_auth::authenticate(&users, "admin", "admin").is_some());
        assert!(mizan_auth::authenticate(&users, "sales", "123").is_some());
    }
}
