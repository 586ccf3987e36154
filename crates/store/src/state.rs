use serde::{Deserialize, Serialize};

use mizan_accounting::Transaction;
use mizan_inventory::Product;
use mizan_invoicing::Invoice;
use mizan_parties::Contact;

/// The full in-memory entity tree.
///
/// Collections are plain vectors in insertion order; id uniqueness within
/// each collection is maintained by the store's mutation paths, not by the
/// container.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppState {
    pub products: Vec<Product>,
    pub contacts: Vec<Contact>,
    pub invoices: Vec<Invoice>,
    pub transactions: Vec<Transaction>,
}
