use std::sync::mpsc;
use std::sync::{Mutex, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::debug;

use mizan_accounting::Transaction;
use mizan_core::{ContactId, DomainError, DomainResult, EntityKind, ProductId};
use mizan_inventory::Product;
use mizan_invoicing::EffectBatch;
use mizan_parties::Contact;

use crate::state::AppState;
use crate::subscription::Subscription;

/// Notification emitted after a committed state change, naming the entity
/// collections it touched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateChange {
    pub kinds: Vec<EntityKind>,
}

/// Thread-safe owner of the application state.
///
/// Readers take the lock briefly through [`Store::read`] and can never
/// observe a partially applied effect batch: validation happens before the
/// first mutation, and all mutations of a batch run under one write lock.
#[derive(Debug, Default)]
pub struct Store {
    state: RwLock<AppState>,
    subscribers: Mutex<Vec<mpsc::Sender<StateChange>>>,
}

impl Store {
    pub fn new(initial: AppState) -> Self {
        Self {
            state: RwLock::new(initial),
            subscribers: Mutex::new(Vec::new()),
        }
    }

    // Mutation closures only assign fields and push to vectors, so a
    // poisoned lock still guards consistent data; recover instead of
    // propagating a panic from an unrelated thread.
    fn read_lock(&self) -> RwLockReadGuard<'_, AppState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_lock(&self) -> RwLockWriteGuard<'_, AppState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run a closure against the current state under the read lock.
    pub fn read<R>(&self, f: impl FnOnce(&AppState) -> R) -> R {
        f(&self.read_lock())
    }

    /// Deep copy of the current state.
    pub fn snapshot(&self) -> AppState {
        self.read_lock().clone()
    }

    /// Subscribe to committed state changes.
    pub fn subscribe(&self) -> Subscription<StateChange> {
        let (tx, rx) = mpsc::channel();
        if let Ok(mut subs) = self.subscribers.lock() {
            subs.push(tx);
        }
        Subscription::new(rx)
    }

    fn publish(&self, kinds: Vec<EntityKind>) {
        let change = StateChange { kinds };
        if let Ok(mut subs) = self.subscribers.lock() {
            // Drop dead subscribers while publishing.
            subs.retain(|tx| tx.send(change.clone()).is_ok());
        }
    }

    /// Apply a posting effect batch, all or nothing.
    ///
    /// Every referenced entity is checked before the first mutation; a
    /// validation failure leaves the state byte-for-byte untouched. The
    /// invoice number is re-checked here so that a batch computed against a
    /// stale snapshot cannot commit a duplicate.
    pub fn apply(&self, batch: EffectBatch) -> DomainResult<()> {
        let mut state = self.write_lock();

        if state
            .invoices
            .iter()
            .any(|inv| inv.number == batch.invoice.number)
        {
            return Err(DomainError::conflict(format!(
                "invoice number {} already exists",
                batch.invoice.number
            )));
        }
        for delta in &batch.stock_deltas {
            if !state.products.iter().any(|p| p.id == delta.product_id) {
                return Err(DomainError::not_found(format!(
                    "product {} referenced by invoice line",
                    delta.product_id
                )));
            }
        }
        if let Some(balance) = &batch.balance_delta {
            if !state.contacts.iter().any(|c| c.id == balance.contact_id) {
                return Err(DomainError::not_found(format!(
                    "contact {}",
                    balance.contact_id
                )));
            }
        }

        let mut kinds = vec![EntityKind::Invoice, EntityKind::Product];

        for delta in &batch.stock_deltas {
            if let Some(product) = state
                .products
                .iter_mut()
                .find(|p| p.id == delta.product_id)
            {
                product.quantity += delta.delta;
            }
        }
        if let Some(balance) = &batch.balance_delta {
            if let Some(contact) = state
                .contacts
                .iter_mut()
                .find(|c| c.id == balance.contact_id)
            {
                contact.balance += balance.delta;
            }
            kinds.push(EntityKind::Contact);
        }
        if let Some(tx) = batch.transaction {
            state.transactions.push(tx);
            kinds.push(EntityKind::Transaction);
        }
        debug!(number = %batch.invoice.number, "invoice committed");
        state.invoices.push(batch.invoice);

        drop(state);
        self.publish(kinds);
        Ok(())
    }

    pub fn add_product(&self, product: Product) -> DomainResult<()> {
        let mut state = self.write_lock();
        if state.products.iter().any(|p| p.id == product.id) {
            return Err(DomainError::conflict(format!("product {}", product.id)));
        }
        state.products.push(product);
        drop(state);
        self.publish(vec![EntityKind::Product]);
        Ok(())
    }

    pub fn update_product(&self, product: Product) -> DomainResult<()> {
        let mut state = self.write_lock();
        let slot = state
            .products
            .iter_mut()
            .find(|p| p.id == product.id)
            .ok_or_else(|| DomainError::not_found(format!("product {}", product.id)))?;
        *slot = product;
        drop(state);
        self.publish(vec![EntityKind::Product]);
        Ok(())
    }

    pub fn remove_product(&self, id: ProductId) -> DomainResult<()> {
        let mut state = self.write_lock();
        let before = state.products.len();
        state.products.retain(|p| p.id != id);
        if state.products.len() == before {
            return Err(DomainError::not_found(format!("product {id}")));
        }
        drop(state);
        self.publish(vec![EntityKind::Product]);
        Ok(())
    }

    pub fn add_contact(&self, contact: Contact) -> DomainResult<()> {
        let mut state = self.write_lock();
        if state.contacts.iter().any(|c| c.id == contact.id) {
            return Err(DomainError::conflict(format!("contact {}", contact.id)));
        }
        state.contacts.push(contact);
        drop(state);
        self.publish(vec![EntityKind::Contact]);
        Ok(())
    }

    pub fn update_contact(&self, contact: Contact) -> DomainResult<()> {
        let mut state = self.write_lock();
        let slot = state
            .contacts
            .iter_mut()
            .find(|c| c.id == contact.id)
            .ok_or_else(|| DomainError::not_found(format!("contact {}", contact.id)))?;
        *slot = contact;
        drop(state);
        self.publish(vec![EntityKind::Contact]);
        Ok(())
    }

    pub fn remove_contact(&self, id: ContactId) -> DomainResult<()> {
        let mut state = self.write_lock();
        let before = state.contacts.len();
        state.contacts.retain(|c| c.id != id);
        if state.contacts.len() == before {
            return Err(DomainError::not_found(format!("contact {id}")));
        }
        drop(state);
        self.publish(vec![EntityKind::Contact]);
        Ok(())
    }

    /// Append a manual ledger entry.
    pub fn add_transaction(&self, tx: Transaction) -> DomainResult<()> {
        let mut state = self.write_lock();
        if state.transactions.iter().any(|t| t.id == tx.id) {
            return Err(DomainError::conflict(format!("transaction {}", tx.id)));
        }
        state.transactions.push(tx);
        drop(state);
        self.publish(vec![EntityKind::Transaction]);
        Ok(())
    }

    /// Replace the whole state, e.g. after a full fetch from the remote
    /// store. Subscribers see one notification covering every kind.
    pub fn replace(&self, next: AppState) {
        *self.write_lock() = next;
        self.publish(EntityKind::ALL.to_vec());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use mizan_accounting::PaymentStatus;
    use mizan_core::{ContactId, ProductId};
    use mizan_invoicing::{post_invoice, InvoiceItem, InvoiceKind, PaymentMethod, PostInvoice};
    use mizan_parties::ContactKind;

    fn day(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn product(quantity: i64) -> Product {
        Product::new(
            ProductId::new(),
            "P001",
            "",
            "Laptop",
            "Electronics",
            "Main",
            450.0,
            550.0,
            quantity,
            2,
        )
        .unwrap()
    }

    fn client() -> Contact {
        Contact::new(ContactId::new(), ContactKind::Client, "Delta Traders", "", "", 0.0).unwrap()
    }

    fn sale_batch(
        store: &Store,
        contact: &Contact,
        item: InvoiceItem,
        status: PaymentStatus,
    ) -> EffectBatch {
        let cmd = PostInvoice {
            kind: InvoiceKind::Sale,
            contact_id: contact.id,
            items: vec![item],
            discount: 0.0,
            requested_status: status,
            paid_amount_input: 0.0,
            payment_method: PaymentMethod::Cash,
        };
        let invoices = store.read(|s| s.invoices.clone());
        post_invoice(&cmd, contact, &invoices, day("2024-06-01")).unwrap()
    }

    #[test]
    fn applied_batch_moves_stock_balance_and_ledger_together() {
        let product = product(10);
        let contact = client();
        let store = Store::new(AppState {
            products: vec![product.clone()],
            contacts: vec![contact.clone()],
            ..Default::default()
        });

        let item = InvoiceItem::new(product.id, "Laptop", 3, 550.0).unwrap();
        let batch = sale_batch(&store, &contact, item, PaymentStatus::Unpaid);
        let expected_balance = -batch.invoice.total;
        store.apply(batch).unwrap();

        store.read(|s| {
            assert_eq!(s.products[0].quantity, 7);
            assert_eq!(s.contacts[0].balance, expected_balance);
            assert_eq!(s.invoices.len(), 1);
            assert_eq!(s.transactions.len(), 1);
        });
    }

    #[test]
    fn purchase_batch_adds_stock_back() {
        let product = product(10);
        let supplier =
            Contact::new(ContactId::new(), ContactKind::Supplier, "Tech Import", "", "", 0.0)
                .unwrap();
        let store = Store::new(AppState {
            products: vec![product.clone()],
            contacts: vec![supplier.clone()],
            ..Default::default()
        });

        let cmd = PostInvoice {
            kind: InvoiceKind::Purchase,
            contact_id: supplier.id,
            items: vec![InvoiceItem::new(product.id, "Laptop", 3, 450.0).unwrap()],
            discount: 0.0,
            requested_status: PaymentStatus::Paid,
            paid_amount_input: 0.0,
            payment_method: PaymentMethod::Transfer,
        };
        let batch = post_invoice(&cmd, &supplier, &[], day("2024-06-01")).unwrap();
        store.apply(batch).unwrap();

        store.read(|s| assert_eq!(s.products[0].quantity, 13));
    }

    #[test]
    fn batch_referencing_unknown_product_leaves_state_untouched() {
        let contact = client();
        let store = Store::new(AppState {
            contacts: vec![contact.clone()],
            ..Default::default()
        });
        let before = store.snapshot();

        let orphan = InvoiceItem::new(ProductId::new(), "Ghost", 1, 10.0).unwrap();
        let batch = sale_batch(&store, &contact, orphan, PaymentStatus::Unpaid);
        let err = store.apply(batch).unwrap_err();

        assert!(matches!(err, DomainError::NotFound(_)));
        assert_eq!(store.snapshot(), before);
    }

    #[test]
    fn duplicate_invoice_number_is_rejected() {
        let product = product(10);
        let contact = client();
        let store = Store::new(AppState {
            products: vec![product.clone()],
            contacts: vec![contact.clone()],
            ..Default::default()
        });

        let item = InvoiceItem::new(product.id, "Laptop", 1, 550.0).unwrap();
        let first = sale_batch(&store, &contact, item.clone(), PaymentStatus::Paid);
        // Second batch computed against the same empty snapshot gets the
        // same number.
        let second = sale_batch(&store, &contact, item, PaymentStatus::Paid);

        store.apply(first).unwrap();
        let err = store.apply(second).unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
        store.read(|s| assert_eq!(s.invoices.len(), 1));
    }

    #[test]
    fn subscribers_learn_which_collections_changed() {
        let product = product(10);
        let contact = client();
        let store = Store::new(AppState {
            products: vec![product.clone()],
            contacts: vec![contact.clone()],
            ..Default::default()
        });
        let sub = store.subscribe();

        let item = InvoiceItem::new(product.id, "Laptop", 1, 550.0).unwrap();
        let batch = sale_batch(&store, &contact, item, PaymentStatus::Unpaid);
        store.apply(batch).unwrap();

        let change = sub.try_recv().unwrap();
        for kind in [
            EntityKind::Invoice,
            EntityKind::Product,
            EntityKind::Contact,
            EntityKind::Transaction,
        ] {
            assert!(change.kinds.contains(&kind), "missing {kind:?}");
        }
    }

    #[test]
    fn crud_rejects_unknown_and_duplicate_ids() {
        let store = Store::new(AppState::default());
        let p = product(1);

        store.add_product(p.clone()).unwrap();
        let err = store.add_product(p.clone()).unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));

        store.remove_product(p.id).unwrap();
        let err = store.remove_product(p.id).unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));

        let err = store.update_product(p).unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[test]
    fn replace_notifies_every_kind() {
        let store = Store::new(AppState::default());
        let sub = store.subscribe();

        store.replace(AppState {
            products: vec![product(4)],
            ..Default::default()
        });

        let change = sub.try_recv().unwrap();
        assert_eq!(change.kinds, EntityKind::ALL.to_vec());
        store.read(|s| assert_eq!(s.products.len(), 1));
    }
}
