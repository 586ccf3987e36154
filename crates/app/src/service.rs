//! The application facade.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use anyhow::Context;
use chrono::NaiveDate;
use serde_json::Value;
use tracing::{info, warn};

use mizan_accounting::{Transaction, TransactionKind};
use mizan_auth::{authenticate, Section, User};
use mizan_core::{ContactId, DomainError, DomainResult, EntityKind, ProductId, TransactionId, UserId};
use mizan_inventory::Product;
use mizan_invoicing::{post_invoice, Invoice, PostInvoice};
use mizan_parties::Contact;
use mizan_reporting::{
    build_statement, dashboard_stats, DashboardStats, LedgerFilter, StatementRow,
};
use mizan_store::{AppState, StateChange, Store, Subscription};
use mizan_sync::{
    from_wire, to_wire, HttpSyncGateway, LocalStore, SnapshotKey, SyncGateway, SyncScheduler,
};

use crate::activity::ActivityLog;
use crate::seed;
use crate::settings::CompanyInfo;

struct RemoteSync {
    gateway: Arc<dyn SyncGateway>,
    scheduler: SyncScheduler,
}

/// Owns the store, the session, and the sync plumbing.
///
/// One instance per process; methods take `&self` and are safe to call from
/// concurrent tasks. The in-memory state is authoritative: local snapshots
/// are written after every committed change, the remote push is debounced
/// and best-effort.
pub struct AppService {
    store: Arc<Store>,
    local: LocalStore,
    remote: RwLock<Option<Arc<RemoteSync>>>,
    company_info: RwLock<CompanyInfo>,
    users: RwLock<Vec<User>>,
    current_user: RwLock<Option<User>>,
    activity: RwLock<Vec<ActivityLog>>,
}

impl AppService {
    /// Load the initial state from the local store, falling back to the
    /// built-in seed dataset on first run, and configure the remote gateway
    /// from the stored company settings.
    pub async fn bootstrap(local: LocalStore) -> anyhow::Result<Self> {
        mizan_observability::init();

        let products: Option<Vec<Product>> = local.get(SnapshotKey::Products).await?;
        let contacts: Option<Vec<Contact>> = local.get(SnapshotKey::Contacts).await?;
        let invoices: Option<Vec<Invoice>> = local.get(SnapshotKey::Invoices).await?;
        let transactions: Option<Vec<Transaction>> =
            local.get(SnapshotKey::Transactions).await?;

        let fresh_install = products.is_none()
            && contacts.is_none()
            && invoices.is_none()
            && transactions.is_none();
        let state = if fresh_install {
            info!("no local snapshots found, seeding initial dataset");
            seed::state()
        } else {
            AppState {
                products: products.unwrap_or_default(),
                contacts: contacts.unwrap_or_default(),
                invoices: invoices.unwrap_or_default(),
                transactions: transactions.unwrap_or_default(),
            }
        };

        let company_info: CompanyInfo = local
            .get(SnapshotKey::CompanyInfo)
            .await?
            .unwrap_or_else(seed::company_info);
        let users: Vec<User> = local
            .get(SnapshotKey::Users)
            .await?
            .unwrap_or_else(seed::users);
        let current_user: Option<User> = local.get(SnapshotKey::CurrentUser).await?;

        let service = Self {
            store: Arc::new(Store::new(state)),
            local,
            remote: RwLock::new(None),
            company_info: RwLock::new(company_info),
            users: RwLock::new(users),
            current_user: RwLock::new(current_user),
            activity: RwLock::new(Vec::new()),
        };

        if fresh_install {
            service.persist_entities(&EntityKind::ALL).await;
            service.persist_users().await;
            service.persist_company_info().await;
        }
        service.configure_remote();
        // Fetch-on-connect: the remote, when configured and reachable,
        // supersedes the local snapshots.
        if service.remote_sync().is_some() {
            if let Err(err) = service.refresh_from_remote().await {
                warn!(error = %err, "initial remote fetch failed, using local state");
            }
        }
        Ok(service)
    }

    /// The underlying store, e.g. for change subscriptions.
    pub fn store(&self) -> &Arc<Store> {
        &self.store
    }

    pub fn subscribe(&self) -> Subscription<StateChange> {
        self.store.subscribe()
    }

    // ---- session -------------------------------------------------------

    pub async fn login(&self, username: &str, password: &str) -> Option<User> {
        let user = {
            let users = self.users.read().unwrap_or_else(PoisonError::into_inner);
            authenticate(&users, username, password)
        }?;

        self.push_activity(ActivityLog::record(&user, "login", "signed in"));
        info!(username = %user.username, "user logged in");
        *self
            .current_user
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(user.clone());
        if let Err(err) = self.local.put(SnapshotKey::CurrentUser, &user).await {
            warn!(error = %err, "failed to persist session");
        }
        Some(user)
    }

    pub async fn logout(&self) {
        *self
            .current_user
            .write()
            .unwrap_or_else(PoisonError::into_inner) = None;
        if let Err(err) = self.local.remove(SnapshotKey::CurrentUser).await {
            warn!(error = %err, "failed to clear persisted session");
        }
    }

    pub fn current_user(&self) -> Option<User> {
        self.current_user
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Section gating for the current session; everything is closed while
    /// logged out.
    pub fn can_access(&self, section: Section) -> bool {
        self.current_user()
            .is_some_and(|user| user.role.can_access(section))
    }

    pub fn activity_log(&self) -> Vec<ActivityLog> {
        self.activity
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn push_activity(&self, entry: ActivityLog) {
        self.activity
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(entry);
    }

    // ---- posting -------------------------------------------------------

    /// Post a draft invoice against the current state and commit its effect
    /// batch atomically.
    pub async fn post_invoice(&self, cmd: PostInvoice, date: NaiveDate) -> DomainResult<Invoice> {
        let (contact, invoices) = self.store.read(|s| {
            (
                s.contacts.iter().find(|c| c.id == cmd.contact_id).cloned(),
                s.invoices.clone(),
            )
        });
        let contact =
            contact.ok_or_else(|| DomainError::not_found(format!("contact {}", cmd.contact_id)))?;

        let batch = post_invoice(&cmd, &contact, &invoices, date)?;
        let invoice = batch.invoice.clone();
        self.store.apply(batch)?;

        if let Some(user) = self.current_user() {
            self.push_activity(ActivityLog::record(
                &user,
                "post_invoice",
                format!("posted invoice {}", invoice.number),
            ));
        }
        self.after_change(&EntityKind::ALL).await;
        Ok(invoice)
    }

    // ---- entity CRUD ---------------------------------------------------

    pub async fn add_product(&self, product: Product) -> DomainResult<()> {
        self.store.add_product(product)?;
        self.after_change(&[EntityKind::Product]).await;
        Ok(())
    }

    pub async fn update_product(&self, product: Product) -> DomainResult<()> {
        self.store.update_product(product)?;
        self.after_change(&[EntityKind::Product]).await;
        Ok(())
    }

    pub async fn delete_product(&self, id: ProductId) -> DomainResult<()> {
        self.store.remove_product(id)?;
        self.relay_remote_delete(EntityKind::Product, id.to_string());
        self.after_change(&[EntityKind::Product]).await;
        Ok(())
    }

    pub async fn add_contact(&self, contact: Contact) -> DomainResult<()> {
        self.store.add_contact(contact)?;
        self.after_change(&[EntityKind::Contact]).await;
        Ok(())
    }

    pub async fn update_contact(&self, contact: Contact) -> DomainResult<()> {
        self.store.update_contact(contact)?;
        self.after_change(&[EntityKind::Contact]).await;
        Ok(())
    }

    pub async fn delete_contact(&self, id: ContactId) -> DomainResult<()> {
        self.store.remove_contact(id)?;
        self.relay_remote_delete(EntityKind::Contact, id.to_string());
        self.after_change(&[EntityKind::Contact]).await;
        Ok(())
    }

    /// Manual ledger entry, no invoice back-reference.
    pub async fn add_manual_transaction(
        &self,
        date: NaiveDate,
        kind: TransactionKind,
        category: impl Into<String>,
        amount: f64,
        description: impl Into<String>,
    ) -> DomainResult<Transaction> {
        let tx = Transaction::manual(
            TransactionId::new(),
            date,
            kind,
            category,
            amount,
            description,
        )?;
        self.store.add_transaction(tx.clone())?;
        self.after_change(&[EntityKind::Transaction]).await;
        Ok(tx)
    }

    // ---- users & settings ----------------------------------------------

    pub fn users(&self) -> Vec<User> {
        self.users
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub async fn add_user(&self, user: User) -> DomainResult<()> {
        {
            let mut users = self.users.write().unwrap_or_else(PoisonError::into_inner);
            if users.iter().any(|u| u.username == user.username) {
                return Err(DomainError::conflict(format!(
                    "username {} already exists",
                    user.username
                )));
            }
            users.push(user);
        }
        self.persist_users().await;
        Ok(())
    }

    pub async fn remove_user(&self, id: UserId) -> DomainResult<()> {
        {
            let mut users = self.users.write().unwrap_or_else(PoisonError::into_inner);
            let before = users.len();
            users.retain(|u| u.id != id);
            if users.len() == before {
                return Err(DomainError::not_found(format!("user {id}")));
            }
        }
        self.persist_users().await;
        Ok(())
    }

    pub fn company_info(&self) -> CompanyInfo {
        self.company_info
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Update settings and reconfigure the remote gateway from the new
    /// credentials.
    pub async fn update_company_info(&self, info: CompanyInfo) {
        *self
            .company_info
            .write()
            .unwrap_or_else(PoisonError::into_inner) = info;
        self.persist_company_info().await;
        self.configure_remote();
        if self.remote_sync().is_some() {
            if let Err(err) = self.refresh_from_remote().await {
                warn!(error = %err, "remote fetch after settings change failed");
            }
        }
    }

    // ---- reporting -----------------------------------------------------

    pub fn statement(&self, contact_id: ContactId) -> DomainResult<Vec<StatementRow>> {
        self.store.read(|s| {
            let contact = s
                .contacts
                .iter()
                .find(|c| c.id == contact_id)
                .ok_or_else(|| DomainError::not_found(format!("contact {contact_id}")))?;
            Ok(build_statement(contact, &s.invoices, &s.transactions))
        })
    }

    pub fn stats(&self) -> DashboardStats {
        self.store
            .read(|s| dashboard_stats(&s.invoices, &s.transactions, &s.products))
    }

    pub fn ledger(&self, filter: &LedgerFilter) -> Vec<Transaction> {
        self.store.read(|s| {
            filter
                .apply(&s.transactions)
                .into_iter()
                .cloned()
                .collect()
        })
    }

    // ---- sync ----------------------------------------------------------

    /// Use a specific gateway instead of the one derived from company
    /// settings, with the given debounce window.
    pub fn attach_gateway(&self, gateway: Arc<dyn SyncGateway>, debounce: Duration) {
        let scheduler = SyncScheduler::with_delay(Arc::clone(&gateway), debounce);
        *self.remote.write().unwrap_or_else(PoisonError::into_inner) =
            Some(Arc::new(RemoteSync { gateway, scheduler }));
    }

    /// Replace the in-memory collections with the remote's contents.
    pub async fn refresh_from_remote(&self) -> anyhow::Result<()> {
        let Some(remote) = self.remote_sync() else {
            return Ok(());
        };

        let products = fetch_collection::<Product>(&*remote.gateway, EntityKind::Product).await?;
        let contacts = fetch_collection::<Contact>(&*remote.gateway, EntityKind::Contact).await?;
        let invoices = fetch_collection::<Invoice>(&*remote.gateway, EntityKind::Invoice).await?;
        let transactions =
            fetch_collection::<Transaction>(&*remote.gateway, EntityKind::Transaction).await?;

        self.store.replace(AppState {
            products,
            contacts,
            invoices,
            transactions,
        });
        self.persist_entities(&EntityKind::ALL).await;
        Ok(())
    }

    fn remote_sync(&self) -> Option<Arc<RemoteSync>> {
        self.remote
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn configure_remote(&self) {
        let info = self.company_info();
        let next = info.remote_credentials().map(|(url, key)| {
            let gateway: Arc<dyn SyncGateway> = Arc::new(HttpSyncGateway::new(url, key));
            Arc::new(RemoteSync {
                scheduler: SyncScheduler::new(Arc::clone(&gateway)),
                gateway,
            })
        });
        *self.remote.write().unwrap_or_else(PoisonError::into_inner) = next;
    }

    fn relay_remote_delete(&self, kind: EntityKind, id: String) {
        let Some(remote) = self.remote_sync() else {
            return;
        };
        tokio::spawn(async move {
            if let Err(err) = remote.gateway.delete(kind, &id).await {
                warn!(%kind, %id, error = %err, "remote delete failed, local state stays authoritative");
            }
        });
    }

    /// Persist the changed collections locally and queue the debounced
    /// remote push. Neither path can fail the committed change.
    async fn after_change(&self, kinds: &[EntityKind]) {
        self.persist_entities(kinds).await;

        if let Some(remote) = self.remote_sync() {
            let state = self.store.snapshot();
            let mut batch = HashMap::new();
            for kind in kinds {
                batch.insert(*kind, wire_records(*kind, &state));
            }
            remote.scheduler.schedule(batch);
        }
    }

    async fn persist_entities(&self, kinds: &[EntityKind]) {
        let state = self.store.snapshot();
        for kind in kinds {
            let result = match kind {
                EntityKind::Product => self.local.put(SnapshotKey::Products, &state.products).await,
                EntityKind::Contact => self.local.put(SnapshotKey::Contacts, &state.contacts).await,
                EntityKind::Invoice => self.local.put(SnapshotKey::Invoices, &state.invoices).await,
                EntityKind::Transaction => {
                    self.local
                        .put(SnapshotKey::Transactions, &state.transactions)
                        .await
                }
            };
            if let Err(err) = result {
                warn!(%kind, error = %err, "failed to write local snapshot");
            }
        }
    }

    async fn persist_users(&self) {
        let users = self.users();
        if let Err(err) = self.local.put(SnapshotKey::Users, &users).await {
            warn!(error = %err, "failed to persist users");
        }
    }

    async fn persist_company_info(&self) {
        let info = self.company_info();
        if let Err(err) = self.local.put(SnapshotKey::CompanyInfo, &info).await {
            warn!(error = %err, "failed to persist company settings");
        }
    }
}

fn wire_records(kind: EntityKind, state: &AppState) -> Vec<Value> {
    let values: Result<Vec<Value>, _> = match kind {
        EntityKind::Product => state.products.iter().map(serde_json::to_value).collect(),
        EntityKind::Contact => state.contacts.iter().map(serde_json::to_value).collect(),
        EntityKind::Invoice => state.invoices.iter().map(serde_json::to_value).collect(),
        EntityKind::Transaction => state
            .transactions
            .iter()
            .map(serde_json::to_value)
            .collect(),
    };
    match values {
        Ok(values) => values.into_iter().map(|v| to_wire(kind, v)).collect(),
        Err(err) => {
            warn!(%kind, error = %err, "failed to serialize collection for sync");
            Vec::new()
        }
    }
}

async fn fetch_collection<T: serde::de::DeserializeOwned>(
    gateway: &dyn SyncGateway,
    kind: EntityKind,
) -> anyhow::Result<Vec<T>> {
    let rows = gateway
        .fetch_all(kind)
        .await
        .with_context(|| format!("failed to fetch {kind} from remote"))?;
    rows.into_iter()
        .map(|row| {
            serde_json::from_value(from_wire(kind, row))
                .with_context(|| format!("malformed remote {kind} record"))
        })
        .collect()
}
