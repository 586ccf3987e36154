//! In-memory gateway for tests and offline development.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use mizan_core::EntityKind;

use crate::gateway::{SyncError, SyncGateway};

/// Gateway backed by per-kind maps keyed on each record's `id` field.
///
/// Can be switched into a failing mode to exercise the warn-and-continue
/// paths of callers.
#[derive(Debug, Default)]
pub struct InMemoryGateway {
    tables: Mutex<HashMap<EntityKind, BTreeMap<String, Value>>>,
    failing: AtomicBool,
    upsert_calls: AtomicUsize,
}

impl InMemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent operation fail with [`SyncError::Offline`].
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Number of `upsert` calls that reached the gateway, including failed
    /// ones.
    pub fn upsert_calls(&self) -> usize {
        self.upsert_calls.load(Ordering::SeqCst)
    }

    fn check_online(&self) -> Result<(), SyncError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(SyncError::Offline);
        }
        Ok(())
    }

    fn record_id(record: &Value) -> Result<String, SyncError> {
        record
            .get("id")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| SyncError::Parse("record is missing a string id".to_string()))
    }
}

#[async_trait]
impl SyncGateway for InMemoryGateway {
    async fn fetch_all(&self, kind: EntityKind) -> Result<Vec<Value>, SyncError> {
        self.check_online()?;
        let tables = self
            .tables
            .lock()
            .map_err(|_| SyncError::Network("poisoned table lock".to_string()))?;
        Ok(tables
            .get(&kind)
            .map(|table| table.values().cloned().collect())
            .unwrap_or_default())
    }

    async fn upsert(&self, kind: EntityKind, records: Vec<Value>) -> Result<(), SyncError> {
        self.upsert_calls.fetch_add(1, Ordering::SeqCst);
        self.check_online()?;
        let mut tables = self
            .tables
            .lock()
            .map_err(|_| SyncError::Network("poisoned table lock".to_string()))?;
        let table = tables.entry(kind).or_default();
        for record in records {
            table.insert(Self::record_id(&record)?, record);
        }
        Ok(())
    }

    async fn delete(&self, kind: EntityKind, id: &str) -> Result<(), SyncError> {
        self.check_online()?;
        let mut tables = self
            .tables
            .lock()
            .map_err(|_| SyncError::Network("poisoned table lock".to_string()))?;
        if let Some(table) = tables.get_mut(&kind) {
            table.remove(id);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn upsert_replaces_by_id_and_delete_removes() {
        let gw = InMemoryGateway::new();
        gw.upsert(
            EntityKind::Product,
            vec![json!({"id": "p1", "name": "Laptop"})],
        )
        .await
        .unwrap();
        gw.upsert(
            EntityKind::Product,
            vec![json!({"id": "p1", "name": "Laptop Pro"})],
        )
        .await
        .unwrap();

        let rows = gw.fetch_all(EntityKind::Product).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["name"], "Laptop Pro");

        gw.delete(EntityKind::Product, "p1").await.unwrap();
        assert!(gw.fetch_all(EntityKind::Product).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn failing_mode_surfaces_offline() {
        let gw = InMemoryGateway::new();
        gw.set_failing(true);
        let err = gw.fetch_all(EntityKind::Contact).await.unwrap_err();
        assert!(matches!(err, SyncError::Offline));
    }
}
