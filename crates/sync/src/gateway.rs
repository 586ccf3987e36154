//! Abstract remote store.

use async_trait::async_trait;
use serde_json::Value;

use mizan_core::EntityKind;

#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("remote is unreachable")]
    Offline,
    #[error("network error: {0}")]
    Network(String),
    #[error("remote error ({0}): {1}")]
    Api(u16, String),
    #[error("parse error: {0}")]
    Parse(String),
}

/// Remote key-value store, one table per [`EntityKind`].
///
/// Records cross this boundary as wire-format JSON (see [`crate::wire`]);
/// the gateway itself does no field mapping. Every operation is best-effort
/// from the caller's point of view: errors are for logging, not for rolling
/// back local state.
#[async_trait]
pub trait SyncGateway: Send + Sync {
    /// All records of one kind, in remote order.
    async fn fetch_all(&self, kind: EntityKind) -> Result<Vec<Value>, SyncError>;

    /// Idempotent insert-or-replace keyed by each record's `id`.
    async fn upsert(&self, kind: EntityKind, records: Vec<Value>) -> Result<(), SyncError>;

    async fn delete(&self, kind: EntityKind, id: &str) -> Result<(), SyncError>;
}
