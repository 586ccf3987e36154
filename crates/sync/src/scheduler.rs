//! Debounced outbound sync.
//!
//! Every committed state change queues fresh collection snapshots here.
//! Pushing is delayed by a short window; another change inside the window
//! replaces the queued snapshots and restarts the timer, so a burst of
//! edits produces one remote write. Failures are logged and dropped; the
//! next state change schedules the next attempt.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use serde_json::Value;
use tokio::task::JoinHandle;
use tracing::warn;

use mizan_core::EntityKind;

use crate::gateway::SyncGateway;

/// Quiet window between the last state change and the remote push.
pub const DEBOUNCE: Duration = Duration::from_millis(1500);

/// Cancellable, merging debounce around [`SyncGateway::upsert`].
///
/// Must live inside a tokio runtime: `schedule` spawns the delay task.
pub struct SyncScheduler {
    gateway: Arc<dyn SyncGateway>,
    delay: Duration,
    pending: Arc<Mutex<HashMap<EntityKind, Vec<Value>>>>,
    timer: Mutex<Option<JoinHandle<()>>>,
}

impl SyncScheduler {
    pub fn new(gateway: Arc<dyn SyncGateway>) -> Self {
        Self::with_delay(gateway, DEBOUNCE)
    }

    pub fn with_delay(gateway: Arc<dyn SyncGateway>, delay: Duration) -> Self {
        Self {
            gateway,
            delay,
            pending: Arc::new(Mutex::new(HashMap::new())),
            timer: Mutex::new(None),
        }
    }

    /// Queue collection snapshots (wire format) and restart the debounce
    /// window.
    ///
    /// Snapshots merge per kind: a newer snapshot of the same collection
    /// replaces the queued one, snapshots of other collections stay queued.
    pub fn schedule(&self, batch: HashMap<EntityKind, Vec<Value>>) {
        {
            let mut pending = self
                .pending
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            pending.extend(batch);
        }

        let mut timer = self.timer.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(handle) = timer.take() {
            handle.abort();
        }

        let gateway = Arc::clone(&self.gateway);
        let pending = Arc::clone(&self.pending);
        let delay = self.delay;
        *timer = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let batch = drain(&pending);
            push(gateway.as_ref(), batch).await;
        }));
    }

    /// Push whatever is queued right now, bypassing the debounce.
    pub async fn flush(&self) {
        {
            let mut timer = self.timer.lock().unwrap_or_else(PoisonError::into_inner);
            if let Some(handle) = timer.take() {
                handle.abort();
            }
        }
        let batch = drain(&self.pending);
        push(self.gateway.as_ref(), batch).await;
    }
}

fn drain(
    pending: &Arc<Mutex<HashMap<EntityKind, Vec<Value>>>>,
) -> Vec<(EntityKind, Vec<Value>)> {
    pending
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .drain()
        .collect()
}

async fn push(gateway: &dyn SyncGateway, batch: Vec<(EntityKind, Vec<Value>)>) {
    for (kind, records) in batch {
        if let Err(err) = gateway.upsert(kind, records).await {
            warn!(%kind, error = %err, "remote sync failed, local state stays authoritative");
        }
    }
}
