//! Remote sync and durable local fallback.
//!
//! The in-memory state is authoritative. Everything in this crate is
//! best-effort plumbing around it: a gateway to the remote key-value store,
//! a debounced outbound scheduler, and a SQLite snapshot store read once at
//! startup. A failed remote write is logged and dropped, never propagated
//! into the domain.

pub mod gateway;
pub mod http;
pub mod local;
pub mod memory;
pub mod scheduler;
pub mod wire;

pub use gateway::{SyncError, SyncGateway};
pub use http::HttpSyncGateway;
pub use local::{LocalStore, SnapshotKey};
pub use memory::InMemoryGateway;
pub use scheduler::SyncScheduler;
pub use wire::{from_wire, to_wire};
