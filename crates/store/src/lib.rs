//! Shared application state behind an explicit store.
//!
//! The store owns every entity collection, applies a posting
//! [`EffectBatch`](mizan_invoicing::EffectBatch) as one all-or-nothing unit,
//! and notifies subscribers after each committed change. There are no
//! ambient globals: callers hold an `Arc<Store>` and go through its API.

pub mod state;
pub mod store;
pub mod subscription;

pub use state::AppState;
pub use store::{StateChange, Store};
pub use subscription::Subscription;
