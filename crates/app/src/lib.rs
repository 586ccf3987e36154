//! Application service layer.
//!
//! Wires the store, posting engine, reporting views, sync plumbing, and
//! authentication behind one facade the UI talks to. Holds the pieces the
//! domain crates do not own: company settings, the user list, the current
//! session, and the activity log.

pub mod activity;
pub mod seed;
pub mod service;
pub mod settings;

pub use activity::ActivityLog;
pub use service::AppService;
pub use settings::CompanyInfo;
