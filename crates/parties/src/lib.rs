//! Parties domain module (clients and suppliers).
//!
//! This crate contains the contact entity and its running-balance sign
//! conventions, implemented purely as deterministic domain logic (no IO,
//! no HTTP, no storage).

pub mod contact;

pub use contact::{Contact, ContactKind};
