//! `mizan-core` — domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns):
//! strongly-typed identifiers, the domain error model, and the entity trait
//! shared by every business crate.

pub mod entity;
pub mod error;
pub mod id;
pub mod kind;

pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::{ContactId, InvoiceId, ProductId, TransactionId, UserId};
pub use kind::EntityKind;
