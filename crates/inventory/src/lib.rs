//! Inventory domain module.
//!
//! This crate contains the product entity and the low-stock rule,
//! implemented purely as deterministic domain logic (no IO, no HTTP,
//! no storage).

pub mod product;

pub use product::Product;
