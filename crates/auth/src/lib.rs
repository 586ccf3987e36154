//! Users, roles, and section access.
//!
//! Authentication is a plain credential match against the in-memory user
//! list. Hashing, lockout, and sessions are deliberately out of scope; the
//! result is a yes/no with no distinction between unknown user and wrong
//! password.

pub mod user;

pub use user::{authenticate, Role, Section, User};
