//! LocalAuth Core: domain models, the shared error taxonomy, and
//! repository traits.
//!
//! Nothing in this crate performs I/O. The storage crate implements the
//! repository traits; the auth crate consumes them generically.

pub mod error;
pub mod models;
pub mod repository;
