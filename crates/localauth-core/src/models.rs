//! Domain models for LocalAuth.

pub mod tenant;
pub mod user;
