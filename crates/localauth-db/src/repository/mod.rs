//! SQLite repository implementations.

mod tenant;
mod user;

pub use tenant::SqliteTenantRepository;
pub use user::SqliteUserRepository;
