//! LocalAuth Server: HTTP surfaces for tenant administration and tenant
//! user credentials.

pub mod config;
pub mod error;
pub mod middleware;
pub mod response;
pub mod routes;
pub mod server;
pub mod state;

pub use config::{LogFormat, ServerConfig};
pub use error::{ApiError, ApiResult};
pub use routes::router;
pub use server::{ApiServer, shutdown_signal};
pub use state::AppState;
