//! LocalAuth: local multi-tenant authentication server.

use localauth_server::{ApiServer, AppState, LogFormat, ServerConfig, shutdown_signal};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::load()?;
    init_tracing(config.log_format);

    let state = AppState::new(config)?;

    let removed = state.sweep_orphan_stores().await?;
    if !removed.is_empty() {
        tracing::info!(count = removed.len(), "Removed orphaned app stores");
    }

    ApiServer::new(state)
        .run_with_shutdown(shutdown_signal())
        .await
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "localauth=info,tower_http=info".into());
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Json => registry.with(fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(fmt::layer()).init(),
    }
}
