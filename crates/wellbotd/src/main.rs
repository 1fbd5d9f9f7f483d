//! WellBot Daemon - feedback service and diagnosis relay
//!
//! Persists user feedback in SQLite behind a shared-secret header and
//! optionally answers `/diagnose` through a hosted chat model.

use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;
use wellbotd::config::Config;
use wellbotd::server;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    if std::env::args().nth(1).as_deref() == Some("--print-config") {
        print!("{}", Config::default_toml()?);
        return Ok(());
    }

    info!("WellBot daemon v{} starting", env!("CARGO_PKG_VERSION"));
    let config = Config::load();

    tokio::select! {
        result = server::run(config) => result?,
        _ = tokio::signal::ctrl_c() => info!("Shutting down gracefully"),
    }

    Ok(())
}
