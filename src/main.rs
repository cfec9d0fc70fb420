//! shinebridge - battery telemetry bridge
//!
//! Main entry point: parse configuration, spawn the poll loop, and serve
//! the local read endpoint.

use std::time::Duration;

use anyhow::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use shinebridge::auth::{CredentialEncoder, SessionManager, SessionStore};
use shinebridge::cache::DeviceCache;
use shinebridge::cli::Cli;
use shinebridge::config::Config;
use shinebridge::poller::Poller;
use shinebridge::server;
use shinebridge::vendor::ShineClient;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse_args();
    let config = Config::from_cli(cli);
    config.validate()?;

    tracing::info!(
        "Starting shinebridge: account={}, api_base={}, poll every {}ms",
        config.account,
        config.api_base,
        config.poll_interval_ms
    );

    let cache = DeviceCache::new();
    let api = ShineClient::new(&config.api_base)?;
    let sessions = SessionManager::new(
        config.account.clone(),
        config.password.clone(),
        CredentialEncoder::vendor_default()?,
        SessionStore::new(&config.session_file),
    );

    let poller = Poller::new(
        api,
        sessions,
        cache.clone(),
        Duration::from_millis(config.poll_interval_ms),
    );
    tokio::spawn(poller.run());

    server::run_server(cache, &config.listen).await
}

/// Initialize tracing with an env-filter (RUST_LOG) and a fmt layer.
fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();
}
