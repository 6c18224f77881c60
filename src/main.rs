//! Tollgate packet filter - entry point.
//!
//! Loads the blacklist, attaches the verdict engine to the capture
//! chokepoint, and keeps filtering until shutdown. The hook is only
//! registered after a successful blacklist load, and it is deregistered
//! before anything else is torn down.

use std::borrow::Cow;

use anyhow::{Context, Result};
use tracing::info;

use tollgate::blacklist::FileLoader;
use tollgate::config::Config;
use tollgate::engine::VerdictEngine;
use tollgate::intercept::{Interceptor, Priority, Stage, TapInterceptor};
use tollgate::network::{find_interface, open_channel};

async fn run() -> Result<()> {
    let config_path = std::env::var("CONFIG_PATH")
        .map(Cow::Owned)
        .unwrap_or(Cow::Borrowed("config.toml"));
    let config = Config::load(config_path.as_ref()).context("Failed to load configuration")?;

    // Initialize metrics (must be done early, before any metrics are recorded)
    tollgate::metrics::init(&config.metrics).context("Failed to initialize metrics")?;
    if config.metrics.enabled {
        info!("Metrics enabled on {}", config.metrics.listen);
    }

    info!("Starting tollgate packet filter...");
    info!("Blacklist file: {}", config.blacklist_path.display());
    info!("Blacklist capacity: {} entries", config.max_entries);

    // A failed load is fatal: nothing may attach to the packet path
    // without a complete blacklist.
    let blacklist = FileLoader::load(&config.blacklist_path, config.max_entries)
        .await
        .context("Failed to load blacklist, refusing to attach")?;
    info!("Loaded {} addresses into blacklist", blacklist.len());

    let ingress =
        find_interface(config.interface.as_deref()).context("Failed to find capture interface")?;
    info!("Capturing on interface: {}", ingress.name);

    let (capture, ingress_sender) =
        open_channel(&ingress).context("Failed to open capture channel")?;

    let sender = match config.egress_interface.as_deref() {
        Some(name) if name != ingress.name => {
            let egress =
                find_interface(Some(name)).context("Failed to find egress interface")?;
            info!("Re-emitting on interface: {}", egress.name);
            let (_, egress_sender) =
                open_channel(&egress).context("Failed to open egress channel")?;
            egress_sender
        }
        _ => ingress_sender,
    };

    let engine = VerdictEngine::new(blacklist);
    let mut interceptor = TapInterceptor::new(capture, sender);
    interceptor
        .register(engine.into_hook(), Stage::PreRouting, Priority::First)
        .context("Failed to register interception hook")?;
    info!("Interception hook registered at pre-routing");

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for shutdown signal")?;
    info!("Ctrl-C received, shutting down...");

    // Detach before anything the hook closes over goes away.
    interceptor
        .deregister()
        .context("Failed to deregister interception hook")?;

    info!("Shutdown complete.");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    run().await
}
