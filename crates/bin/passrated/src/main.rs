//! Daemon entry point for passrate.
//!
//! Loads configuration from the environment, opens the record store, and
//! serves the API and pages over HTTP until interrupted.

mod config;

use passrate_core::control::ResultsControlPlane;
use passrate_core::store::SurrealResultStore;
use passrate_web::{WebServer, WebServerConfig};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::PassrateConfig;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let config = PassrateConfig::from_args()?;
    let endpoint = config.store_endpoint();
    let store = SurrealResultStore::open(&endpoint).await?;
    let control = ResultsControlPlane::with_store(store.clone()).with_heading(config.heading.clone());

    let server_config =
        WebServerConfig::new(config.http_addr).with_max_body_bytes(config.max_body_bytes);
    let served = WebServer::new(control, server_config)
        .serve(shutdown_signal())
        .await;

    store.close();
    served.map_err(|err| err as Box<dyn std::error::Error>)
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("shutdown requested"),
        Err(err) => warn!(error = %err, "failed to listen for shutdown signal"),
    }
}
