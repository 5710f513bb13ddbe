use anyhow::Result;
use catalog_core::Catalog;
use catalog_k8s::EndpointsDirectory;
use std::sync::Arc;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod config;

use config::{DaemonConfig, LogFormat};

#[tokio::main]
async fn main() -> Result<()> {
    let config = DaemonConfig::from_env()?;
    init_tracing(config.log_format);

    info!("Starting catalog-daemon for namespace {}...", config.namespace);

    let directory = EndpointsDirectory::connect().await?;
    let catalog = Catalog::new(config.namespace.clone(), Arc::new(directory)).await?;
    report(&catalog).await;

    let mut ticker = time::interval_at(
        Instant::now() + config.report_interval,
        config.report_interval,
    );
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => report(&catalog).await,
            signal = tokio::signal::ctrl_c() => {
                if let Err(e) = signal {
                    warn!("Failed to listen for shutdown signal: {}", e);
                }
                break;
            }
        }
    }

    info!("Shutdown signal received, stopping catalog...");
    catalog.shutdown().await;

    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

/// Log a one-line summary of the catalog and the health of its refresh loop
async fn report(catalog: &Catalog) {
    let index = catalog.snapshot().await;
    let status = catalog.status().await;

    info!(
        "Catalog {}: {} services, {} instances (generation {})",
        catalog.scope(),
        index.service_count(),
        index.instance_count(),
        status.generation
    );

    if let Some(error) = &status.last_error {
        warn!(
            "Catalog {} is stale after {} failed refreshes: {}",
            catalog.scope(),
            status.consecutive_failures,
            error
        );
    }
}
