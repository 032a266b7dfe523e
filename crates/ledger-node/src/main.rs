//! # Ledger Node Binary

use std::sync::Arc;

use anyhow::{Context, Result};
use ledger_core::{FileBackedKVStore, Ledger, LedgerApi, LedgerDependencies, SystemTimeSource};
use ledger_node::{router, AppState, NodeConfig};
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    // Load configuration
    let config = NodeConfig::from_env().context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;
    info!(
        listen_addr = %config.listen_addr,
        data_path = %config.data_path.display(),
        max_body_bytes = config.max_body_bytes,
        validation_concurrency = config.ledger.validation_concurrency,
        "Ledger node starting"
    );

    // Open the store and the single ledger instance
    let store = FileBackedKVStore::open(&config.data_path)
        .await
        .with_context(|| format!("Failed to open ledger file {}", config.data_path.display()))?;
    let deps = LedgerDependencies {
        store: Arc::new(store),
        time_source: SystemTimeSource,
    };
    let ledger = Ledger::open(deps, config.ledger.clone())
        .await
        .context("Failed to open ledger")?;

    let existing = ledger.height().await.context("Failed to read chain height")?;
    ledger.initialize().await.context("Failed to initialize genesis block")?;
    if existing == 0 {
        info!("Genesis block created");
    } else {
        info!(height = existing, "Existing chain loaded");
    }

    // Serve
    let app = router(AppState::new(Arc::new(ledger)), config.max_body_bytes);
    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.listen_addr))?;
    info!(addr = %listener.local_addr()?, "Node is running. Press Ctrl+C to stop.");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
    }
    info!("Initiating graceful shutdown...");
}
