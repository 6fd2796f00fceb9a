//! Paybox Service - HTTP API for the wallet ledger.
//!
//! This is the main entry point for the paybox service.

use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use paybox_gateway::HttpGateway;
use paybox_service::{create_router, AppState, ReconciliationJob, ServiceConfig};
use paybox_store::RocksLedger;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,paybox=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Paybox Service");

    // Load configuration from environment
    let config = ServiceConfig::from_env();

    tracing::info!(
        listen_addr = %config.listen_addr,
        data_dir = %config.data_dir,
        gateway_base_url = %config.gateway_base_url,
        gateway_configured = %config.gateway_api_key.is_some(),
        "Service configuration loaded"
    );

    if config.gateway_api_key.is_none() {
        tracing::warn!("Gateway API key not configured - deposits will be rejected upstream");
    }

    // Initialize RocksDB ledger
    tracing::info!(path = %config.data_dir, "Opening RocksDB ledger");
    let store = Arc::new(RocksLedger::open(&config.data_dir)?);

    // Build the gateway client
    let gateway = Arc::new(HttpGateway::new(
        config.gateway_base_url.clone(),
        config.gateway_api_key.clone().unwrap_or_default(),
    ));

    // Build app state
    let state = AppState::new(store.clone(), gateway.clone(), config.clone());

    // Spawn the reconciliation job
    ReconciliationJob::new(
        store,
        gateway,
        Duration::from_secs(config.reconcile_interval_seconds),
        Duration::from_secs(config.pending_timeout_seconds),
        Duration::from_secs(config.pending_expiry_seconds),
    )
    .spawn();
    tracing::info!(
        interval_seconds = %config.reconcile_interval_seconds,
        "Reconciliation job started"
    );

    // Create the router
    let app = create_router(state);

    // Start HTTP server
    tracing::info!(listen_addr = %config.listen_addr, "Starting HTTP server");
    let listener = tokio::net::TcpListener::bind(&config.listen_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
