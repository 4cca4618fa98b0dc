use std::sync::Arc;

use anyhow::Context;
use common_observability::ServiceMetrics;
use common_sidecar::DaprHttpClient;
use inventory_service::{build_router, AppState, InventoryServiceConfig, SERVICE_NAME};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = InventoryServiceConfig::from_env()?;
    let sidecar = DaprHttpClient::new(&config.sidecar).context("failed to build sidecar client")?;
    let subscription = config.subscription.clone();
    info!(
        sidecar = %sidecar.endpoint(),
        pubsub = %subscription.pubsub,
        topic = %subscription.topic,
        route = %subscription.route,
        "Subscribing to order events"
    );

    let state = AppState {
        sidecar: Arc::new(sidecar),
        metrics: Arc::new(ServiceMetrics::new(SERVICE_NAME).context("failed to register metrics")?),
        subscription: Arc::new(subscription),
    };
    let app = build_router(state);

    let addr = config.bind_addr()?;
    info!(%addr, "starting inventory-service");
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
