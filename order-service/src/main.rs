use std::sync::Arc;

use anyhow::Context;
use common_observability::ServiceMetrics;
use common_sidecar::DaprHttpClient;
use order_service::{build_router, AppState, OrderServiceConfig, SERVICE_NAME};
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

    let config = OrderServiceConfig::from_env()?;
    // One client for the whole process; every handler shares its pool.
    let sidecar = DaprHttpClient::new(&config.sidecar).context("failed to build sidecar client")?;
    info!(
        sidecar = %sidecar.endpoint(),
        store = %config.state_store,
        pubsub = %config.pubsub,
        topic = %config.topic,
        "Sidecar client configured"
    );

    let metrics =
        Arc::new(ServiceMetrics::new(SERVICE_NAME).context("failed to register metrics")?);
    let state = AppState::new(Arc::new(sidecar), &config, metrics);
    let app = build_router(state);

    let addr = config.bind_addr()?;
    info!(%addr, "starting order-service");
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
