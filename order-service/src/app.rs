use std::sync::Arc;

use axum::extract::State;
use axum::http::{header::{ACCEPT, CONTENT_TYPE}, HeaderValue, Method, StatusCode};
use axum::{middleware, routing::{get, post}, Json, Router};
use common_http_errors::ApiResult;
use common_observability::{error_metrics_mw, ServiceMetrics};
use common_sidecar::Sidecar;
use serde_json::{json, Value};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::warn;

use crate::config::OrderServiceConfig;
use crate::errors::OrderError;
use crate::order_handlers::{create_order, get_order, missing_order_id};
use crate::workflow::OrderWorkflow;

pub const SERVICE_NAME: &str = "order-service";

#[derive(Clone)]
pub struct AppState {
    pub orders: OrderWorkflow,
    pub metrics: Arc<ServiceMetrics>,
    pub allowed_origins: Arc<Vec<String>>,
}

impl AppState {
    pub fn new(
        sidecar: Arc<dyn Sidecar>,
        config: &OrderServiceConfig,
        metrics: Arc<ServiceMetrics>,
    ) -> Self {
        Self {
            orders: OrderWorkflow::new(sidecar, config),
            metrics,
            allowed_origins: Arc::new(config.allowed_origins.clone()),
        }
    }
}

pub async fn health(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    if let Err(err) = state.orders.sidecar().metadata().await {
        warn!(error = %err, "Health check failed");
        return Err(OrderError::DependencyUnavailable(err).into());
    }
    Ok(Json(json!({ "status": "healthy" })))
}

/// This service only publishes; it advertises no subscriptions.
pub async fn subscriptions() -> Json<Vec<Value>> {
    Json(Vec::new())
}

async fn metrics(State(state): State<AppState>) -> (StatusCode, String) {
    state.metrics.render()
}

pub fn build_router(state: AppState) -> Router {
    let origins = state
        .allowed_origins
        .iter()
        .filter_map(|o| o.parse::<HeaderValue>().ok())
        .collect::<Vec<_>>();
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([ACCEPT, CONTENT_TYPE]);
    let metrics_state = state.metrics.clone();

    Router::new()
        .route("/healthz", get(health))
        .route("/orders", post(create_order))
        .route("/orders/", get(missing_order_id))
        .route("/orders/:order_id", get(get_order))
        .route("/dapr/subscribe", get(subscriptions))
        .route("/metrics", get(metrics))
        .with_state(state)
        .layer(cors)
        .layer(middleware::from_fn_with_state(metrics_state, error_metrics_mw))
}
