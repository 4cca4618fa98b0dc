use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::{middleware, routing::{get, post}, Json, Router};
use common_http_errors::{ApiError, ApiResult};
use common_observability::{error_metrics_mw, ServiceMetrics};
use common_sidecar::Sidecar;
use serde_json::{json, Value};
use tracing::warn;

use crate::config::Subscription;
use crate::subscription_handlers::receive_order;

pub const SERVICE_NAME: &str = "inventory-service";

#[derive(Clone)]
pub struct AppState {
    pub sidecar: Arc<dyn Sidecar>,
    pub metrics: Arc<ServiceMetrics>,
    pub subscription: Arc<Subscription>,
}

/// Readiness probe; reuses the process-wide sidecar handle.
pub async fn health(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    if let Err(err) = state.sidecar.metadata().await {
        warn!(error = %err, "Health check failed: sidecar unavailable");
        return Err(ApiError::ServiceUnavailable { code: "dependency_unavailable", trace_id: None });
    }
    Ok(Json(json!({ "status": "ready" })))
}

pub async fn subscriptions(State(state): State<AppState>) -> Json<Vec<Subscription>> {
    Json(vec![state.subscription.as_ref().clone()])
}

async fn metrics(State(state): State<AppState>) -> (StatusCode, String) {
    state.metrics.render()
}

pub fn build_router(state: AppState) -> Router {
    let route = state.subscription.route.clone();
    let metrics_state = state.metrics.clone();
    Router::new()
        .route("/healthz", get(health))
        .route("/dapr/subscribe", get(subscriptions))
        .route(&route, post(receive_order))
        .route("/metrics", get(metrics))
        .with_state(state)
        .layer(middleware::from_fn_with_state(metrics_state, error_metrics_mw))
}
