use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use common_http_errors::ApiResult;
use common_orders::Order;
use tracing::{info, warn};

use crate::errors::OrderError;
use crate::AppState;

pub async fn create_order(State(state): State<AppState>, body: Bytes) -> ApiResult<StatusCode> {
    let order: Order = serde_json::from_slice(&body).map_err(|err| {
        warn!(error = %err, "Failed to decode order");
        OrderError::InvalidPayload(err.to_string())
    })?;

    if let Err(err) = order.validate() {
        warn!(
            order_id = %order.order_id,
            amount = order.amount,
            error = %err,
            "Rejected invalid order"
        );
        return Err(OrderError::from(err).into());
    }

    state.orders.persist(&order).await?;

    let report = state.orders.notify(&order).await;
    for (leg, err) in report.failures() {
        // The order is already saved; the caller still gets 202.
        warn!(order_id = %order.order_id, leg, error = %err, "Order side effect failed");
        state.metrics.record_side_effect_failure(leg);
    }

    info!(order_id = %order.order_id, amount = order.amount, "Order created");
    Ok(StatusCode::ACCEPTED)
}

/// The decoded path segment is the state key, byte for byte, so any id
/// accepted by `create_order` reads back unchanged.
pub async fn get_order(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
) -> ApiResult<Json<Order>> {
    if order_id.is_empty() {
        return Err(OrderError::MissingIdentifier.into());
    }
    let order = state.orders.load(&order_id).await?;
    Ok(Json(order))
}

/// `GET /orders/` has no id segment to extract.
pub async fn missing_order_id() -> ApiResult<Json<Order>> {
    Err(OrderError::MissingIdentifier.into())
}
