use axum::body::Bytes;
use axum::extract::State;
use axum::Json;
use chrono::Local;
use common_orders::{Order, OrderValidationError};
use serde::Serialize;
use tracing::{error, info, warn};

use crate::events::{decode_order, DecodeError, OrderDelivery};
use crate::AppState;

/// Acknowledgement understood by the sidecar. Handlers never ask for a retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SubscriptionStatus {
    Success,
    Drop,
}

#[derive(Debug, Serialize)]
pub struct SubscriptionResponse {
    pub status: SubscriptionStatus,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DeliveryOutcome {
    Processed(Order),
    /// Decoded, but not a valid order; acknowledged so it is not redelivered.
    Discarded { order: Order, reason: OrderValidationError },
    /// Payload could not be turned into an order.
    Dropped(DecodeError),
}

impl DeliveryOutcome {
    pub fn status(&self) -> SubscriptionStatus {
        match self {
            DeliveryOutcome::Processed(_) | DeliveryOutcome::Discarded { .. } => {
                SubscriptionStatus::Success
            }
            DeliveryOutcome::Dropped(_) => SubscriptionStatus::Drop,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DeliveryOutcome::Processed(_) => "processed",
            DeliveryOutcome::Discarded { .. } => "discarded",
            DeliveryOutcome::Dropped(_) => "dropped",
        }
    }
}

/// Validates and records a decoded order.
pub fn handle_order(order: Order) -> DeliveryOutcome {
    if let Err(reason) = order.validate() {
        match reason {
            OrderValidationError::MissingOrderId => {
                warn!("[INVENTORY] Received order with empty orderId")
            }
            OrderValidationError::InvalidAmount => warn!(
                order_id = %order.order_id,
                amount = order.amount,
                "[INVENTORY] Received order with invalid amount"
            ),
        }
        return DeliveryOutcome::Discarded { order, reason };
    }

    info!(
        order_id = %order.order_id,
        amount = order.amount,
        received_at = %Local::now().format("%Y-%m-%d %H:%M:%S"),
        "[INVENTORY] Received order"
    );
    info!(order_id = %order.order_id, "[INVENTORY] Order processed successfully");
    DeliveryOutcome::Processed(order)
}

/// Full delivery path from request body to outcome.
pub fn process_delivery(body: &[u8]) -> DeliveryOutcome {
    let decoded = OrderDelivery::from_body(body).and_then(|delivery| {
        if let Some(event_id) = &delivery.event_id {
            tracing::debug!(%event_id, "Order event delivered");
        }
        decode_order(delivery.data)
    });
    match decoded {
        Ok(order) => handle_order(order),
        Err(err) => {
            error!(error = %err, "Failed to decode order event; dropping");
            DeliveryOutcome::Dropped(err)
        }
    }
}

pub async fn receive_order(
    State(state): State<AppState>,
    body: Bytes,
) -> Json<SubscriptionResponse> {
    let outcome = process_delivery(&body);
    state.metrics.record_event(outcome.label());
    Json(SubscriptionResponse { status: outcome.status() })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn statuses_serialize_as_sidecar_expects() {
        let encode = |status| serde_json::to_value(SubscriptionResponse { status }).unwrap();
        assert_eq!(encode(SubscriptionStatus::Success), json!({"status": "SUCCESS"}));
        assert_eq!(encode(SubscriptionStatus::Drop), json!({"status": "DROP"}));
    }

    #[test]
    fn invalid_orders_are_discarded_not_retried() {
        let outcome = handle_order(Order::new("", 50));
        assert_eq!(
            outcome,
            DeliveryOutcome::Discarded {
                order: Order::new("", 50),
                reason: OrderValidationError::MissingOrderId,
            }
        );
        assert_eq!(outcome.status(), SubscriptionStatus::Success);

        let outcome = handle_order(Order::new("o1", 0));
        assert_eq!(outcome.label(), "discarded");
        assert_eq!(outcome.status(), SubscriptionStatus::Success);
    }

    #[test]
    fn undecodable_payloads_are_dropped() {
        let outcome = process_delivery(b"\x00\x01");
        assert!(matches!(outcome, DeliveryOutcome::Dropped(DecodeError::Raw(_))));
        assert_eq!(outcome.status(), SubscriptionStatus::Drop);
    }
}
