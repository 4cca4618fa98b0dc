//! Order intake orchestration over the sidecar.
//!
//! Creating an order is one load-bearing step ([`OrderWorkflow::persist`])
//! followed by best-effort notifications ([`OrderWorkflow::notify`]). Only the
//! save decides the outcome of the request; publish and receipt failures come
//! back in a [`SideEffectReport`] that callers log and otherwise ignore,
//! because the order is already durable by then.

use std::sync::Arc;

use common_orders::{Order, RECEIPT_METADATA_KEYS, RECEIPT_OPERATION};
use common_sidecar::{BindingRequest, Sidecar, SidecarError, SidecarResult};

use crate::config::OrderServiceConfig;
use crate::errors::OrderError;

#[derive(Clone)]
pub struct OrderWorkflow {
    sidecar: Arc<dyn Sidecar>,
    state_store: String,
    pubsub: String,
    topic: String,
    receipt_binding: String,
}

/// Outcome of the non-critical legs that follow a successful save.
#[derive(Debug)]
pub struct SideEffectReport {
    pub published: SidecarResult<()>,
    pub receipt: SidecarResult<()>,
}

impl SideEffectReport {
    /// Failed legs, labelled `publish` / `receipt`.
    pub fn failures(&self) -> impl Iterator<Item = (&'static str, &SidecarError)> {
        [("publish", &self.published), ("receipt", &self.receipt)]
            .into_iter()
            .filter_map(|(leg, result)| result.as_ref().err().map(|err| (leg, err)))
    }

    pub fn is_clean(&self) -> bool {
        self.published.is_ok() && self.receipt.is_ok()
    }
}

impl OrderWorkflow {
    pub fn new(sidecar: Arc<dyn Sidecar>, config: &OrderServiceConfig) -> Self {
        Self {
            sidecar,
            state_store: config.state_store.clone(),
            pubsub: config.pubsub.clone(),
            topic: config.topic.clone(),
            receipt_binding: config.receipt_binding.clone(),
        }
    }

    pub fn sidecar(&self) -> &Arc<dyn Sidecar> {
        &self.sidecar
    }

    /// Stores the order verbatim under its own id. Callers must have validated it.
    pub async fn persist(&self, order: &Order) -> Result<(), OrderError> {
        let value = serde_json::to_value(order)
            .map_err(|e| OrderError::Persistence(SidecarError::Codec(e.to_string())))?;
        self.sidecar
            .save_state(&self.state_store, &order.order_id, value)
            .await
            .map_err(OrderError::Persistence)
    }

    /// Publishes the order-created event, then writes the receipt. Neither
    /// result affects the other.
    pub async fn notify(&self, order: &Order) -> SideEffectReport {
        let published = self.publish(order).await;
        let receipt = self.store_receipt(order).await;
        SideEffectReport { published, receipt }
    }

    async fn publish(&self, order: &Order) -> SidecarResult<()> {
        let data = serde_json::to_value(order).map_err(|e| SidecarError::Codec(e.to_string()))?;
        self.sidecar.publish_event(&self.pubsub, &self.topic, data).await
    }

    async fn store_receipt(&self, order: &Order) -> SidecarResult<()> {
        let name = order.receipt_name();
        let request = RECEIPT_METADATA_KEYS.iter().fold(
            BindingRequest::new(&self.receipt_binding, RECEIPT_OPERATION, order.receipt_text()),
            |request, key| request.with_metadata(*key, name.clone()),
        );
        self.sidecar.invoke_binding(request).await
    }

    pub async fn load(&self, order_id: &str) -> Result<Order, OrderError> {
        let raw = self
            .sidecar
            .get_state(&self.state_store, order_id)
            .await
            .map_err(OrderError::Lookup)?
            .ok_or(OrderError::NotFound)?;
        serde_json::from_slice(&raw).map_err(|e| OrderError::CorruptRecord(e.to_string()))
    }
}
