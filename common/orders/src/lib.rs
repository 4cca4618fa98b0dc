//! Order entity shared by the intake and inventory services.
//!
//! Both services exchange the same JSON shape (`{"orderId": .., "amount": ..}`)
//! through the state store and the `orders` topic, so the type and its
//! validation rules live here rather than being redeclared per service.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Binding operation used when writing receipt artifacts.
pub const RECEIPT_OPERATION: &str = "create";

/// Metadata keys understood by the common blob/object/file bindings.
/// All of them receive the same artifact name.
pub const RECEIPT_METADATA_KEYS: [&str; 3] = ["blobName", "key", "fileName"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    /// Missing ids decode as empty so that `{}` surfaces as a validation error.
    #[serde(default)]
    pub order_id: String,
    /// Minor currency units.
    #[serde(default)]
    pub amount: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum OrderValidationError {
    #[error("orderId is required")]
    MissingOrderId,
    #[error("amount must be positive")]
    InvalidAmount,
}

impl OrderValidationError {
    /// Stable error code used in HTTP error bodies and metrics labels.
    pub fn code(&self) -> &'static str {
        match self {
            OrderValidationError::MissingOrderId => "missing_order_id",
            OrderValidationError::InvalidAmount => "invalid_amount",
        }
    }
}

impl Order {
    pub fn new(order_id: impl Into<String>, amount: i64) -> Self {
        Self { order_id: order_id.into(), amount }
    }

    /// Id is checked before amount, so an order failing both reports the missing id.
    pub fn validate(&self) -> Result<(), OrderValidationError> {
        if self.order_id.is_empty() {
            return Err(OrderValidationError::MissingOrderId);
        }
        if self.amount <= 0 {
            return Err(OrderValidationError::InvalidAmount);
        }
        Ok(())
    }

    /// Object name of the receipt artifact written for this order.
    pub fn receipt_name(&self) -> String {
        format!("{}.txt", self.order_id)
    }

    pub fn receipt_text(&self) -> String {
        format!("Order receipt for {}", self.order_id)
    }
}
