use common_http_errors::ApiError;
use common_orders::OrderValidationError;
use common_sidecar::SidecarError;
use thiserror::Error;
use tracing::error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum OrderError {
    #[error("invalid payload: {0}")]
    InvalidPayload(String),
    #[error(transparent)]
    Validation(#[from] OrderValidationError),
    #[error("order ID is required")]
    MissingIdentifier,
    #[error("order not found")]
    NotFound,
    #[error("stored order is corrupt: {0}")]
    CorruptRecord(String),
    #[error("failed to save order: {0}")]
    Persistence(SidecarError),
    #[error("failed to get order: {0}")]
    Lookup(SidecarError),
    #[error("sidecar unavailable: {0}")]
    DependencyUnavailable(SidecarError),
}

impl From<OrderError> for ApiError {
    fn from(err: OrderError) -> Self {
        match err {
            OrderError::InvalidPayload(_) => {
                ApiError::bad_request("invalid_payload", "invalid payload")
            }
            OrderError::Validation(e) => ApiError::bad_request(e.code(), e.to_string()),
            OrderError::MissingIdentifier => {
                ApiError::bad_request("missing_identifier", err.to_string())
            }
            OrderError::NotFound => ApiError::NotFound { code: "order_not_found", trace_id: None },
            OrderError::DependencyUnavailable(_) => {
                ApiError::ServiceUnavailable { code: "dependency_unavailable", trace_id: None }
            }
            OrderError::CorruptRecord(_) | OrderError::Persistence(_) | OrderError::Lookup(_) => {
                let trace_id = Uuid::new_v4();
                error!(%trace_id, error = %err, "order request failed");
                let (code, message) = match err {
                    OrderError::CorruptRecord(_) => {
                        ("corrupt_record", "stored order could not be decoded")
                    }
                    OrderError::Persistence(_) => ("persistence_error", "failed to save order"),
                    _ => ("lookup_error", "failed to get order"),
                };
                ApiError::internal(code, trace_id, message)
            }
        }
    }
}
