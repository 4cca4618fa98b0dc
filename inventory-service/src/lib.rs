pub mod app;
pub mod config;
pub mod events;
pub mod subscription_handlers;

pub use app::{build_router, AppState, SERVICE_NAME};
pub use config::{InventoryServiceConfig, Subscription};
pub use events::{decode_order, DecodeError, EventData, OrderDelivery};
pub use subscription_handlers::{
    handle_order, process_delivery, DeliveryOutcome, SubscriptionStatus,
};
