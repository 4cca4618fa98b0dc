pub mod app;
pub mod config;
pub mod errors;
pub mod order_handlers;
pub mod workflow;

pub use app::{build_router, AppState, SERVICE_NAME};
pub use config::OrderServiceConfig;
pub use errors::OrderError;
pub use workflow::{OrderWorkflow, SideEffectReport};
