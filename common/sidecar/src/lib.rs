//! Client side of the sidecar runtime (Dapr HTTP API).
//!
//! Services only talk to the sidecar through the [`Sidecar`] trait: keyed
//! state, topic publish, output bindings and a metadata probe. The handle is
//! built once in `main` and shared as `Arc<dyn Sidecar>`; tests swap in
//! [`InMemorySidecar`].

pub mod dapr;
pub mod memory;

use std::collections::HashMap;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

pub use dapr::{DaprHttpClient, SidecarClientConfig, DAPR_API_TOKEN_HEADER};
pub use memory::{BindingInvocation, InMemorySidecar, PublishedEvent};

#[derive(Debug, Error)]
pub enum SidecarError {
    #[error("sidecar transport error: {0}")]
    Transport(String),
    #[error("sidecar returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("sidecar payload codec error: {0}")]
    Codec(String),
    #[error("invalid sidecar endpoint: {0}")]
    InvalidEndpoint(String),
    #[error("invalid sidecar configuration: {0}")]
    Config(String),
}

pub type SidecarResult<T> = Result<T, SidecarError>;

/// Output binding invocation (e.g. a blob write).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BindingRequest {
    #[serde(skip)]
    pub name: String,
    pub operation: String,
    pub data: String,
    pub metadata: HashMap<String, String>,
}

impl BindingRequest {
    pub fn new(
        name: impl Into<String>,
        operation: impl Into<String>,
        data: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            operation: operation.into(),
            data: data.into(),
            metadata: HashMap::new(),
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

#[async_trait]
pub trait Sidecar: Send + Sync {
    /// Upserts `value` under `key` in the named state store.
    async fn save_state(&self, store: &str, key: &str, value: serde_json::Value)
        -> SidecarResult<()>;

    /// Raw stored bytes, or `None` when the key holds no value.
    async fn get_state(&self, store: &str, key: &str) -> SidecarResult<Option<Vec<u8>>>;

    async fn publish_event(
        &self,
        pubsub: &str,
        topic: &str,
        data: serde_json::Value,
    ) -> SidecarResult<()>;

    async fn invoke_binding(&self, request: BindingRequest) -> SidecarResult<()>;

    /// Sidecar metadata document; used as the reachability probe.
    async fn metadata(&self) -> SidecarResult<serde_json::Value>;
}
