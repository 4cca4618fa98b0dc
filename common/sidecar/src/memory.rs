use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::json;

use crate::{BindingRequest, Sidecar, SidecarError, SidecarResult};

#[derive(Debug, Clone, PartialEq)]
pub struct PublishedEvent {
    pub pubsub: String,
    pub topic: String,
    pub data: serde_json::Value,
}

pub type BindingInvocation = BindingRequest;

/// In-process stand-in for the sidecar. Each capability can be switched to
/// fail independently to exercise partial-failure paths.
#[derive(Default)]
pub struct InMemorySidecar {
    state: Mutex<HashMap<(String, String), Vec<u8>>>,
    published: Mutex<Vec<PublishedEvent>>,
    bindings: Mutex<Vec<BindingInvocation>>,
    fail_save: AtomicBool,
    fail_get: AtomicBool,
    fail_publish: AtomicBool,
    fail_binding: AtomicBool,
    fail_metadata: AtomicBool,
}

fn unavailable(capability: &str) -> SidecarError {
    SidecarError::Status { status: 500, body: format!("{capability} unavailable") }
}

impl InMemorySidecar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_saves(&self, fail: bool) {
        self.fail_save.store(fail, Ordering::SeqCst);
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_get.store(fail, Ordering::SeqCst);
    }

    pub fn fail_publishes(&self, fail: bool) {
        self.fail_publish.store(fail, Ordering::SeqCst);
    }

    pub fn fail_bindings(&self, fail: bool) {
        self.fail_binding.store(fail, Ordering::SeqCst);
    }

    pub fn fail_metadata(&self, fail: bool) {
        self.fail_metadata.store(fail, Ordering::SeqCst);
    }

    /// Seeds a raw value, bypassing the save path (e.g. to plant corrupt records).
    pub fn put_raw(&self, store: &str, key: &str, value: impl Into<Vec<u8>>) {
        self.state.lock().unwrap().insert((store.to_string(), key.to_string()), value.into());
    }

    pub fn stored(&self, store: &str, key: &str) -> Option<Vec<u8>> {
        self.state.lock().unwrap().get(&(store.to_string(), key.to_string())).cloned()
    }

    pub fn state_len(&self) -> usize {
        self.state.lock().unwrap().len()
    }

    pub fn published(&self) -> Vec<PublishedEvent> {
        self.published.lock().unwrap().clone()
    }

    pub fn bindings(&self) -> Vec<BindingInvocation> {
        self.bindings.lock().unwrap().clone()
    }
}

#[async_trait]
impl Sidecar for InMemorySidecar {
    async fn save_state(
        &self,
        store: &str,
        key: &str,
        value: serde_json::Value,
    ) -> SidecarResult<()> {
        if self.fail_save.load(Ordering::SeqCst) {
            return Err(unavailable("state store"));
        }
        let bytes = serde_json::to_vec(&value).map_err(|e| SidecarError::Codec(e.to_string()))?;
        self.put_raw(store, key, bytes);
        Ok(())
    }

    async fn get_state(&self, store: &str, key: &str) -> SidecarResult<Option<Vec<u8>>> {
        if self.fail_get.load(Ordering::SeqCst) {
            return Err(unavailable("state store"));
        }
        Ok(self.stored(store, key))
    }

    async fn publish_event(
        &self,
        pubsub: &str,
        topic: &str,
        data: serde_json::Value,
    ) -> SidecarResult<()> {
        if self.fail_publish.load(Ordering::SeqCst) {
            return Err(unavailable("pubsub"));
        }
        self.published.lock().unwrap().push(PublishedEvent {
            pubsub: pubsub.to_string(),
            topic: topic.to_string(),
            data,
        });
        Ok(())
    }

    async fn invoke_binding(&self, request: BindingRequest) -> SidecarResult<()> {
        if self.fail_binding.load(Ordering::SeqCst) {
            return Err(unavailable("binding"));
        }
        self.bindings.lock().unwrap().push(request);
        Ok(())
    }

    async fn metadata(&self) -> SidecarResult<serde_json::Value> {
        if self.fail_metadata.load(Ordering::SeqCst) {
            return Err(SidecarError::Transport("connection refused".into()));
        }
        Ok(json!({ "id": "in-memory", "runtimeVersion": "test" }))
    }
}
