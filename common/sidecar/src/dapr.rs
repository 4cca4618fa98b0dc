use std::env;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode, Url};
use serde_json::json;
use tracing::debug;

use crate::{BindingRequest, Sidecar, SidecarError, SidecarResult};

pub const DAPR_API_TOKEN_HEADER: &str = "dapr-api-token";

const DEFAULT_DAPR_HOST: &str = "127.0.0.1";
const DEFAULT_DAPR_HTTP_PORT: u16 = 3500;
const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone)]
pub struct SidecarClientConfig {
    pub endpoint: String,
    pub api_token: Option<String>,
    pub timeout: Duration,
}

impl SidecarClientConfig {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_token: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Reads the variables the Dapr runtime injects into app processes.
    /// `DAPR_HTTP_ENDPOINT` wins over `DAPR_HOST`/`DAPR_HTTP_PORT`.
    pub fn from_env() -> SidecarResult<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) over an arbitrary variable source.
    /// Unset variables fall back to defaults; malformed ones are errors.
    pub fn from_lookup<F>(lookup: F) -> SidecarResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let endpoint = match lookup("DAPR_HTTP_ENDPOINT").filter(|v| !v.trim().is_empty()) {
            Some(endpoint) => endpoint,
            None => {
                let host = lookup("DAPR_HOST").unwrap_or_else(|| DEFAULT_DAPR_HOST.to_string());
                let port = parse_var(&lookup, "DAPR_HTTP_PORT", DEFAULT_DAPR_HTTP_PORT)?;
                format!("http://{host}:{port}")
            }
        };
        let api_token = lookup("DAPR_API_TOKEN").filter(|v| !v.is_empty());
        let timeout_secs = parse_var(&lookup, "SIDECAR_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?;
        if timeout_secs == 0 {
            return Err(SidecarError::Config("SIDECAR_TIMEOUT_SECS must be at least 1".into()));
        }
        Ok(Self { endpoint, api_token, timeout: Duration::from_secs(timeout_secs) })
    }
}

fn parse_var<F, T>(lookup: &F, key: &str, default: T) -> SidecarResult<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| SidecarError::Config(format!("{key}={raw:?}: {e}"))),
        None => Ok(default),
    }
}

/// [`Sidecar`] over the Dapr HTTP API. Cloning shares the connection pool.
#[derive(Clone)]
pub struct DaprHttpClient {
    http: Client,
    base: Url,
    api_token: Option<String>,
}

impl DaprHttpClient {
    pub fn new(config: &SidecarClientConfig) -> SidecarResult<Self> {
        let base = Url::parse(config.endpoint.trim())
            .map_err(|e| SidecarError::InvalidEndpoint(format!("{}: {e}", config.endpoint)))?;
        if base.cannot_be_a_base() {
            return Err(SidecarError::InvalidEndpoint(config.endpoint.clone()));
        }
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| SidecarError::Transport(e.to_string()))?;
        Ok(Self { http, base, api_token: config.api_token.clone() })
    }

    pub fn endpoint(&self) -> &Url {
        &self.base
    }

    fn url(&self, segments: &[&str]) -> SidecarResult<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| SidecarError::InvalidEndpoint(self.base.to_string()))?
            .pop_if_empty()
            .push("v1.0")
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let builder = self.http.request(method, url);
        match &self.api_token {
            Some(token) => builder.header(DAPR_API_TOKEN_HEADER, token),
            None => builder,
        }
    }

    async fn send(&self, builder: RequestBuilder) -> SidecarResult<Response> {
        let resp = builder.send().await.map_err(|e| SidecarError::Transport(e.to_string()))?;
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().await.unwrap_or_default();
        Err(SidecarError::Status { status: status.as_u16(), body })
    }
}

#[async_trait]
impl Sidecar for DaprHttpClient {
    async fn save_state(
        &self,
        store: &str,
        key: &str,
        value: serde_json::Value,
    ) -> SidecarResult<()> {
        let url = self.url(&["state", store])?;
        let body = json!([{ "key": key, "value": value }]);
        self.send(self.request(Method::POST, url).json(&body)).await?;
        debug!(store, key, "state saved");
        Ok(())
    }

    async fn get_state(&self, store: &str, key: &str) -> SidecarResult<Option<Vec<u8>>> {
        let url = self.url(&["state", store, key])?;
        let resp = self.send(self.request(Method::GET, url)).await?;
        // 204 is how the state API reports a key with no value.
        if resp.status() == StatusCode::NO_CONTENT {
            return Ok(None);
        }
        let bytes = resp.bytes().await.map_err(|e| SidecarError::Transport(e.to_string()))?;
        if bytes.is_empty() {
            return Ok(None);
        }
        Ok(Some(bytes.to_vec()))
    }

    async fn publish_event(
        &self,
        pubsub: &str,
        topic: &str,
        data: serde_json::Value,
    ) -> SidecarResult<()> {
        let url = self.url(&["publish", pubsub, topic])?;
        self.send(self.request(Method::POST, url).json(&data)).await?;
        debug!(pubsub, topic, "event published");
        Ok(())
    }

    async fn invoke_binding(&self, request: BindingRequest) -> SidecarResult<()> {
        let url = self.url(&["bindings", &request.name])?;
        self.send(self.request(Method::POST, url).json(&request)).await?;
        debug!(binding = %request.name, operation = %request.operation, "binding invoked");
        Ok(())
    }

    async fn metadata(&self) -> SidecarResult<serde_json::Value> {
        let url = self.url(&["metadata"])?;
        let resp = self.send(self.request(Method::GET, url)).await?;
        resp.json::<serde_json::Value>().await.map_err(|e| SidecarError::Codec(e.to_string()))
    }
}
