use std::env;
use std::net::SocketAddr;

use anyhow::{Context, Result};
use common_sidecar::SidecarClientConfig;

const DEFAULT_ALLOWED_ORIGINS: [&str; 3] = [
    "http://localhost:3000",
    "http://localhost:3001",
    "http://localhost:5173",
];

#[derive(Debug, Clone)]
pub struct OrderServiceConfig {
    pub host: String,
    pub port: u16,
    pub sidecar: SidecarClientConfig,
    pub state_store: String,
    pub pubsub: String,
    pub topic: String,
    pub receipt_binding: String,
    pub allowed_origins: Vec<String>,
}

impl Default for OrderServiceConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            sidecar: SidecarClientConfig::new("http://127.0.0.1:3500"),
            state_store: "statestore".to_string(),
            pubsub: "pubsub".to_string(),
            topic: "orders".to_string(),
            receipt_binding: "storage".to_string(),
            allowed_origins: DEFAULT_ALLOWED_ORIGINS.iter().map(|o| o.to_string()).collect(),
        }
    }
}

impl OrderServiceConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let port = match lookup("PORT") {
            Some(value) => value
                .parse::<u16>()
                .with_context(|| format!("PORT must be a port number, got {value:?}"))?,
            None => defaults.port,
        };
        let allowed_origins = lookup("CORS_ALLOWED_ORIGINS")
            .map(|value| {
                value
                    .split(',')
                    .map(|origin| origin.trim().to_string())
                    .filter(|origin| !origin.is_empty())
                    .collect::<Vec<_>>()
            })
            .unwrap_or(defaults.allowed_origins);
        let sidecar = SidecarClientConfig::from_lookup(&lookup)
            .context("failed to read sidecar settings")?;

        Ok(Self {
            host: lookup("HOST").unwrap_or(defaults.host),
            port,
            sidecar,
            state_store: lookup("STATE_STORE_NAME").unwrap_or(defaults.state_store),
            pubsub: lookup("PUBSUB_NAME").unwrap_or(defaults.pubsub),
            topic: lookup("ORDERS_TOPIC").unwrap_or(defaults.topic),
            receipt_binding: lookup("RECEIPT_BINDING_NAME").unwrap_or(defaults.receipt_binding),
            allowed_origins,
        })
    }

    pub fn bind_addr(&self) -> Result<SocketAddr> {
        let ip: std::net::IpAddr = self
            .host
            .parse()
            .with_context(|| format!("HOST must be an IP address, got {:?}", self.host))?;
        Ok(SocketAddr::from((ip, self.port)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_bind_addr() {
        let addr = OrderServiceConfig::default().bind_addr().unwrap();
        assert_eq!(addr.to_string(), "0.0.0.0:8080");
    }

    #[test]
    fn bad_host_is_reported() {
        let config =
            OrderServiceConfig { host: "not-an-ip".into(), ..OrderServiceConfig::default() };
        let err = config.bind_addr().unwrap_err();
        assert!(err.to_string().contains("HOST"));
    }

    fn vars(pairs: &'static [(&'static str, &'static str)]) -> impl Fn(&str) -> Option<String> {
        move |key: &str| pairs.iter().find(|(k, _)| *k == key).map(|(_, v)| v.to_string())
    }

    #[test]
    fn reads_component_names_and_origins() {
        let config = OrderServiceConfig::from_lookup(vars(&[
            ("PORT", "9090"),
            ("STATE_STORE_NAME", "orders-state"),
            ("RECEIPT_BINDING_NAME", "receipts"),
            ("CORS_ALLOWED_ORIGINS", "https://a.example, ,https://b.example"),
            ("DAPR_HTTP_PORT", "3600"),
        ]))
        .unwrap();
        assert_eq!(config.port, 9090);
        assert_eq!(config.state_store, "orders-state");
        assert_eq!(config.receipt_binding, "receipts");
        assert_eq!(config.pubsub, "pubsub");
        assert_eq!(config.allowed_origins, vec!["https://a.example", "https://b.example"]);
        assert_eq!(config.sidecar.endpoint, "http://127.0.0.1:3600");
    }

    #[test]
    fn malformed_port_is_reported() {
        let err = OrderServiceConfig::from_lookup(vars(&[("PORT", "eighty")])).unwrap_err();
        assert!(err.to_string().contains("PORT"));
    }

    #[test]
    fn malformed_sidecar_settings_are_reported() {
        let cases: [&'static [(&'static str, &'static str)]; 2] =
            [&[("DAPR_HTTP_PORT", "35OO")], &[("SIDECAR_TIMEOUT_SECS", "soon")]];
        for pairs in cases {
            let err = OrderServiceConfig::from_lookup(vars(pairs)).unwrap_err();
            let chain = format!("{err:#}");
            assert!(chain.contains("sidecar"), "{chain}");
            assert!(chain.contains(pairs[0].0), "{chain}");
        }
    }
}
