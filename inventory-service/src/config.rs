use std::env;
use std::net::SocketAddr;

use anyhow::{bail, Context, Result};
use common_sidecar::SidecarClientConfig;
use serde::Serialize;

/// Programmatic subscription advertised on `/dapr/subscribe`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Subscription {
    #[serde(rename = "pubsubname")]
    pub pubsub: String,
    pub topic: String,
    pub route: String,
}

impl Default for Subscription {
    fn default() -> Self {
        Self { pubsub: "pubsub".into(), topic: "orders".into(), route: "/orders".into() }
    }
}

#[derive(Debug, Clone)]
pub struct InventoryServiceConfig {
    pub host: String,
    pub port: u16,
    pub sidecar: SidecarClientConfig,
    pub subscription: Subscription,
}

impl Default for InventoryServiceConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 8081,
            sidecar: SidecarClientConfig::new("http://127.0.0.1:3500"),
            subscription: Subscription::default(),
        }
    }
}

impl InventoryServiceConfig {
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
        let route = lookup("ORDERS_ROUTE").unwrap_or(defaults.subscription.route);
        if !route.starts_with('/') {
            bail!("ORDERS_ROUTE must start with '/', got {route:?}");
        }
        let subscription = Subscription {
            pubsub: lookup("PUBSUB_NAME").unwrap_or(defaults.subscription.pubsub),
            topic: lookup("ORDERS_TOPIC").unwrap_or(defaults.subscription.topic),
            route,
        };
        let sidecar = SidecarClientConfig::from_lookup(&lookup)
            .context("failed to read sidecar settings")?;
        Ok(Self {
            host: lookup("HOST").unwrap_or(defaults.host),
            port,
            sidecar,
            subscription,
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

    fn vars(pairs: &'static [(&'static str, &'static str)]) -> impl Fn(&str) -> Option<String> {
        move |key: &str| pairs.iter().find(|(k, _)| *k == key).map(|(_, v)| v.to_string())
    }

    #[test]
    fn defaults_subscribe_to_orders_topic() {
        let config = InventoryServiceConfig::from_lookup(vars(&[])).unwrap();
        assert_eq!(config.subscription, Subscription::default());
        assert_eq!(config.bind_addr().unwrap().to_string(), "0.0.0.0:8081");
        assert_eq!(config.sidecar.endpoint, "http://127.0.0.1:3500");
    }

    #[test]
    fn subscription_overrides_are_read() {
        let config = InventoryServiceConfig::from_lookup(vars(&[
            ("PUBSUB_NAME", "redis-pubsub"),
            ("ORDERS_TOPIC", "orders-v2"),
            ("ORDERS_ROUTE", "/events/orders"),
        ]))
        .unwrap();
        assert_eq!(config.subscription.pubsub, "redis-pubsub");
        assert_eq!(config.subscription.topic, "orders-v2");
        assert_eq!(config.subscription.route, "/events/orders");
    }

    #[test]
    fn relative_route_is_rejected() {
        let err =
            InventoryServiceConfig::from_lookup(vars(&[("ORDERS_ROUTE", "orders")])).unwrap_err();
        assert!(err.to_string().contains("ORDERS_ROUTE"));
    }

    #[test]
    fn malformed_values_are_reported() {
        let err = InventoryServiceConfig::from_lookup(vars(&[("PORT", "80a")])).unwrap_err();
        assert!(err.to_string().contains("PORT"));

        let err =
            InventoryServiceConfig::from_lookup(vars(&[("DAPR_HTTP_PORT", "35OO")])).unwrap_err();
        assert!(format!("{err:#}").contains("DAPR_HTTP_PORT"));
    }
}
