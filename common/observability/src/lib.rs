use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::Response,
};
use prometheus::{Encoder, IntCounterVec, Opts, Registry, TextEncoder};

/// Per-service prometheus registry shared by the order and inventory services.
#[derive(Clone)]
pub struct ServiceMetrics {
    pub service: &'static str,
    pub registry: Registry,
    pub http_errors_total: IntCounterVec,
    pub side_effect_failures: IntCounterVec,
    pub events_total: IntCounterVec,
}

impl ServiceMetrics {
    pub fn new(service: &'static str) -> Result<Self, prometheus::Error> {
        let registry = Registry::new();
        let http_errors_total = IntCounterVec::new(
            Opts::new("http_errors_total", "Count of HTTP error responses emitted (status >= 400)"),
            &["service", "code", "status"],
        )?;
        let side_effect_failures = IntCounterVec::new(
            Opts::new(
                "order_side_effect_failures_total",
                "Order side effects (publish, receipt) that failed after the order was saved",
            ),
            &["leg"],
        )?;
        let events_total = IntCounterVec::new(
            Opts::new("orders_events_total", "Order events delivered to this service, by outcome"),
            &["outcome"],
        )?;
        registry.register(Box::new(http_errors_total.clone()))?;
        registry.register(Box::new(side_effect_failures.clone()))?;
        registry.register(Box::new(events_total.clone()))?;
        Ok(Self { service, registry, http_errors_total, side_effect_failures, events_total })
    }

    pub fn record_side_effect_failure(&self, leg: &str) {
        self.side_effect_failures.with_label_values(&[leg]).inc();
    }

    pub fn record_event(&self, outcome: &str) {
        self.events_total.with_label_values(&[outcome]).inc();
    }

    /// Text exposition for the `/metrics` route.
    pub fn render(&self) -> (StatusCode, String) {
        let encoder = TextEncoder::new();
        let families = self.registry.gather();
        let mut buf = Vec::new();
        if let Err(e) = encoder.encode(&families, &mut buf) {
            tracing::error!(error = %e, "metrics encode error");
            return (StatusCode::INTERNAL_SERVER_ERROR, format!("metrics encode error: {e}"));
        }
        (StatusCode::OK, String::from_utf8_lossy(&buf).to_string())
    }
}

/// Counts error responses by the `X-Error-Code` header the handlers attach.
/// Mount with `middleware::from_fn_with_state(metrics, error_metrics_mw)`.
pub async fn error_metrics_mw(
    State(metrics): State<Arc<ServiceMetrics>>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let resp = next.run(req).await;
    let status = resp.status();
    if status.as_u16() >= 400 {
        let code = resp
            .headers()
            .get("x-error-code")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("unknown");
        metrics
            .http_errors_total
            .with_label_values(&[metrics.service, code, status.as_str()])
            .inc();
    }
    resp
}
