use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use common_observability::ServiceMetrics;
use common_sidecar::InMemorySidecar;
use inventory_service::{build_router, AppState, Subscription};
use serde_json::{json, Value};
use tower::ServiceExt; // for oneshot

fn app(sidecar: Arc<InMemorySidecar>, subscription: Subscription) -> axum::Router {
    build_router(AppState {
        sidecar,
        metrics: Arc::new(ServiceMetrics::new("inventory-service").expect("metrics")),
        subscription: Arc::new(subscription),
    })
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().method("GET").uri(uri).body(Body::empty()).unwrap()
}

async fn json_body(resp: axum::response::Response) -> Value {
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn ready_when_sidecar_reachable() {
    let router = app(Arc::new(InMemorySidecar::new()), Subscription::default());
    let resp = router.oneshot(get("/healthz")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(json_body(resp).await, json!({"status": "ready"}));
}

#[tokio::test]
async fn unavailable_when_sidecar_unreachable() {
    let sidecar = Arc::new(InMemorySidecar::new());
    sidecar.fail_metadata(true);
    let resp = app(sidecar, Subscription::default()).oneshot(get("/healthz")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(resp.headers().get("X-Error-Code").unwrap(), "dependency_unavailable");
}

#[tokio::test]
async fn advertises_orders_subscription() {
    let router = app(Arc::new(InMemorySidecar::new()), Subscription::default());
    let resp = router.oneshot(get("/dapr/subscribe")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        json_body(resp).await,
        json!([{"pubsubname": "pubsub", "topic": "orders", "route": "/orders"}])
    );
}

#[tokio::test]
async fn custom_route_receives_deliveries() {
    let subscription = Subscription {
        pubsub: "orders-bus".into(),
        topic: "orders.v2".into(),
        route: "/events/orders".into(),
    };
    let router = app(Arc::new(InMemorySidecar::new()), subscription);

    let resp = router.clone().oneshot(get("/dapr/subscribe")).await.unwrap();
    assert_eq!(json_body(resp).await[0]["route"], "/events/orders");

    let req = Request::builder()
        .method("POST")
        .uri("/events/orders")
        .body(Body::from(r#"{"orderId":"o9","amount":9}"#))
        .unwrap();
    let resp = router.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(json_body(resp).await, json!({"status": "SUCCESS"}));
}
