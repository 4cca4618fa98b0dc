use common_http_errors::ApiError;
use axum::response::IntoResponse;
use axum::body::to_bytes;
use axum::http::StatusCode;
use uuid::Uuid;

#[test]
fn bad_request_variant() {
    let err = ApiError::BadRequest { code: "invalid_payload", trace_id: None, message: None };
    let resp = err.into_response();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(resp.headers().get("X-Error-Code").unwrap(), "invalid_payload");
}

#[test]
fn not_found_variant() {
    let err = ApiError::NotFound { code: "order_not_found", trace_id: None };
    let resp = err.into_response();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(resp.headers().get("X-Error-Code").unwrap(), "order_not_found");
}

#[test]
fn internal_variant() {
    let trace = Some(Uuid::new_v4());
    let err = ApiError::Internal {
        code: "persistence_error",
        trace_id: trace,
        message: Some("boom".into()),
    };
    let resp = err.into_response();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(resp.headers().get("X-Error-Code").unwrap(), "persistence_error");
}

#[tokio::test]
async fn helpers_fill_message_and_trace() {
    let resp = ApiError::bad_request("invalid_amount", "amount must be positive").into_response();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let bytes = to_bytes(resp.into_body(), 1024).await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(
        body,
        serde_json::json!({"code": "invalid_amount", "message": "amount must be positive"})
    );

    let trace = Uuid::new_v4();
    let resp =
        ApiError::internal("persistence_error", trace, "failed to save order").into_response();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(resp.headers().get("X-Error-Code").unwrap(), "persistence_error");
    let bytes = to_bytes(resp.into_body(), 1024).await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["trace_id"], trace.to_string());
}

#[test]
fn service_unavailable_variant() {
    let err = ApiError::ServiceUnavailable { code: "dependency_unavailable", trace_id: None };
    let resp = err.into_response();
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(resp.headers().get("X-Error-Code").unwrap(), "dependency_unavailable");
}

#[tokio::test]
async fn body_shape_omits_empty_fields() {
    let resp = ApiError::NotFound { code: "order_not_found", trace_id: None }.into_response();
    let bytes = to_bytes(resp.into_body(), 1024).await.unwrap();
    let body = String::from_utf8(bytes.to_vec()).unwrap();
    assert_eq!(body, r#"{"code":"order_not_found"}"#);
}

#[tokio::test]
async fn body_shape_carries_trace_and_message() {
    let trace = Uuid::new_v4();
    let err = ApiError::Internal {
        code: "lookup_error",
        trace_id: Some(trace),
        message: Some("state store down".into()),
    };
    let bytes = to_bytes(err.into_response().into_body(), 1024).await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["code"], "lookup_error");
    assert_eq!(body["trace_id"], trace.to_string());
    assert_eq!(body["message"], "state store down");
}
