use axum::{
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use uuid::Uuid;

pub const ERROR_CODE_HEADER: &str = "X-Error-Code";

#[derive(Serialize, Debug)]
pub struct ErrorBody {
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug)]
pub enum ApiError {
    BadRequest {
        code: &'static str,
        trace_id: Option<Uuid>,
        message: Option<String>,
    },
    NotFound { code: &'static str, trace_id: Option<Uuid> },
    Internal {
        code: &'static str,
        trace_id: Option<Uuid>,
        message: Option<String>,
    },
    ServiceUnavailable { code: &'static str, trace_id: Option<Uuid> },
}

impl ApiError {
    pub fn bad_request(code: &'static str, message: impl Into<String>) -> Self {
        Self::BadRequest { code, trace_id: None, message: Some(message.into()) }
    }

    /// Server-side failure correlated with a log line by `trace_id`.
    pub fn internal(code: &'static str, trace_id: Uuid, message: impl Into<String>) -> Self {
        Self::Internal { code, trace_id: Some(trace_id), message: Some(message.into()) }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::ServiceUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (body, error_code) = match self {
            ApiError::BadRequest { code, trace_id, message } => {
                (ErrorBody { code: code.into(), trace_id, message }, code)
            }
            ApiError::NotFound { code, trace_id } => {
                (ErrorBody { code: code.into(), trace_id, message: None }, code)
            }
            ApiError::Internal { code, trace_id, message } => {
                (ErrorBody { code: code.into(), trace_id, message }, code)
            }
            ApiError::ServiceUnavailable { code, trace_id } => {
                (ErrorBody { code: code.into(), trace_id, message: None }, code)
            }
        };
        let mut resp = (status, Json(body)).into_response();
        if let Ok(val) = HeaderValue::from_str(error_code) {
            resp.headers_mut().insert(ERROR_CODE_HEADER, val);
        }
        resp
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
