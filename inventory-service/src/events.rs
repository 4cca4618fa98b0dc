//! Normalisation of order-created deliveries.
//!
//! The sidecar wraps published payloads in a CloudEvent envelope, but the
//! `data` member does not arrive in one shape: JSON content comes through as
//! an already-structured object, text content as a string holding the encoded
//! payload, binary content as `data_base64`, and raw-payload subscriptions
//! skip the envelope altogether. Everything is folded into [`EventData`] at the
//! boundary and turned into an [`Order`] by the single [`decode_order`] step.

use base64::{engine::general_purpose::STANDARD, Engine};
use common_orders::Order;
use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq)]
pub enum EventData {
    /// Encoded payload bytes that still need JSON decoding.
    Raw(Vec<u8>),
    /// Payload the sidecar already decoded into a JSON object.
    Structured(Map<String, Value>),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("data_base64 is not valid base64: {0}")]
    Base64(String),
    #[error("unsupported event data type: {0}")]
    UnsupportedData(&'static str),
    #[error("failed to decode order from raw bytes: {0}")]
    Raw(String),
    #[error("failed to decode order from structured data: {0}")]
    Structured(String),
}

/// A delivery with its envelope stripped.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderDelivery {
    pub event_id: Option<String>,
    pub data: EventData,
}

impl OrderDelivery {
    /// Splits a delivery request body into envelope id and payload.
    pub fn from_body(body: &[u8]) -> Result<Self, DecodeError> {
        let Ok(Value::Object(envelope)) = serde_json::from_slice::<Value>(body) else {
            return Ok(Self { event_id: None, data: EventData::Raw(body.to_vec()) });
        };
        if !envelope.contains_key("specversion") {
            // Raw-payload subscription: the body is the published payload itself.
            return Ok(Self { event_id: None, data: EventData::Raw(body.to_vec()) });
        }

        let event_id = envelope.get("id").and_then(Value::as_str).map(str::to_string);
        let data = match (envelope.get("data_base64"), envelope.get("data")) {
            (Some(Value::String(encoded)), _) => {
                let bytes = STANDARD
                    .decode(encoded)
                    .map_err(|e| DecodeError::Base64(e.to_string()))?;
                EventData::Raw(bytes)
            }
            (_, Some(Value::Object(map))) => EventData::Structured(map.clone()),
            (_, Some(Value::String(text))) => EventData::Raw(text.as_bytes().to_vec()),
            (_, Some(other)) => return Err(DecodeError::UnsupportedData(json_type(other))),
            (_, None) => return Err(DecodeError::UnsupportedData("missing")),
        };
        Ok(Self { event_id, data })
    }
}

pub fn decode_order(data: EventData) -> Result<Order, DecodeError> {
    match data {
        EventData::Raw(bytes) => {
            serde_json::from_slice(&bytes).map_err(|e| DecodeError::Raw(e.to_string()))
        }
        EventData::Structured(map) => serde_json::from_value(Value::Object(map))
            .map_err(|e| DecodeError::Structured(e.to_string())),
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
