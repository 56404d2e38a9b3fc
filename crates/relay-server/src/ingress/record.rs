//! Decoded request records.
//!
//! Bodies are parsed as JSON regardless of the declared content type. Every
//! field is text: a field that is missing, `null`, or not a string decodes
//! to `""`. Only a body that is not a JSON object is rejected.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use relay_core::{MessageId, MessageStatus};
use serde_json::{Map, Value};
use thiserror::Error;

/// Errors raised while turning a request body into a record.
#[derive(Debug, Error)]
pub enum IngressError {
    /// The body is not a JSON object.
    #[error("malformed request body: {0}")]
    MalformedBody(String),
}

impl IntoResponse for IngressError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({ "error": self.to_string() });
        (StatusCode::BAD_REQUEST, Json(body)).into_response()
    }
}

/// Result alias for ingress decoding.
pub type Result<T> = std::result::Result<T, IngressError>;

/// A `send` request: who posted what.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SendRecord {
    /// Author display name.
    pub user: String,
    /// Message text.
    pub content: String,
}

impl SendRecord {
    /// Decode from a raw request body.
    pub fn from_slice(body: &[u8]) -> Result<Self> {
        let fields = object(body)?;
        Ok(Self {
            user: text(&fields, "user"),
            content: text(&fields, "content"),
        })
    }
}

/// A `status` request exactly as received: all text, nothing validated.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StatusRecord {
    /// Target message id.
    pub id: String,
    /// Status name.
    pub status: String,
    /// User reporting the status.
    pub by_user: String,
}

impl StatusRecord {
    /// Decode from a raw request body.
    pub fn from_slice(body: &[u8]) -> Result<Self> {
        let fields = object(body)?;
        Ok(Self {
            id: text(&fields, "id"),
            status: text(&fields, "status"),
            by_user: text(&fields, "byUser"),
        })
    }
}

/// A status record ready for the store and the broadcaster.
///
/// Status text that names a known status is normalized to its wire form;
/// anything else, the empty string included, is kept verbatim and only
/// broadcast.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatusUpdate {
    /// Target message id; need not exist.
    pub message_id: MessageId,
    /// Parsed status, if the text named one.
    pub status: Option<MessageStatus>,
    /// Status text as broadcast.
    pub status_text: String,
    /// User reporting the status.
    pub by_user: String,
}

impl From<StatusRecord> for StatusUpdate {
    fn from(record: StatusRecord) -> Self {
        let status = record.status.parse::<MessageStatus>().ok();
        let status_text = match status {
            Some(parsed) => parsed.as_str().to_owned(),
            None => record.status,
        };
        Self {
            message_id: MessageId::from(record.id),
            status,
            status_text,
            by_user: record.by_user,
        }
    }
}

fn object(body: &[u8]) -> Result<Map<String, Value>> {
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(IngressError::MalformedBody(format!(
            "expected a JSON object, got {}",
            kind_of(&other)
        ))),
        Err(e) => Err(IngressError::MalformedBody(e.to_string())),
    }
}

fn text(fields: &Map<String, Value>, key: &str) -> String {
    match fields.get(key) {
        Some(Value::String(s)) => s.clone(),
        _ => String::new(),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
