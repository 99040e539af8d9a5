//! Standard JSON response envelope.
//!
//! Every JSON response carries the same shape:
//! `{ok, status_code, message?, error?, errors?, data?, meta?}` with absent
//! optional fields omitted entirely, never emitted as null.

use serde::Serialize;
use serde_json::Value;

use crate::http::response::{Response, ResponseBuilder, StatusCode};

#[derive(Debug, Serialize)]
pub struct ApiEnvelope {
    pub ok: bool,
    pub status_code: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<Value>,
}

impl ApiEnvelope {
    /// Successful response carrying data.
    pub fn success(status_code: u16, data: Value) -> Self {
        Self {
            ok: true,
            status_code,
            message: None,
            error: None,
            errors: None,
            data: Some(data),
            meta: None,
        }
    }

    /// Error response with an error string and a short message.
    pub fn error(status_code: u16, error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            ok: false,
            status_code,
            message: Some(message.into()),
            error: Some(error.into()),
            errors: None,
            data: None,
            meta: None,
        }
    }

    pub fn not_found(target: &str) -> Self {
        Self {
            ok: false,
            status_code: 404,
            message: Some("Resource not found".to_string()),
            error: Some(format!(
                "The requested resource '{}' was not found.",
                target
            )),
            errors: None,
            data: None,
            meta: None,
        }
    }

    /// Internal server error with a generic client-facing message; the
    /// underlying detail rides in `errors` and must never contain secrets.
    pub fn internal_error(detail: impl Into<String>) -> Self {
        Self {
            ok: false,
            status_code: 500,
            message: Some("Internal Server Error".to_string()),
            error: Some("An unexpected error occurred.".to_string()),
            errors: Some(Value::String(detail.into())),
            data: None,
            meta: None,
        }
    }

    /// Builds the HTTP response for this envelope.
    pub fn into_response(self, status: StatusCode, keep_alive: bool) -> Response {
        let body = serde_json::to_vec(&self).unwrap_or_else(|_| b"{}".to_vec());
        ResponseBuilder::new(status)
            .header("Content-Type", "application/json")
            .body(body)
            .keep_alive(keep_alive)
            .build()
    }
}
