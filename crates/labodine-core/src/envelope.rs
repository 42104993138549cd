//! # Result Envelope
//!
//! Every backend response is validated into an [`ApiEnvelope`] at the
//! boundary, so page code never pokes at `res.data.success` by hand.
//!
//! ## Accepted Shapes
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  { "ok": true,  "data": T }            → ApiEnvelope::Ok(T)             │
//! │  { "ok": false, "message": "..." }     → ApiEnvelope::Err(message)      │
//! │                                                                         │
//! │  legacy                                                                 │
//! │  { "success": true,  "data": T }       → ApiEnvelope::Ok(T)             │
//! │  { "success": false, "message": "..." }→ ApiEnvelope::Err(message)      │
//! │  [ ... ] / { no ok, no success }       → ApiEnvelope::Ok(whole body)    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Serialization always emits the `ok` form.

use serde::de::{self, DeserializeOwned, Deserializer};
use serde::ser::{SerializeStruct, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Message used when a rejection carries none.
pub const DEFAULT_REJECTION_MESSAGE: &str = "Request failed";

/// A body that could not be read as an envelope at all.
#[derive(Debug, Error)]
pub enum EnvelopeError {
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Envelope flag `{field}` must be a boolean")]
    InvalidFlag { field: &'static str },
}

/// Typed outcome of a backend call.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiEnvelope<T> {
    Ok(T),
    Err(String),
}

impl<T> ApiEnvelope<T> {
    pub fn ok(data: T) -> Self {
        ApiEnvelope::Ok(data)
    }

    pub fn err(message: impl Into<String>) -> Self {
        ApiEnvelope::Err(message.into())
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, ApiEnvelope::Ok(_))
    }

    /// Converts into a `Result` carrying the rejection message.
    pub fn into_result(self) -> Result<T, String> {
        match self {
            ApiEnvelope::Ok(data) => Ok(data),
            ApiEnvelope::Err(message) => Err(message),
        }
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> ApiEnvelope<U> {
        match self {
            ApiEnvelope::Ok(data) => ApiEnvelope::Ok(f(data)),
            ApiEnvelope::Err(message) => ApiEnvelope::Err(message),
        }
    }
}

impl<T: DeserializeOwned> ApiEnvelope<T> {
    /// Validates an already-parsed JSON body.
    pub fn from_value(value: Value) -> Result<Self, EnvelopeError> {
        let Value::Object(mut map) = value else {
            return Ok(ApiEnvelope::Ok(serde_json::from_value(value)?));
        };

        let (field, flag) = match (map.remove("ok"), map.remove("success")) {
            (Some(flag), _) => ("ok", flag),
            (None, Some(flag)) => ("success", flag),
            (None, None) => {
                return Ok(ApiEnvelope::Ok(serde_json::from_value(Value::Object(map))?));
            }
        };

        match flag {
            Value::Bool(true) => {
                let data = map.remove("data").unwrap_or(Value::Null);
                Ok(ApiEnvelope::Ok(serde_json::from_value(data)?))
            }
            Value::Bool(false) => {
                let message = match map.remove("message") {
                    Some(Value::String(m)) if !m.trim().is_empty() => m,
                    _ => DEFAULT_REJECTION_MESSAGE.to_string(),
                };
                Ok(ApiEnvelope::Err(message))
            }
            _ => Err(EnvelopeError::InvalidFlag { field }),
        }
    }

    /// Parses and validates a raw response body.
    pub fn decode(body: &str) -> Result<Self, EnvelopeError> {
        let value: Value = serde_json::from_str(body)?;
        Self::from_value(value)
    }
}

impl<T: Serialize> Serialize for ApiEnvelope<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ApiEnvelope", 2)?;
        match self {
            ApiEnvelope::Ok(data) => {
                state.serialize_field("ok", &true)?;
                state.serialize_field("data", data)?;
            }
            ApiEnvelope::Err(message) => {
                state.serialize_field("ok", &false)?;
                state.serialize_field("message", message)?;
            }
        }
        state.end()
    }
}

impl<'de, T: DeserializeOwned> Deserialize<'de> for ApiEnvelope<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        ApiEnvelope::from_value(value).map_err(de::Error::custom)
    }
}
