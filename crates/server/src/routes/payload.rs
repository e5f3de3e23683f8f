//! Request field extraction shared by the memory and chat handlers.
//!
//! Mutating routes take their fields from a JSON object body; when the body is
//! empty they fall back to query parameters.

use axum::body::Bytes;
use serde_json::{Map, Value};

use crate::errors::ApiError;

pub struct Payload {
    body: Option<Map<String, Value>>,
}

impl Payload {
    pub fn parse(body: &Bytes) -> Result<Self, ApiError> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self { body: None });
        }
        match serde_json::from_slice::<Value>(body) {
            Ok(Value::Object(map)) => Ok(Self { body: Some(map) }),
            Ok(_) => Err(ApiError::bad_request("request body must be a JSON object")),
            Err(e) => Err(ApiError::bad_request(format!("invalid JSON body: {e}"))),
        }
    }

    /// A required string field. `null` counts as missing; other types are rejected.
    /// `from_query` is only consulted when the request had no body.
    pub fn string(&self, name: &str, from_query: Option<String>) -> Result<String, ApiError> {
        match &self.body {
            Some(map) => match map.get(name) {
                Some(Value::String(s)) => Ok(s.clone()),
                None | Some(Value::Null) => Err(ApiError::bad_request(format!("{name} is required"))),
                Some(_) => Err(ApiError::bad_request(format!("{name} must be a string"))),
            },
            None => from_query.ok_or_else(|| ApiError::bad_request(format!("{name} is required"))),
        }
    }
}
