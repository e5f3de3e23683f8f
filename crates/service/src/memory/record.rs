use serde::{Deserialize, Serialize};

use crate::errors::ServiceError;

/// A single key/value entry of the memory store.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct MemoryRecord {
    pub key: String,
    pub value: String,
}

impl MemoryRecord {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self { key: key.into(), value: value.into() }
    }
}

/// Keys must contain at least one non-whitespace character. Values may be empty.
pub fn validate_key(key: &str) -> Result<(), ServiceError> {
    if key.trim().is_empty() {
        return Err(ServiceError::Validation("key must be a non-empty string".into()));
    }
    Ok(())
}
