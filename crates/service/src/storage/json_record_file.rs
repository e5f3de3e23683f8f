use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tokio::fs;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::memory::MemoryRecord;

/// JSON document holding memory records.
///
/// Reads accept either an object (`key -> value`) or an array of
/// `{key, value}` objects; writes always produce the array form so that
/// record order survives a round trip.
#[derive(Clone, Debug)]
pub struct JsonRecordFile {
    path: PathBuf,
}

impl JsonRecordFile {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load and normalize the records.
    ///
    /// A missing file is created empty. Content that is not valid JSON is
    /// logged and replaced by an empty document; it never surfaces as an error.
    pub async fn load(&self) -> Result<Vec<MemoryRecord>, ServiceError> {
        let bytes = match fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "memory file missing; initializing empty");
                self.save(&[]).await?;
                return Ok(Vec::new());
            }
            Err(e) => {
                return Err(ServiceError::Storage(format!("read {}: {e}", self.path.display())));
            }
        };

        match serde_json::from_slice::<Value>(&bytes) {
            Ok(raw) => Ok(normalize(raw)),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "memory file is not valid JSON; resetting to empty");
                self.save(&[]).await?;
                Ok(Vec::new())
            }
        }
    }

    /// Overwrite the document with `records` via a sibling temp file and rename.
    pub async fn save(&self, records: &[MemoryRecord]) -> Result<(), ServiceError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }

        let data = serde_json::to_vec_pretty(records)?;
        let file_name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "memory.json".to_string());
        let tmp = self.path.with_file_name(format!(".{}.{}.tmp", file_name, Uuid::new_v4()));

        if let Err(e) = fs::write(&tmp, data).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(ServiceError::Storage(format!("write {}: {e}", tmp.display())));
        }
        if let Err(e) = fs::rename(&tmp, &self.path).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(ServiceError::Storage(format!("replace {}: {e}", self.path.display())));
        }
        Ok(())
    }
}

/// Convert any JSON shape into the canonical record sequence.
///
/// Entries without a usable key or value are dropped, as are repeated keys
/// after their first occurrence.
pub fn normalize(raw: Value) -> Vec<MemoryRecord> {
    let candidates: Vec<(Option<String>, Option<String>)> = match raw {
        Value::Object(map) => map.into_iter().map(|(k, v)| (Some(k), coerce(&v))).collect(),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Object(obj) => (obj.get("key").and_then(coerce), obj.get("value").and_then(coerce)),
                _ => (None, None),
            })
            .collect(),
        _ => Vec::new(),
    };

    let mut seen: HashSet<String> = HashSet::with_capacity(candidates.len());
    let mut records: Vec<MemoryRecord> = Vec::with_capacity(candidates.len());
    for (key, value) in candidates {
        let (Some(key), Some(value)) = (key, value) else { continue };
        if key.trim().is_empty() || !seen.insert(key.clone()) {
            continue;
        }
        records.push(MemoryRecord { key, value });
    }
    records
}

fn coerce(v: &Value) -> Option<String> {
    match v {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        other => serde_json::to_string(other).ok(),
    }
}
