use crate::errors::ServiceError;
use crate::memory::MemoryRecord;
use async_trait::async_trait;

/// Trait abstraction for the key/value memory store.
/// Implementations keep at most one record per key.
#[async_trait]
pub trait MemoryStore: Send + Sync {
    /// All records in storage order.
    async fn list(&self) -> Result<Vec<MemoryRecord>, ServiceError>;
    /// `NotFound` when the key is absent.
    async fn get(&self, key: &str) -> Result<MemoryRecord, ServiceError>;
    /// Insert or replace the value for `key`, returning the stored record.
    async fn upsert(&self, key: String, value: String) -> Result<MemoryRecord, ServiceError>;
    /// Remove `key`, returning the removed record, or `NotFound`.
    async fn delete(&self, key: &str) -> Result<MemoryRecord, ServiceError>;
}
