use std::{path::PathBuf, sync::Arc};
use tokio::sync::RwLock;
use tracing::info;

use crate::errors::ServiceError;
use crate::memory::{record::validate_key, MemoryRecord, MemoryStore};
use crate::storage::json_record_file::JsonRecordFile;

/// File-backed memory store.
///
/// Every operation re-reads the JSON file, so edits made to it while the
/// server runs are picked up. Mutations hold the write guard across the whole
/// load-mutate-save cycle; concurrent requests in this process never lose an update.
pub struct FileMemoryStore {
    file: JsonRecordFile,
    lock: RwLock<()>,
}

impl FileMemoryStore {
    /// Initialize the store from a path. Creates the file with an empty list if missing.
    pub async fn new<P: Into<PathBuf>>(path: P) -> Result<Arc<Self>, ServiceError> {
        let file = JsonRecordFile::new(path);
        let records = file.load().await?;
        info!(path = %file.path().display(), records = records.len(), "memory store ready");
        Ok(Arc::new(Self { file, lock: RwLock::new(()) }))
    }

    pub async fn list(&self) -> Result<Vec<MemoryRecord>, ServiceError> {
        let _guard = self.lock.read().await;
        self.file.load().await
    }

    pub async fn get(&self, key: &str) -> Result<MemoryRecord, ServiceError> {
        validate_key(key)?;
        let _guard = self.lock.read().await;
        self.file
            .load()
            .await?
            .into_iter()
            .find(|r| r.key == key)
            .ok_or_else(|| ServiceError::not_found(key))
    }

    pub async fn upsert(&self, key: String, value: String) -> Result<MemoryRecord, ServiceError> {
        validate_key(&key)?;
        let _guard = self.lock.write().await;
        let mut records = self.file.load().await?;
        let created = match records.iter_mut().find(|r| r.key == key) {
            Some(existing) => {
                existing.value = value.clone();
                false
            }
            None => {
                records.push(MemoryRecord::new(key.clone(), value.clone()));
                true
            }
        };
        self.file.save(&records).await?;
        info!(key = %key, created, "memory upsert");
        Ok(MemoryRecord { key, value })
    }

    pub async fn delete(&self, key: &str) -> Result<MemoryRecord, ServiceError> {
        validate_key(key)?;
        let _guard = self.lock.write().await;
        let mut records = self.file.load().await?;
        let removed = records
            .iter()
            .find(|r| r.key == key)
            .cloned()
            .ok_or_else(|| ServiceError::not_found(key))?;
        records.retain(|r| r.key != key);
        self.file.save(&records).await?;
        info!(key = %key, "memory delete");
        Ok(removed)
    }
}

#[async_trait::async_trait]
impl MemoryStore for FileMemoryStore {
    async fn list(&self) -> Result<Vec<MemoryRecord>, ServiceError> { self.list().await }
    async fn get(&self, key: &str) -> Result<MemoryRecord, ServiceError> { self.get(key).await }
    async fn upsert(&self, key: String, value: String) -> Result<MemoryRecord, ServiceError> { self.upsert(key, value).await }
    async fn delete(&self, key: &str) -> Result<MemoryRecord, ServiceError> { self.delete(key).await }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn tmp_file() -> PathBuf {
        std::env::temp_dir().join(format!("svc_memory_{}.json", Uuid::new_v4()))
    }

    #[tokio::test]
    async fn memory_store_basic_crud() -> Result<(), anyhow::Error> {
        let tmp = tmp_file();
        let store = FileMemoryStore::new(&tmp).await?;

        // initially empty
        assert!(store.list().await?.is_empty());

        store.upsert("name".into(), "Noah".into()).await?;
        assert_eq!(store.list().await?, vec![MemoryRecord::new("name", "Noah")]);
        assert_eq!(store.get("name").await?, MemoryRecord::new("name", "Noah"));

        let removed = store.delete("name").await?;
        assert_eq!(removed.value, "Noah");
        assert!(store.list().await?.is_empty());
        assert!(matches!(store.get("name").await, Err(ServiceError::NotFound(_))));

        let _ = tokio::fs::remove_file(&tmp).await;
        Ok(())
    }

    #[tokio::test]
    async fn upsert_replaces_in_place_and_is_idempotent() -> Result<(), anyhow::Error> {
        let tmp = tmp_file();
        let store = FileMemoryStore::new(&tmp).await?;

        store.upsert("k".into(), "a".into()).await?;
        store.upsert("other".into(), "x".into()).await?;
        store.upsert("k".into(), "b".into()).await?;
        let once = store.list().await?;
        store.upsert("k".into(), "b".into()).await?;
        let twice = store.list().await?;

        assert_eq!(once, twice);
        assert_eq!(once, vec![MemoryRecord::new("k", "b"), MemoryRecord::new("other", "x")]);
        assert_eq!(store.get("k").await?.value, "b");

        let _ = tokio::fs::remove_file(&tmp).await;
        Ok(())
    }

    #[tokio::test]
    async fn delete_keeps_remaining_order() -> Result<(), anyhow::Error> {
        let tmp = tmp_file();
        let store = FileMemoryStore::new(&tmp).await?;
        for k in ["a", "b", "c"] {
            store.upsert(k.into(), k.to_uppercase()).await?;
        }
        store.delete("b").await?;
        let keys: Vec<String> = store.list().await?.into_iter().map(|r| r.key).collect();
        assert_eq!(keys, vec!["a", "c"]);

        let _ = tokio::fs::remove_file(&tmp).await;
        Ok(())
    }

    #[tokio::test]
    async fn delete_missing_key_leaves_file_untouched() -> Result<(), anyhow::Error> {
        let tmp = tmp_file();
        let store = FileMemoryStore::new(&tmp).await?;
        store.upsert("a".into(), "1".into()).await?;
        let before = tokio::fs::read(&tmp).await?;

        assert!(matches!(store.delete("missing").await, Err(ServiceError::NotFound(_))));
        assert_eq!(tokio::fs::read(&tmp).await?, before);

        let _ = tokio::fs::remove_file(&tmp).await;
        Ok(())
    }

    #[tokio::test]
    async fn empty_value_allowed_empty_key_rejected() -> Result<(), anyhow::Error> {
        let tmp = tmp_file();
        let store = FileMemoryStore::new(&tmp).await?;
        store.upsert("blank".into(), String::new()).await?;
        assert_eq!(store.get("blank").await?.value, "");
        assert!(matches!(store.upsert(" ".into(), "v".into()).await, Err(ServiceError::Validation(_))));

        let _ = tokio::fs::remove_file(&tmp).await;
        Ok(())
    }

    #[tokio::test]
    async fn reads_legacy_object_form_and_rewrites_as_array() -> Result<(), anyhow::Error> {
        let tmp = tmp_file();
        tokio::fs::write(&tmp, br#"{"name": "Noah", "lang": "he"}"#).await?;
        let store = FileMemoryStore::new(&tmp).await?;
        assert_eq!(store.list().await?.len(), 2);

        store.upsert("lang".into(), "en".into()).await?;
        let raw: serde_json::Value = serde_json::from_slice(&tokio::fs::read(&tmp).await?)?;
        assert_eq!(
            raw,
            serde_json::json!([{"key": "name", "value": "Noah"}, {"key": "lang", "value": "en"}])
        );

        let _ = tokio::fs::remove_file(&tmp).await;
        Ok(())
    }

    #[tokio::test]
    async fn concurrent_upserts_do_not_lose_writes() -> Result<(), anyhow::Error> {
        let tmp = tmp_file();
        let store = FileMemoryStore::new(&tmp).await?;

        let mut handles = Vec::new();
        for i in 0..16 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store.upsert(format!("k{i}"), i.to_string()).await
            }));
        }
        for h in handles {
            h.await??;
        }

        // reload through a fresh instance to read what hit the disk
        let reloaded = FileMemoryStore::new(&tmp).await?;
        assert_eq!(reloaded.list().await?.len(), 16);

        let _ = tokio::fs::remove_file(&tmp).await;
        Ok(())
    }
}
