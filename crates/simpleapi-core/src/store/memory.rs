// ── In-process store ──

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::watch;

use super::Store;
use super::collection::Collections;
use crate::error::StoreError;

/// Store that lives only as long as the process.
#[derive(Default)]
pub struct MemoryStore {
    collections: Collections,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn upsert(&self, kind: &str, key: String, value: Value) -> Result<(), StoreError> {
        self.collections.kind(kind).upsert(key, value);
        Ok(())
    }

    async fn upsert_all(
        &self,
        kind: &str,
        entries: Vec<(String, Value)>,
    ) -> Result<(), StoreError> {
        self.collections.kind(kind).upsert_all(entries);
        Ok(())
    }

    async fn get(&self, kind: &str, key: &str) -> Result<Option<Value>, StoreError> {
        Ok(self.collections.kind(kind).get(key))
    }

    async fn all(&self, kind: &str) -> Result<Vec<Value>, StoreError> {
        Ok(self.collections.kind(kind).values())
    }

    async fn clear(&self, kind: &str) -> Result<usize, StoreError> {
        Ok(self.collections.kind(kind).clear())
    }

    fn subscribe(&self, kind: &str) -> watch::Receiver<u64> {
        self.collections.kind(kind).subscribe()
    }
}
