// ── Persistent record store ──
//
// Backends deal in raw JSON values grouped by record kind. `RecordStore`
// puts the typed `Record` surface on top of whichever backend is in use.

mod collection;
mod file;
mod memory;

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::watch;

use crate::error::StoreError;
use crate::record::Record;

pub use file::FileStore;
pub use memory::MemoryStore;

/// Storage backend for records in their JSON form.
///
/// Every method is a single write transaction or a consistent read.
/// A batch either lands completely or not at all.
#[async_trait]
pub trait Store: Send + Sync {
    /// Insert or replace the value stored under `key`.
    async fn upsert(&self, kind: &str, key: String, value: Value) -> Result<(), StoreError>;

    /// Insert or replace many values in one transaction.
    async fn upsert_all(&self, kind: &str, entries: Vec<(String, Value)>)
    -> Result<(), StoreError>;

    async fn get(&self, kind: &str, key: &str) -> Result<Option<Value>, StoreError>;

    /// Every value of `kind`, ordered by key.
    async fn all(&self, kind: &str) -> Result<Vec<Value>, StoreError>;

    /// Delete every value of `kind`. Returns how many were removed.
    async fn clear(&self, kind: &str) -> Result<usize, StoreError>;

    /// Version counter for `kind`, bumped after each committed change.
    fn subscribe(&self, kind: &str) -> watch::Receiver<u64>;
}

// ── Typed facade ────────────────────────────────────────────────────

/// Typed access to a [`Store`].
#[derive(Clone)]
pub struct RecordStore {
    inner: Arc<dyn Store>,
}

impl RecordStore {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { inner: store }
    }

    /// The untyped backend.
    pub fn backend(&self) -> &Arc<dyn Store> {
        &self.inner
    }

    /// Save one record, replacing any existing record with the same identity.
    pub async fn save<T: Record>(&self, record: &T) -> Result<(), StoreError> {
        let value = encode(record)?;
        self.inner.upsert(T::KIND, record.identity(), value).await
    }

    /// Save a batch of records in a single transaction.
    pub async fn save_all<T: Record>(&self, records: &[T]) -> Result<(), StoreError> {
        let entries = records
            .iter()
            .map(|r| Ok((r.identity(), encode(r)?)))
            .collect::<Result<Vec<_>, StoreError>>()?;
        self.inner.upsert_all(T::KIND, entries).await
    }

    pub async fn load<T: Record>(&self, key: &str) -> Result<Option<T>, StoreError> {
        self.inner
            .get(T::KIND, key)
            .await?
            .map(decode::<T>)
            .transpose()
    }

    /// Load a record, falling back to `T::default()` when none is stored.
    pub async fn load_or_default<T: Record + Default>(&self, key: &str) -> Result<T, StoreError> {
        Ok(self.load(key).await?.unwrap_or_default())
    }

    pub async fn load_all<T: Record>(&self) -> Result<Vec<T>, StoreError> {
        self.inner
            .all(T::KIND)
            .await?
            .into_iter()
            .map(decode::<T>)
            .collect()
    }

    /// Delete every record of type `T`.
    pub async fn clear<T: Record>(&self) -> Result<usize, StoreError> {
        self.inner.clear(T::KIND).await
    }

    pub fn subscribe<T: Record>(&self) -> watch::Receiver<u64> {
        self.inner.subscribe(T::KIND)
    }
}

impl std::fmt::Debug for RecordStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordStore").finish_non_exhaustive()
    }
}

fn encode<T: Record>(record: &T) -> Result<Value, StoreError> {
    serde_json::to_value(record).map_err(|e| StoreError::serialization(T::KIND, e))
}

fn decode<T: Record>(value: Value) -> Result<T, StoreError> {
    serde_json::from_value(value).map_err(|e| StoreError::serialization(T::KIND, e))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    struct Pet {
        name: String,
        #[serde(rename = "type")]
        kind: String,
        age: u32,
    }

    impl Record for Pet {
        const KIND: &'static str = "pet";

        fn identity(&self) -> String {
            self.name.clone()
        }
    }

    fn pet(name: &str, age: u32) -> Pet {
        Pet {
            name: name.into(),
            kind: "dog".into(),
            age,
        }
    }

    fn records() -> RecordStore {
        RecordStore::new(Arc::new(MemoryStore::new()))
    }

    #[tokio::test]
    async fn save_replaces_by_identity() {
        let store = records();
        store.save(&pet("rex", 1)).await.unwrap();
        store.save(&pet("rex", 2)).await.unwrap();

        let all: Vec<Pet> = store.load_all().await.unwrap();
        assert_eq!(all, vec![pet("rex", 2)]);
    }

    #[tokio::test]
    async fn save_all_then_load() {
        let store = records();
        store
            .save_all(&[pet("rex", 1), pet("ace", 4)])
            .await
            .unwrap();

        assert_eq!(store.load::<Pet>("ace").await.unwrap(), Some(pet("ace", 4)));
        assert_eq!(store.load::<Pet>("missing").await.unwrap(), None);
        assert_eq!(store.load_all::<Pet>().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn load_or_default_falls_back() {
        let store = records();
        let loaded: Pet = store.load_or_default("nobody").await.unwrap();
        assert_eq!(loaded, Pet::default());
    }

    #[tokio::test]
    async fn stored_shape_uses_serde_names() {
        let store = records();
        store.save(&pet("rex", 1)).await.unwrap();
        let raw = store.backend().get("pet", "rex").await.unwrap().unwrap();
        assert_eq!(raw["type"], "dog");
    }

    #[tokio::test]
    async fn undecodable_value_is_serialization_error() {
        let store = records();
        store
            .backend()
            .upsert("pet", "bad".into(), serde_json::json!({ "name": 5 }))
            .await
            .unwrap();

        let err = store.load::<Pet>("bad").await.unwrap_err();
        assert!(matches!(err, StoreError::Serialization { .. }));
    }

    #[tokio::test]
    async fn clear_only_touches_one_kind() {
        let store = records();
        store.save(&pet("rex", 1)).await.unwrap();
        store
            .backend()
            .upsert("owner", "sam".into(), serde_json::json!({}))
            .await
            .unwrap();

        assert_eq!(store.clear::<Pet>().await.unwrap(), 1);
        assert!(store.load_all::<Pet>().await.unwrap().is_empty());
        assert_eq!(store.backend().all("owner").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn subscribe_sees_commits() {
        let store = records();
        let mut rx = store.subscribe::<Pet>();
        store.save(&pet("rex", 1)).await.unwrap();
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow(), 1);
    }
}
