// ── Per-kind reactive record collection ──
//
// Concurrent storage for the raw JSON form of one record kind, with a
// version counter pushed to subscribers on every mutation.

use std::collections::BTreeMap;
use std::sync::Arc;

use dashmap::DashMap;
use serde_json::Value;
use tokio::sync::watch;

/// Serialized shape of a whole store: kind -> identity -> value.
pub(crate) type Document = BTreeMap<String, BTreeMap<String, Value>>;

/// Collections for every kind seen so far, created on first touch.
#[derive(Default)]
pub(crate) struct Collections {
    kinds: DashMap<String, Arc<KindCollection>>,
}

impl Collections {
    pub(crate) fn from_document(document: Document) -> Self {
        let collections = Self::default();
        for (kind, records) in document {
            collections
                .kind(&kind)
                .upsert_all(records.into_iter().collect());
        }
        collections
    }

    pub(crate) fn kind(&self, kind: &str) -> Arc<KindCollection> {
        if let Some(existing) = self.kinds.get(kind) {
            return Arc::clone(existing.value());
        }
        Arc::clone(
            self.kinds
                .entry(kind.to_owned())
                .or_insert_with(|| Arc::new(KindCollection::new()))
                .value(),
        )
    }

    /// Current contents of every non-empty kind.
    pub(crate) fn document(&self) -> Document {
        self.kinds
            .iter()
            .filter(|r| !r.value().is_empty())
            .map(|r| (r.key().clone(), r.value().entries().into_iter().collect()))
            .collect()
    }
}

/// All stored values of a single record kind, keyed by identity.
pub(crate) struct KindCollection {
    by_key: DashMap<String, Value>,

    /// Bumped on every mutation.
    version: watch::Sender<u64>,
}

impl KindCollection {
    pub(crate) fn new() -> Self {
        let (version, _) = watch::channel(0u64);
        Self {
            by_key: DashMap::new(),
            version,
        }
    }

    /// Insert or replace a value. Returns `true` if the key was new.
    pub(crate) fn upsert(&self, key: String, value: Value) -> bool {
        let is_new = self.by_key.insert(key, value).is_none();
        self.bump_version();
        is_new
    }

    /// Insert or replace many values under a single version bump.
    pub(crate) fn upsert_all(&self, entries: Vec<(String, Value)>) {
        if entries.is_empty() {
            return;
        }
        for (key, value) in entries {
            self.by_key.insert(key, value);
        }
        self.bump_version();
    }

    pub(crate) fn get(&self, key: &str) -> Option<Value> {
        self.by_key.get(key).map(|r| r.value().clone())
    }

    /// All values, ordered by key.
    pub(crate) fn values(&self) -> Vec<Value> {
        self.entries().into_iter().map(|(_, v)| v).collect()
    }

    /// All entries, ordered by key.
    pub(crate) fn entries(&self) -> Vec<(String, Value)> {
        let mut entries: Vec<(String, Value)> = self
            .by_key
            .iter()
            .map(|r| (r.key().clone(), r.value().clone()))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
    }

    /// Remove everything. Returns how many values were dropped.
    pub(crate) fn clear(&self) -> usize {
        let removed = self.by_key.len();
        self.by_key.clear();
        if removed > 0 {
            self.bump_version();
        }
        removed
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.by_key.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<u64> {
        self.version.subscribe()
    }

    fn bump_version(&self) {
        // `send_modify` updates unconditionally, even with zero receivers.
        self.version.send_modify(|v| *v += 1);
    }
}
