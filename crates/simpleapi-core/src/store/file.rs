// ── Durable JSON file store ──
//
// The whole store is one JSON document. Each write transaction renders
// the next document, replaces the file atomically on a blocking worker,
// and only then applies the change in memory. A failed write leaves both
// the file and the in-memory view as they were.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use directories::ProjectDirs;
use serde_json::Value;
use tempfile::NamedTempFile;
use tokio::sync::{Mutex, watch};
use tracing::debug;

use super::Store;
use super::collection::{Collections, Document, KindCollection};
use crate::error::StoreError;

const STORE_FILE: &str = "store.json";

/// Store persisted to a single JSON file.
pub struct FileStore {
    path: PathBuf,
    collections: Collections,
    /// Serializes write transactions.
    writer: Mutex<()>,
}

impl FileStore {
    /// Open the store at `path`. A missing or empty file is an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let document: Document = match std::fs::read_to_string(&path) {
            Ok(text) if text.trim().is_empty() => Document::new(),
            Ok(text) => serde_json::from_str(&text).map_err(|e| StoreError::Corrupt {
                path: path.clone(),
                reason: e.to_string(),
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Document::new(),
            Err(source) => return Err(StoreError::Io { path, source }),
        };

        debug!(path = %path.display(), kinds = document.len(), "opened file store");

        Ok(Self {
            path,
            collections: Collections::from_document(document),
            writer: Mutex::new(()),
        })
    }

    /// Open the store at [`default_path`](Self::default_path).
    pub fn open_default() -> Result<Self, StoreError> {
        Self::open(Self::default_path()?)
    }

    /// `store.json` under the platform data directory.
    pub fn default_path() -> Result<PathBuf, StoreError> {
        ProjectDirs::from("com", "simpleapi", "simpleapi")
            .map(|dirs| dirs.data_dir().join(STORE_FILE))
            .ok_or(StoreError::NoDataDir)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn commit<R>(
        &self,
        kind: &str,
        edit: impl FnOnce(&mut BTreeMap<String, Value>),
        apply: impl FnOnce(&KindCollection) -> R,
    ) -> Result<R, StoreError> {
        let _guard = self.writer.lock().await;

        let mut document = self.collections.document();
        let records = document.entry(kind.to_owned()).or_default();
        edit(records);
        if records.is_empty() {
            document.remove(kind);
        }

        write_document(self.path.clone(), &document).await?;
        Ok(apply(&self.collections.kind(kind)))
    }
}

#[async_trait]
impl Store for FileStore {
    async fn upsert(&self, kind: &str, key: String, value: Value) -> Result<(), StoreError> {
        let staged = (key.clone(), value.clone());
        self.commit(
            kind,
            |records| {
                records.insert(staged.0, staged.1);
            },
            |collection| {
                collection.upsert(key, value);
            },
        )
        .await
    }

    async fn upsert_all(
        &self,
        kind: &str,
        entries: Vec<(String, Value)>,
    ) -> Result<(), StoreError> {
        if entries.is_empty() {
            return Ok(());
        }
        let staged = entries.clone();
        self.commit(
            kind,
            |records| records.extend(staged),
            |collection| collection.upsert_all(entries),
        )
        .await
    }

    async fn get(&self, kind: &str, key: &str) -> Result<Option<Value>, StoreError> {
        Ok(self.collections.kind(kind).get(key))
    }

    async fn all(&self, kind: &str) -> Result<Vec<Value>, StoreError> {
        Ok(self.collections.kind(kind).values())
    }

    async fn clear(&self, kind: &str) -> Result<usize, StoreError> {
        if self.collections.kind(kind).is_empty() {
            return Ok(0);
        }
        self.commit(kind, BTreeMap::clear, KindCollection::clear)
            .await
    }

    fn subscribe(&self, kind: &str) -> watch::Receiver<u64> {
        self.collections.kind(kind).subscribe()
    }
}

async fn write_document(path: PathBuf, document: &Document) -> Result<(), StoreError> {
    let bytes = serde_json::to_vec_pretty(document)
        .map_err(|e| StoreError::serialization("store", e))?;
    tokio::task::spawn_blocking(move || write_atomic(&path, &bytes))
        .await
        .map_err(|e| StoreError::Worker(e.to_string()))?
}

/// Write to a temp file in the target directory, fsync, then rename over.
fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
    let io = |source: std::io::Error| StoreError::Io {
        path: path.to_path_buf(),
        source,
    };

    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(dir).map_err(io)?;

    let mut tmp = NamedTempFile::new_in(dir).map_err(io)?;
    tmp.write_all(bytes).map_err(io)?;
    tmp.as_file().sync_all().map_err(io)?;
    tmp.persist(path).map_err(|e| io(e.error))?;
    Ok(())
}
