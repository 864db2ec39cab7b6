// Shared fixtures for coordinator integration tests.
#![allow(dead_code, clippy::unwrap_used)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::{broadcast, mpsc, watch};

use simpleapi_api::{Error, HttpRequest, Transport};
use simpleapi_core::{
    ApiError, ConnectionType, Coordinator, ManualMonitor, MemoryStore, NetworkEvent,
    ReachabilityState, Record, Store, StoreError,
};

// ── Records ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pet {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub age: u32,
}

impl Record for Pet {
    const KIND: &'static str = "pet";

    fn identity(&self) -> String {
        self.name.clone()
    }
}

pub fn pet(name: &str, age: u32) -> Pet {
    Pet {
        name: name.into(),
        kind: "dog".into(),
        age,
    }
}

// ── Transport ───────────────────────────────────────────────────────

/// Canned reply for every request.
#[derive(Clone)]
pub enum Reply {
    Body(Option<Value>),
    Status(u16),
}

/// Transport that records requests and answers from a script.
pub struct ScriptedTransport {
    requests: Mutex<Vec<HttpRequest>>,
    reply: Mutex<Reply>,
}

impl ScriptedTransport {
    pub fn new(reply: Reply) -> Arc<Self> {
        Arc::new(Self {
            requests: Mutex::new(Vec::new()),
            reply: Mutex::new(reply),
        })
    }

    pub fn json(body: Value) -> Arc<Self> {
        Self::new(Reply::Body(Some(body)))
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: HttpRequest) -> Result<Option<Value>, Error> {
        self.requests.lock().unwrap().push(request);
        match self.reply.lock().unwrap().clone() {
            Reply::Body(body) => Ok(body),
            Reply::Status(status) => Err(Error::Status {
                status,
                body: String::new(),
            }),
        }
    }
}

// ── Store ───────────────────────────────────────────────────────────

/// Memory store that logs the kind of every write and can be told to fail.
#[derive(Default)]
pub struct CountingStore {
    inner: MemoryStore,
    writes: Mutex<Vec<String>>,
    fail: AtomicBool,
}

impl CountingStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn writes(&self, kind: &str) -> usize {
        self.writes.lock().unwrap().iter().filter(|k| *k == kind).count()
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    fn write(&self, kind: &str) -> Result<(), StoreError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(StoreError::Worker("injected failure".into()));
        }
        self.writes.lock().unwrap().push(kind.to_owned());
        Ok(())
    }
}

#[async_trait]
impl Store for CountingStore {
    async fn upsert(&self, kind: &str, key: String, value: Value) -> Result<(), StoreError> {
        self.write(kind)?;
        self.inner.upsert(kind, key, value).await
    }

    async fn upsert_all(
        &self,
        kind: &str,
        entries: Vec<(String, Value)>,
    ) -> Result<(), StoreError> {
        self.write(kind)?;
        self.inner.upsert_all(kind, entries).await
    }

    async fn get(&self, kind: &str, key: &str) -> Result<Option<Value>, StoreError> {
        self.inner.get(kind, key).await
    }

    async fn all(&self, kind: &str) -> Result<Vec<Value>, StoreError> {
        self.inner.all(kind).await
    }

    async fn clear(&self, kind: &str) -> Result<usize, StoreError> {
        self.inner.clear(kind).await
    }

    fn subscribe(&self, kind: &str) -> watch::Receiver<u64> {
        self.inner.subscribe(kind)
    }
}

// ── Coordinator ─────────────────────────────────────────────────────

pub fn online() -> Arc<ManualMonitor> {
    Arc::new(ManualMonitor::new(ReachabilityState::reachable(
        ConnectionType::Wifi,
    )))
}

pub fn offline() -> Arc<ManualMonitor> {
    Arc::new(ManualMonitor::new(ReachabilityState::unreachable()))
}

pub async fn start(
    transport: Arc<ScriptedTransport>,
    store: Arc<CountingStore>,
    monitor: Arc<ManualMonitor>,
) -> Coordinator {
    Coordinator::builder()
        .transport(transport)
        .store(store)
        .monitor(monitor)
        .start()
        .await
        .unwrap()
}

/// A completion callback that forwards its outcome into a channel.
pub fn capture<T: Send + 'static>() -> (
    impl Fn(Result<T, ApiError>) + Send + Sync + 'static,
    mpsc::UnboundedReceiver<Result<T, ApiError>>,
) {
    let (tx, rx) = mpsc::unbounded_channel();
    let completion = move |outcome: Result<T, ApiError>| {
        let _ = tx.send(outcome);
    };
    (completion, rx)
}

pub async fn next_outcome<T>(
    rx: &mut mpsc::UnboundedReceiver<Result<T, ApiError>>,
) -> Result<T, ApiError> {
    tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("timed out waiting for completion")
        .expect("completion channel closed")
}

pub async fn next_event(rx: &mut broadcast::Receiver<NetworkEvent>) -> NetworkEvent {
    tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("timed out waiting for network event")
        .unwrap()
}
