// ── Coordinator ──
//
// Single entry point for typed fetches. Owns the transport, the record
// store, and the reachability monitor, and keeps the one remembered
// offline request that gets replayed when the network comes back.

use std::future::Future;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde_json::Value;
use tokio::runtime::Handle;
use tokio::sync::{broadcast, oneshot};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use simpleapi_api::{
    Headers, HttpClient, HttpRequest, Method, ParamsEncoding, Transport, TransportConfig,
};

use crate::bridge;
use crate::config::{CONFIG_KEY, CoordinatorConfig, StoredConfig};
use crate::delegate::{DelegateRegistry, DelegateToken, ReachabilityDelegate};
use crate::error::{ApiError, CoreError, StoreError};
use crate::event::{EVENT_CHANNEL_SIZE, NetworkEvent};
use crate::reachability::{ProbeMonitor, ReachabilityMonitor};
use crate::record::Record;
use crate::request::RequestSpec;
use crate::store::{MemoryStore, RecordStore, Store};

/// Completion callback for the callback-style fetches. It is shared with
/// the remembered retry, so it may be invoked again after a replay.
type Completion<T> = Arc<dyn Fn(Result<T, ApiError>) + Send + Sync>;

/// Re-issues a remembered offline request against the coordinator it is
/// given. It never captures a coordinator itself.
type PendingRetry = Arc<dyn Fn(&Coordinator) + Send + Sync>;

// ── Builder ─────────────────────────────────────────────────────────

/// Configures and starts a [`Coordinator`].
#[derive(Default)]
pub struct CoordinatorBuilder {
    transport: Option<Arc<dyn Transport>>,
    transport_config: TransportConfig,
    store: Option<Arc<dyn Store>>,
    monitor: Option<Arc<dyn ReachabilityMonitor>>,
}

impl CoordinatorBuilder {
    /// Use a custom transport instead of an [`HttpClient`].
    #[must_use]
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Settings for the default [`HttpClient`]. Ignored with a custom transport.
    #[must_use]
    pub fn transport_config(mut self, config: TransportConfig) -> Self {
        self.transport_config = config;
        self
    }

    /// Record store backend. Defaults to [`MemoryStore`].
    #[must_use]
    pub fn store(mut self, store: Arc<dyn Store>) -> Self {
        self.store = Some(store);
        self
    }

    /// Reachability source. Defaults to [`ProbeMonitor`].
    #[must_use]
    pub fn monitor(mut self, monitor: Arc<dyn ReachabilityMonitor>) -> Self {
        self.monitor = Some(monitor);
        self
    }

    /// Load the persisted config, take a first reachability reading, start
    /// the monitor, and spawn the reachability bridge.
    ///
    /// A monitor that fails to start is logged and otherwise ignored; the
    /// coordinator still comes up and treats the monitor's
    /// `is_reachable` as the live signal.
    pub async fn start(self) -> Result<Coordinator, CoreError> {
        let runtime = Handle::try_current().map_err(|_| CoreError::NoRuntime)?;

        let transport: Arc<dyn Transport> = match self.transport {
            Some(transport) => transport,
            None => Arc::new(HttpClient::new(&self.transport_config)?),
        };
        let store = self
            .store
            .unwrap_or_else(|| Arc::new(MemoryStore::new()) as Arc<dyn Store>);
        let monitor = self
            .monitor
            .unwrap_or_else(|| Arc::new(ProbeMonitor::default()) as Arc<dyn ReachabilityMonitor>);

        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_SIZE);

        let coordinator = Coordinator {
            inner: Arc::new(CoordinatorInner {
                transport,
                records: RecordStore::new(store),
                monitor,
                config: Mutex::new(CoordinatorConfig::default()),
                config_write: tokio::sync::Mutex::new(()),
                loading: AtomicBool::new(false),
                pending_retry: Mutex::new(None),
                delegates: DelegateRegistry::default(),
                event_tx,
                runtime,
                cancel: CancellationToken::new(),
                bridge: Mutex::new(None),
            }),
        };

        coordinator.load_config().await.map_err(CoreError::Config)?;
        coordinator.inner.monitor.prime().await;
        coordinator.start_bridge();

        info!(reachable = coordinator.is_reachable(), "coordinator started");
        Ok(coordinator)
    }
}

// ── Coordinator ─────────────────────────────────────────────────────

/// Cheaply cloneable handle to a running coordinator.
///
/// Dropping the last handle stops the monitor and the bridge task.
#[derive(Clone)]
pub struct Coordinator {
    inner: Arc<CoordinatorInner>,
}

pub(crate) struct CoordinatorInner {
    transport: Arc<dyn Transport>,
    records: RecordStore,
    monitor: Arc<dyn ReachabilityMonitor>,
    config: Mutex<CoordinatorConfig>,
    /// Serializes config transactions, including their store write.
    config_write: tokio::sync::Mutex<()>,
    /// Set while the persisted config is being applied at startup.
    loading: AtomicBool,
    pending_retry: Mutex<Option<PendingRetry>>,
    delegates: DelegateRegistry,
    event_tx: broadcast::Sender<NetworkEvent>,
    runtime: Handle,
    cancel: CancellationToken,
    bridge: Mutex<Option<JoinHandle<()>>>,
}

impl Drop for CoordinatorInner {
    fn drop(&mut self) {
        self.cancel.cancel();
        self.monitor.stop();
    }
}

impl Coordinator {
    pub fn builder() -> CoordinatorBuilder {
        CoordinatorBuilder::default()
    }

    pub(crate) fn from_inner(inner: Arc<CoordinatorInner>) -> Self {
        Self { inner }
    }

    // ── Fetching ────────────────────────────────────────────────────

    /// Fetch and decode a single record.
    ///
    /// When offline this fails immediately with [`ApiError::NoInternet`].
    /// A replay of that request after reconnect has no caller waiting on
    /// it; its outcome is only logged.
    pub async fn fetch_one<T: Record>(&self, spec: RequestSpec) -> Result<T, ApiError> {
        self.fetch::<One<T>>(spec).await
    }

    /// Fetch and decode a collection of records. An empty collection is
    /// reported as [`ApiError::EmptyResponse`].
    pub async fn fetch_many<T: Record>(&self, spec: RequestSpec) -> Result<Vec<T>, ApiError> {
        self.fetch::<Many<T>>(spec).await
    }

    /// Callback form of [`fetch_one`](Self::fetch_one).
    ///
    /// `completion` runs exactly once per invocation. When offline it runs
    /// synchronously, before this returns, and the request is remembered
    /// with the same `completion` for replay on reconnect.
    pub fn fetch_one_with<T, F>(&self, spec: RequestSpec, completion: F)
    where
        T: Record,
        F: Fn(Result<T, ApiError>) + Send + Sync + 'static,
    {
        self.dispatch::<One<T>>(spec, Arc::new(completion));
    }

    /// Callback form of [`fetch_many`](Self::fetch_many).
    pub fn fetch_many_with<T, F>(&self, spec: RequestSpec, completion: F)
    where
        T: Record,
        F: Fn(Result<Vec<T>, ApiError>) + Send + Sync + 'static,
    {
        self.dispatch::<Many<T>>(spec, Arc::new(completion));
    }

    async fn fetch<S: Shape>(&self, spec: RequestSpec) -> Result<S::Output, ApiError> {
        let (tx, rx) = oneshot::channel();
        let waiting = Mutex::new(Some(tx));
        let url = spec.url.clone();

        self.dispatch::<S>(
            spec,
            Arc::new(move |outcome: Result<S::Output, ApiError>| {
                let tx = waiting
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .take();
                match tx {
                    Some(tx) => {
                        let _ = tx.send(outcome);
                    }
                    None => match outcome {
                        Ok(_) => info!(%url, "replayed request succeeded"),
                        Err(e) => warn!(%url, error = %e, "replayed request failed"),
                    },
                }
            }),
        );

        rx.await
            .unwrap_or_else(|_| Err(ApiError::TransportFailure(simpleapi_api::Error::Aborted)))
    }

    fn dispatch<S: Shape>(&self, spec: RequestSpec, completion: Completion<S::Output>) {
        if !self.inner.monitor.is_reachable() {
            let retry_spec = spec.clone();
            let retry_completion = Arc::clone(&completion);
            self.remember(Arc::new(move |coordinator: &Coordinator| {
                coordinator.dispatch::<S>(retry_spec.clone(), Arc::clone(&retry_completion));
            }));
            debug!(url = %spec.url, "offline; request remembered for replay");
            completion(Err(ApiError::NoInternet));
            return;
        }

        let (request, persist) = spec.resolve(&self.config());
        let transport = Arc::clone(&self.inner.transport);
        let records = self.inner.records.clone();

        self.inner.runtime.spawn(async move {
            let outcome = execute::<S>(transport.as_ref(), &records, request, persist).await;
            completion(outcome);
        });
    }

    fn remember(&self, retry: PendingRetry) {
        *lock(&self.inner.pending_retry) = Some(retry);
    }

    /// Re-issue the remembered offline request, if any. The retry stays
    /// remembered afterwards.
    pub(crate) fn replay_pending(&self) {
        let retry = lock(&self.inner.pending_retry).clone();
        if let Some(retry) = retry {
            debug!("replaying last offline request");
            retry(self);
        }
    }

    pub fn has_pending_retry(&self) -> bool {
        lock(&self.inner.pending_retry).is_some()
    }

    // ── Reachability ────────────────────────────────────────────────

    pub fn is_reachable(&self) -> bool {
        self.inner.monitor.is_reachable()
    }

    /// Subscribe to reachability transitions.
    pub fn events(&self) -> broadcast::Receiver<NetworkEvent> {
        self.inner.event_tx.subscribe()
    }

    pub fn add_delegate(&self, delegate: Arc<dyn ReachabilityDelegate>) -> DelegateToken {
        self.inner.delegates.add(delegate)
    }

    /// Unregister a delegate. Unknown tokens are ignored and return `false`.
    pub fn remove_delegate(&self, token: DelegateToken) -> bool {
        self.inner.delegates.remove(token)
    }

    pub fn delegate_count(&self) -> usize {
        self.inner.delegates.len()
    }

    pub(crate) fn publish(&self, event: NetworkEvent) {
        self.inner
            .delegates
            .notify(event.is_reachable(), event.connection());
        // No subscribers is not an error.
        let _ = self.inner.event_tx.send(event);
    }

    fn start_bridge(&self) {
        match self.inner.monitor.start() {
            Ok(states) => {
                let handle = self.inner.runtime.spawn(bridge::bridge_task(
                    Arc::downgrade(&self.inner),
                    states,
                    self.inner.cancel.child_token(),
                ));
                *lock(&self.inner.bridge) = Some(handle);
            }
            Err(e) => warn!(error = %e, "reachability monitor failed to start"),
        }
    }

    /// Stop the monitor and wait for the bridge task to exit.
    pub async fn shutdown(&self) {
        self.inner.cancel.cancel();
        self.inner.monitor.stop();
        let handle = lock(&self.inner.bridge).take();
        if let Some(handle) = handle {
            let _ = handle.await;
        }
        debug!("coordinator shut down");
    }

    // ── Store ───────────────────────────────────────────────────────

    pub fn records(&self) -> &RecordStore {
        &self.inner.records
    }

    // ── Configuration ───────────────────────────────────────────────

    pub fn config(&self) -> CoordinatorConfig {
        lock(&self.inner.config).clone()
    }

    /// Apply `f` to the config and persist the full result as one
    /// transaction. The in-memory config only changes once the write has
    /// succeeded. Nothing is written while the startup load is running.
    pub async fn update_config(
        &self,
        f: impl FnOnce(&mut CoordinatorConfig),
    ) -> Result<CoordinatorConfig, StoreError> {
        let _write = self.inner.config_write.lock().await;

        let mut next = self.config();
        f(&mut next);

        if !self.inner.loading.load(Ordering::SeqCst) {
            self.inner.records.save(&StoredConfig::from(&next)).await?;
            debug!("coordinator config saved");
        }

        *lock(&self.inner.config) = next.clone();
        Ok(next)
    }

    pub async fn set_auto_persist(&self, enabled: bool) -> Result<(), StoreError> {
        self.update_config(|c| c.auto_persist = enabled)
            .await
            .map(drop)
    }

    pub async fn set_replay_on_reconnect(&self, enabled: bool) -> Result<(), StoreError> {
        self.update_config(|c| c.replay_last_request_on_reconnect = enabled)
            .await
            .map(drop)
    }

    pub async fn set_default_method(&self, method: Method) -> Result<(), StoreError> {
        self.update_config(|c| c.default_method = method)
            .await
            .map(drop)
    }

    pub async fn set_default_encoding(&self, encoding: ParamsEncoding) -> Result<(), StoreError> {
        self.update_config(|c| c.default_encoding = encoding)
            .await
            .map(drop)
    }

    pub async fn set_default_headers(&self, headers: Option<Headers>) -> Result<(), StoreError> {
        self.update_config(|c| c.default_headers = headers)
            .await
            .map(drop)
    }

    async fn load_config(&self) -> Result<(), StoreError> {
        self.inner.loading.store(true, Ordering::SeqCst);
        let result = async {
            let stored: StoredConfig = self.inner.records.load_or_default(CONFIG_KEY).await?;
            let loaded = CoordinatorConfig::from(stored);
            self.update_config(|c| *c = loaded).await
        }
        .await;
        self.inner.loading.store(false, Ordering::SeqCst);

        let config = result?;
        debug!(
            auto_persist = config.auto_persist,
            replay = config.replay_last_request_on_reconnect,
            method = %config.default_method,
            encoding = %config.default_encoding,
            "coordinator config loaded"
        );
        Ok(())
    }
}

impl std::fmt::Debug for Coordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Coordinator")
            .field("reachable", &self.is_reachable())
            .field("pending_retry", &self.has_pending_retry())
            .field("delegates", &self.delegate_count())
            .finish_non_exhaustive()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// ── Response shapes ─────────────────────────────────────────────────

/// Single-record or collection decode and persistence.
trait Shape: Send + Sync + 'static {
    type Output: Send + 'static;

    /// `Ok(None)` means the payload was absent or empty.
    fn decode(body: Option<Value>) -> Result<Option<Self::Output>, simpleapi_api::Error>;

    fn persist(
        records: &RecordStore,
        value: &Self::Output,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;
}

struct One<T>(PhantomData<fn() -> T>);

struct Many<T>(PhantomData<fn() -> T>);

impl<T: Record> Shape for One<T> {
    type Output = T;

    fn decode(body: Option<Value>) -> Result<Option<T>, simpleapi_api::Error> {
        simpleapi_api::decode_one(body)
    }

    fn persist(
        records: &RecordStore,
        value: &T,
    ) -> impl Future<Output = Result<(), StoreError>> + Send {
        records.save(value)
    }
}

impl<T: Record> Shape for Many<T> {
    type Output = Vec<T>;

    fn decode(body: Option<Value>) -> Result<Option<Vec<T>>, simpleapi_api::Error> {
        Ok(simpleapi_api::decode_many(body)?.filter(|items: &Vec<T>| !items.is_empty()))
    }

    fn persist(
        records: &RecordStore,
        value: &Vec<T>,
    ) -> impl Future<Output = Result<(), StoreError>> + Send {
        records.save_all(value)
    }
}

/// Send, decode, and optionally persist. Persistence finishes before this
/// returns, so the completion never observes an unsaved success.
async fn execute<S: Shape>(
    transport: &dyn Transport,
    records: &RecordStore,
    request: HttpRequest,
    persist: bool,
) -> Result<S::Output, ApiError> {
    let body = transport.send(request).await?;
    let value = S::decode(body)?.ok_or(ApiError::EmptyResponse)?;
    if persist {
        S::persist(records, &value).await?;
    }
    Ok(value)
}
