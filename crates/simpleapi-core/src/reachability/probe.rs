// ── TCP probe monitor ──
//
// Reachability is inferred from whether a TCP connection to a well-known
// endpoint succeeds within a timeout. The probe cannot tell link types
// apart, so it reports whichever one it was configured with.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use tokio::net::TcpStream;
use tokio::runtime::Handle;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use super::{ConnectionType, ReachabilityMonitor, ReachabilityState, STATE_CHANNEL_SIZE};
use crate::error::ReachabilityError;

pub const DEFAULT_PROBE_TARGET: &str = "1.1.1.1:443";
const DEFAULT_INTERVAL: Duration = Duration::from_secs(5);
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(3);

/// Monitor that periodically opens a TCP connection to `target`.
pub struct ProbeMonitor {
    target: String,
    interval: Duration,
    timeout: Duration,
    connection: ConnectionType,
    /// Optimistically `true` until primed or until the first probe completes.
    reachable: Arc<AtomicBool>,
    cancel: Mutex<Option<CancellationToken>>,
}

impl ProbeMonitor {
    /// `target` is a `host:port` pair.
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            interval: DEFAULT_INTERVAL,
            timeout: DEFAULT_TIMEOUT,
            connection: ConnectionType::Wifi,
            reachable: Arc::new(AtomicBool::new(true)),
            cancel: Mutex::new(None),
        }
    }

    #[must_use]
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Link type reported while the target is reachable.
    #[must_use]
    pub fn with_connection(mut self, connection: ConnectionType) -> Self {
        self.connection = connection;
        self
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    /// Probe once, right now. Does not touch the monitored state.
    pub async fn probe_now(&self) -> ReachabilityState {
        let target = ProbeTarget {
            address: self.target.clone(),
            timeout: self.timeout,
            connection: self.connection,
        };
        state_for(target.check().await, self.connection)
    }

    fn current_state(&self) -> ReachabilityState {
        state_for(self.reachable.load(Ordering::SeqCst), self.connection)
    }
}

impl Default for ProbeMonitor {
    fn default() -> Self {
        Self::new(DEFAULT_PROBE_TARGET)
    }
}

#[async_trait]
impl ReachabilityMonitor for ProbeMonitor {
    async fn prime(&self) {
        let state = self.probe_now().await;
        self.reachable.store(state.is_reachable, Ordering::SeqCst);
        debug!(target = %self.target, reachable = state.is_reachable, "reachability primed");
    }

    fn start(&self) -> Result<broadcast::Receiver<ReachabilityState>, ReachabilityError> {
        let handle = Handle::try_current().map_err(|_| ReachabilityError::NoRuntime)?;

        let mut slot = self.cancel.lock().unwrap_or_else(PoisonError::into_inner);
        if slot.is_some() {
            return Err(ReachabilityError::AlreadyStarted);
        }

        let (tx, rx) = broadcast::channel(STATE_CHANNEL_SIZE);
        let _ = tx.send(self.current_state());

        let cancel = CancellationToken::new();
        handle.spawn(probe_task(
            ProbeTarget {
                address: self.target.clone(),
                timeout: self.timeout,
                connection: self.connection,
            },
            self.interval,
            Arc::clone(&self.reachable),
            tx,
            cancel.clone(),
        ));
        *slot = Some(cancel);

        debug!(target = %self.target, interval = ?self.interval, "reachability probe started");
        Ok(rx)
    }

    fn stop(&self) {
        if let Some(cancel) = self
            .cancel
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            cancel.cancel();
            debug!(target = %self.target, "reachability probe stopped");
        }
    }

    fn is_reachable(&self) -> bool {
        self.reachable.load(Ordering::SeqCst)
    }
}

impl Drop for ProbeMonitor {
    fn drop(&mut self) {
        self.stop();
    }
}

struct ProbeTarget {
    address: String,
    timeout: Duration,
    connection: ConnectionType,
}

impl ProbeTarget {
    async fn check(&self) -> bool {
        matches!(
            tokio::time::timeout(self.timeout, TcpStream::connect(self.address.as_str())).await,
            Ok(Ok(_))
        )
    }
}

async fn probe_task(
    target: ProbeTarget,
    period: Duration,
    reachable: Arc<AtomicBool>,
    tx: broadcast::Sender<ReachabilityState>,
    cancel: CancellationToken,
) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {
                let now = target.check().await;
                trace!(target = %target.address, reachable = now, "probe");
                if reachable.swap(now, Ordering::SeqCst) != now {
                    let _ = tx.send(state_for(now, target.connection));
                }
            }
        }
    }
}

fn state_for(reachable: bool, connection: ConnectionType) -> ReachabilityState {
    if reachable {
        ReachabilityState::reachable(connection)
    } else {
        ReachabilityState::unreachable()
    }
}
