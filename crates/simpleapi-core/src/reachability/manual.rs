// ── Host-driven monitor ──

use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use tokio::sync::broadcast;
use tracing::debug;

use super::{ReachabilityMonitor, ReachabilityState, STATE_CHANNEL_SIZE};
use crate::error::ReachabilityError;

/// Monitor whose state is pushed in by the host application, typically from
/// an OS connectivity callback it already owns.
pub struct ManualMonitor {
    state: Mutex<ReachabilityState>,
    sender: Mutex<Option<broadcast::Sender<ReachabilityState>>>,
}

impl ManualMonitor {
    pub fn new(initial: ReachabilityState) -> Self {
        Self {
            state: Mutex::new(initial),
            sender: Mutex::new(None),
        }
    }

    pub fn state(&self) -> ReachabilityState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record a new state and notify subscribers. Every call emits an event,
    /// even when the state did not change.
    pub fn set_state(&self, state: ReachabilityState) {
        let sender = self.sender.lock().unwrap_or_else(PoisonError::into_inner);
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = state;
        if let Some(tx) = sender.as_ref() {
            let _ = tx.send(state);
        }
        debug!(reachable = state.is_reachable, connection = %state.connection, "reachability set");
    }
}

impl Default for ManualMonitor {
    fn default() -> Self {
        Self::new(ReachabilityState::reachable(super::ConnectionType::Wifi))
    }
}

#[async_trait]
impl ReachabilityMonitor for ManualMonitor {
    fn start(&self) -> Result<broadcast::Receiver<ReachabilityState>, ReachabilityError> {
        let mut sender = self.sender.lock().unwrap_or_else(PoisonError::into_inner);
        if sender.is_some() {
            return Err(ReachabilityError::AlreadyStarted);
        }
        let (tx, rx) = broadcast::channel(STATE_CHANNEL_SIZE);
        let _ = tx.send(self.state());
        *sender = Some(tx);
        Ok(rx)
    }

    fn stop(&self) {
        self.sender
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
    }

    fn is_reachable(&self) -> bool {
        self.state().is_reachable
    }
}
