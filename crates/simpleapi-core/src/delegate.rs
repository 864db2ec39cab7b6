// ── Reachability delegates ──
//
// Observers are registered behind opaque tokens; removal goes by token so
// no equality is ever needed on the observer itself.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use crate::reachability::ConnectionType;

/// Observer of reachability transitions.
pub trait ReachabilityDelegate: Send + Sync {
    /// `connection` is `None` when the network became unreachable.
    fn on_reachability_changed(&self, is_reachable: bool, connection: Option<ConnectionType>);
}

impl<F> ReachabilityDelegate for F
where
    F: Fn(bool, Option<ConnectionType>) + Send + Sync,
{
    fn on_reachability_changed(&self, is_reachable: bool, connection: Option<ConnectionType>) {
        self(is_reachable, connection);
    }
}

/// Handle returned by registration, used to unregister.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DelegateToken(u64);

#[derive(Default)]
pub(crate) struct DelegateRegistry {
    next: AtomicU64,
    delegates: Mutex<Vec<(DelegateToken, Arc<dyn ReachabilityDelegate>)>>,
}

impl DelegateRegistry {
    pub(crate) fn add(&self, delegate: Arc<dyn ReachabilityDelegate>) -> DelegateToken {
        let token = DelegateToken(self.next.fetch_add(1, Ordering::Relaxed));
        self.lock().push((token, delegate));
        token
    }

    /// Returns `false` if the token was not registered.
    pub(crate) fn remove(&self, token: DelegateToken) -> bool {
        let mut delegates = self.lock();
        let before = delegates.len();
        delegates.retain(|(t, _)| *t != token);
        delegates.len() != before
    }

    pub(crate) fn len(&self) -> usize {
        self.lock().len()
    }

    /// Call every delegate in registration order. The list is snapshotted
    /// first so delegates may register or unregister from the callback.
    pub(crate) fn notify(&self, is_reachable: bool, connection: Option<ConnectionType>) {
        let snapshot: Vec<Arc<dyn ReachabilityDelegate>> =
            self.lock().iter().map(|(_, d)| Arc::clone(d)).collect();
        for delegate in snapshot {
            delegate.on_reachability_changed(is_reachable, connection);
        }
    }

    fn lock(
        &self,
    ) -> std::sync::MutexGuard<'_, Vec<(DelegateToken, Arc<dyn ReachabilityDelegate>)>> {
        self.delegates.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
