// ── Reachability monitoring ──
//
// A monitor reports whether the network is usable and over which kind of
// link. The coordinator only needs the trait; `ManualMonitor` is driven by
// the host and `ProbeMonitor` checks a TCP endpoint on an interval.

mod manual;
mod probe;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use tokio::sync::broadcast;

use crate::error::ReachabilityError;

pub use manual::ManualMonitor;
pub use probe::{DEFAULT_PROBE_TARGET, ProbeMonitor};

/// Capacity of a monitor's state broadcast channel.
pub(crate) const STATE_CHANNEL_SIZE: usize = 16;

/// Link type reported alongside reachability.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionType {
    Wifi,
    Cellular,
    #[default]
    None,
}

/// Snapshot of the live connectivity signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReachabilityState {
    pub is_reachable: bool,
    pub connection: ConnectionType,
}

impl ReachabilityState {
    pub fn reachable(connection: ConnectionType) -> Self {
        Self {
            is_reachable: true,
            connection,
        }
    }

    pub fn unreachable() -> Self {
        Self {
            is_reachable: false,
            connection: ConnectionType::None,
        }
    }
}

/// Source of reachability changes.
#[async_trait]
pub trait ReachabilityMonitor: Send + Sync {
    /// Take a first real reading so `is_reachable` is accurate before any
    /// change has been observed. Monitors whose state is always current
    /// keep the default no-op.
    async fn prime(&self) {}

    /// Begin monitoring. The returned receiver first yields the current
    /// state, then one event per change.
    fn start(&self) -> Result<broadcast::Receiver<ReachabilityState>, ReachabilityError>;

    /// Stop monitoring. Outstanding receivers observe the channel closing.
    fn stop(&self);

    fn is_reachable(&self) -> bool;
}
