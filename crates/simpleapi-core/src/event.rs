// ── Network transition events ──

use crate::reachability::{ConnectionType, ReachabilityState};

/// Capacity of the coordinator's event broadcast channel.
pub(crate) const EVENT_CHANNEL_SIZE: usize = 64;

/// A reachability transition, as seen by subscribers of
/// [`Coordinator::events`](crate::Coordinator::events).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkEvent {
    Reachable(ConnectionType),
    Unreachable,
}

impl NetworkEvent {
    pub fn is_reachable(self) -> bool {
        matches!(self, Self::Reachable(_))
    }

    /// Link type for a reachable event, `None` otherwise.
    pub fn connection(self) -> Option<ConnectionType> {
        match self {
            Self::Reachable(connection) => Some(connection),
            Self::Unreachable => None,
        }
    }
}

impl From<ReachabilityState> for NetworkEvent {
    fn from(state: ReachabilityState) -> Self {
        if state.is_reachable {
            Self::Reachable(state.connection)
        } else {
            Self::Unreachable
        }
    }
}
