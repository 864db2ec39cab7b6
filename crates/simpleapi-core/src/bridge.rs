// ── Reachability bridge ──
//
// Turns monitor state changes into coordinator behavior: replay of the
// remembered offline request, the global event, and delegate callbacks.

use std::sync::Weak;

use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::coordinator::{Coordinator, CoordinatorInner};
use crate::event::NetworkEvent;
use crate::reachability::ReachabilityState;

/// Forward monitor states until cancelled, the monitor stops, or the
/// coordinator is dropped. The first state received is the monitor's
/// initial report and is never treated as a transition.
pub(crate) async fn bridge_task(
    coordinator: Weak<CoordinatorInner>,
    mut states: broadcast::Receiver<ReachabilityState>,
    cancel: CancellationToken,
) {
    let mut initial = true;

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            result = states.recv() => {
                match result {
                    Ok(state) => {
                        if std::mem::take(&mut initial) {
                            debug!(reachable = state.is_reachable, "ignoring initial reachability report");
                            continue;
                        }
                        let Some(inner) = coordinator.upgrade() else { break };
                        apply_transition(&Coordinator::from_inner(inner), state);
                    }
                    Err(RecvError::Lagged(n)) => {
                        warn!(skipped = n, "reachability bridge: receiver lagged");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        }
    }

    debug!("reachability bridge stopped");
}

pub(crate) fn apply_transition(coordinator: &Coordinator, state: ReachabilityState) {
    let event = NetworkEvent::from(state);

    match event {
        NetworkEvent::Reachable(connection) => {
            info!("reachable via {connection}");
            if coordinator.config().replay_last_request_on_reconnect {
                coordinator.replay_pending();
            }
        }
        NetworkEvent::Unreachable => info!("network not reachable"),
    }

    coordinator.publish(event);
}
