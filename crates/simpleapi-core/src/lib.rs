//! Typed fetch, persistence, and reachability-aware retry on top of
//! `simpleapi-api`.
//!
//! - **[`Coordinator`]**: the entry point. Issues requests described by a
//!   [`RequestSpec`], decodes responses into [`Record`] types, optionally
//!   persists them before reporting success, and remembers the last request
//!   refused while offline so it can be replayed on reconnect. Started via
//!   [`Coordinator::builder()`].
//!
//! - **[`RecordStore`]**: typed access to a [`Store`] backend.
//!   [`MemoryStore`] keeps records for the life of the process;
//!   [`FileStore`] writes them to a JSON file with atomic replacement.
//!
//! - **Reachability** ([`reachability`]): the [`ReachabilityMonitor`] trait
//!   plus a host-driven [`ManualMonitor`] and a TCP [`ProbeMonitor`].
//!   Transitions reach consumers as [`NetworkEvent`]s and through
//!   registered [`ReachabilityDelegate`]s.
//!
//! - **Configuration** ([`config`]): coordinator-wide defaults, persisted
//!   in the record store under a fixed key and reloaded on start.

mod bridge;
pub mod config;
pub mod coordinator;
pub mod delegate;
pub mod error;
pub mod event;
pub mod reachability;
pub mod record;
pub mod request;
pub mod store;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{CoordinatorConfig, StoredConfig};
pub use coordinator::{Coordinator, CoordinatorBuilder};
pub use delegate::{DelegateToken, ReachabilityDelegate};
pub use error::{ApiError, CoreError, ErrorKind, ReachabilityError, StoreError};
pub use event::NetworkEvent;
pub use reachability::{
    ConnectionType, ManualMonitor, ProbeMonitor, ReachabilityMonitor, ReachabilityState,
};
pub use record::Record;
pub use request::{Persist, RequestSpec};
pub use store::{FileStore, MemoryStore, RecordStore, Store};

// Transport-level types callers need to build requests and configure the client.
pub use simpleapi_api::{Headers, Method, Params, ParamsEncoding, TransportConfig};
