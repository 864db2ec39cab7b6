// ── Core error types ──
//
// `ApiError` is what a fetch resolves with on its failure path. Its kind tag
// is always present; only `TransportFailure` and `Persistence` carry a cause.

use std::path::PathBuf;

use strum::Display;
use thiserror::Error;

/// Failure of a single fetch invocation.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The monitor reported offline; no request was sent and a retry was remembered.
    #[error("There's no internet connection")]
    NoInternet,

    /// The transport succeeded but there was nothing to decode.
    #[error("Response exited with success but result value is empty")]
    EmptyResponse,

    /// Non-2xx status, connection error, or decode error.
    #[error("Request failed: {0}")]
    TransportFailure(#[source] simpleapi_api::Error),

    /// The response decoded but could not be written to the store.
    #[error("Failed to persist response: {0}")]
    Persistence(#[source] StoreError),
}

/// Fieldless tag for an [`ApiError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    NoInternet,
    EmptyResponse,
    TransportFailure,
    Persistence,
}

impl ApiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NoInternet => ErrorKind::NoInternet,
            Self::EmptyResponse => ErrorKind::EmptyResponse,
            Self::TransportFailure(_) => ErrorKind::TransportFailure,
            Self::Persistence(_) => ErrorKind::Persistence,
        }
    }

    /// The underlying transport error, if any.
    pub fn transport_error(&self) -> Option<&simpleapi_api::Error> {
        match self {
            Self::TransportFailure(e) => Some(e),
            _ => None,
        }
    }
}

impl From<simpleapi_api::Error> for ApiError {
    fn from(err: simpleapi_api::Error) -> Self {
        Self::TransportFailure(err)
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        Self::Persistence(err)
    }
}

/// Persistent store failure.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode or decode {kind} record: {source}")]
    Serialization {
        kind: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("store file {path} is corrupt: {reason}")]
    Corrupt { path: PathBuf, reason: String },

    #[error("store worker failed: {0}")]
    Worker(String),

    #[error("no platform data directory available for the default store path")]
    NoDataDir,
}

impl StoreError {
    pub(crate) fn serialization(kind: &str, source: serde_json::Error) -> Self {
        Self::Serialization {
            kind: kind.to_owned(),
            source,
        }
    }
}

/// Reachability monitor failure.
#[derive(Debug, Error)]
pub enum ReachabilityError {
    #[error("reachability monitor requires a running tokio runtime")]
    NoRuntime,

    #[error("reachability monitor already started")]
    AlreadyStarted,
}

/// Failure to bring a coordinator up.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("failed to load coordinator configuration: {0}")]
    Config(#[source] StoreError),

    #[error("failed to build HTTP transport: {0}")]
    Transport(#[from] simpleapi_api::Error),

    #[error("coordinator must be started inside a tokio runtime")]
    NoRuntime,
}
