//! CLI error types with miette diagnostics.
//!
//! Maps core failures into user-facing errors with actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use simpleapi_core::{ApiError, CoreError, StoreError};

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const STORE: i32 = 9;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Network ──────────────────────────────────────────────────────

    #[error("No internet connection; {url} was not requested")]
    #[diagnostic(
        code(simpleapi::offline),
        help(
            "The reachability probe reports the network as down.\n\
             Check connectivity or point --probe at a reachable host:port.\n\
             Try: simpleapi status"
        )
    )]
    Offline { url: String },

    #[error("Request to {url} failed")]
    #[diagnostic(code(simpleapi::request_failed))]
    RequestFailed {
        url: String,
        #[source]
        source: simpleapi_api::Error,
    },

    #[error("{url} returned no records")]
    #[diagnostic(
        code(simpleapi::empty_response),
        help("The server answered successfully with an empty or missing body.")
    )]
    EmptyResponse { url: String },

    // ── Store ────────────────────────────────────────────────────────

    #[error("Record store error")]
    #[diagnostic(
        code(simpleapi::store),
        help("Check the --store path, or remove a corrupt store file to start fresh.")
    )]
    Store(#[from] StoreError),

    #[error("Could not start the coordinator")]
    #[diagnostic(code(simpleapi::startup))]
    Startup(#[from] CoreError),

    // ── Validation ───────────────────────────────────────────────────

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(simpleapi::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────

    #[error(transparent)]
    #[diagnostic(code(simpleapi::settings))]
    Settings(Box<figment::Error>),

    #[error("Settings file already exists at {path}")]
    #[diagnostic(
        code(simpleapi::settings_exist),
        help("Use --force to overwrite it.")
    )]
    SettingsExist { path: String },

    // ── IO / Serialization ────────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    #[diagnostic(code(simpleapi::json))]
    Json(#[from] serde_json::Error),
}

impl From<figment::Error> for CliError {
    fn from(err: figment::Error) -> Self {
        Self::Settings(Box::new(err))
    }
}

impl CliError {
    /// Attach the request URL to a fetch failure.
    pub fn from_api(err: ApiError, url: &str) -> Self {
        match err {
            ApiError::NoInternet => Self::Offline { url: url.into() },
            ApiError::EmptyResponse => Self::EmptyResponse { url: url.into() },
            ApiError::TransportFailure(source) => Self::RequestFailed {
                url: url.into(),
                source,
            },
            ApiError::Persistence(e) => Self::Store(e),
        }
    }

    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Offline { .. } => exit_code::CONNECTION,
            Self::RequestFailed { source, .. } if source.is_not_found() => exit_code::NOT_FOUND,
            Self::RequestFailed { source, .. } if source.is_transient() => exit_code::CONNECTION,
            Self::EmptyResponse { .. } => exit_code::NOT_FOUND,
            Self::Store(_) => exit_code::STORE,
            Self::Validation { .. } | Self::SettingsExist { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fetch_failures_map_to_exit_codes() {
        assert_eq!(
            CliError::from_api(ApiError::NoInternet, "http://x").exit_code(),
            exit_code::CONNECTION
        );
        assert_eq!(
            CliError::from_api(ApiError::EmptyResponse, "http://x").exit_code(),
            exit_code::NOT_FOUND
        );
        let missing = simpleapi_api::Error::Status {
            status: 404,
            body: String::new(),
        };
        assert_eq!(
            CliError::from_api(ApiError::TransportFailure(missing), "http://x").exit_code(),
            exit_code::NOT_FOUND
        );
        let teapot = simpleapi_api::Error::Status {
            status: 418,
            body: String::new(),
        };
        assert_eq!(
            CliError::from_api(ApiError::TransportFailure(teapot), "http://x").exit_code(),
            exit_code::GENERAL
        );
    }
}
