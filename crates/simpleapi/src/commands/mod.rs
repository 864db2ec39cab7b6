//! Command dispatch: bridges CLI args -> coordinator calls -> output formatting.

pub mod config_cmd;
pub mod pets;
pub mod settings;
pub mod status;

use std::sync::Arc;

use simpleapi_core::Coordinator;

use crate::cli::{Command, GlobalOpts};
use crate::config::Settings;
use crate::error::CliError;

/// Start a coordinator over the file store and probe monitor named in `settings`.
pub async fn start_coordinator(settings: &Settings) -> Result<Coordinator, CliError> {
    let store = settings.open_store()?;
    tracing::debug!(store = %store.path().display(), probe = %settings.probe, "starting coordinator");

    Ok(Coordinator::builder()
        .transport_config(settings.transport())
        .store(Arc::new(store))
        .monitor(Arc::new(settings.monitor()))
        .start()
        .await?)
}

/// Dispatch a coordinator-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    coordinator: &Coordinator,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Pets(args) => pets::handle(coordinator, args, global).await,
        Command::Config(args) => config_cmd::handle(coordinator, args, global).await,
        // Settings and Status are handled before dispatch
        Command::Settings(_) | Command::Status => Ok(()),
    }
}
