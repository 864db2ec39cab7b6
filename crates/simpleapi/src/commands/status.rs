//! Reachability status: a single live probe, no coordinator needed.

use serde::Serialize;

use simpleapi_core::ConnectionType;

use crate::cli::GlobalOpts;
use crate::config::Settings;
use crate::error::CliError;
use crate::output;

#[derive(Debug, Serialize)]
struct Status {
    target: String,
    reachable: bool,
    connection: ConnectionType,
}

pub async fn handle(settings: &Settings, global: &GlobalOpts) -> Result<(), CliError> {
    let monitor = settings.monitor();
    let state = monitor.probe_now().await;
    tracing::debug!(target = %settings.probe, reachable = state.is_reachable, "probe finished");

    let status = Status {
        target: settings.probe.clone(),
        reachable: state.is_reachable,
        connection: state.connection,
    };
    let out = output::render_single(
        global.output,
        &status,
        |s| {
            output::render_pairs(&[
                ("target", s.target.clone()),
                ("reachable", s.reachable.to_string()),
                ("connection", s.connection.to_string()),
            ])
        },
        |s| String::from(if s.reachable { "reachable" } else { "unreachable" }),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}
