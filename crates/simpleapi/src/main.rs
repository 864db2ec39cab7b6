mod cli;
mod commands;
mod config;
mod error;
mod model;
mod output;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.global.verbose);

    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let settings = config::load_settings(&cli.global)?;

    match cli.command {
        // Neither needs the record store
        Command::Settings(args) => commands::settings::handle(args, &settings, &cli.global),
        Command::Status => commands::status::handle(&settings, &cli.global).await,

        cmd => {
            let coordinator = commands::start_coordinator(&settings).await?;

            tracing::debug!(command = ?cmd, "dispatching command");
            let result = commands::dispatch(cmd, &coordinator, &cli.global).await;
            coordinator.shutdown().await;
            result
        }
    }
}
