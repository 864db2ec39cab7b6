//! Settings subcommand handlers.

use crate::cli::{GlobalOpts, OutputFormat, SettingsArgs, SettingsCommand};
use crate::config::{self, Settings};
use crate::error::CliError;
use crate::output;

pub fn handle(args: SettingsArgs, settings: &Settings, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        SettingsCommand::Show => {
            let out = match global.output {
                OutputFormat::Json => serde_json::to_string_pretty(settings)?,
                OutputFormat::Table | OutputFormat::Plain => config::render_toml(settings)?,
            };
            output::print_output(out.trim_end(), global.quiet);
            Ok(())
        }

        SettingsCommand::Path => {
            output::print_output(&config::settings_path().display().to_string(), global.quiet);
            Ok(())
        }

        SettingsCommand::Init { force } => {
            let path = config::settings_path();
            if path.exists() && !force {
                return Err(CliError::SettingsExist {
                    path: path.display().to_string(),
                });
            }
            let written = config::save_settings(settings)?;
            if !global.quiet {
                eprintln!("Wrote {}", written.display());
            }
            Ok(())
        }
    }
}
