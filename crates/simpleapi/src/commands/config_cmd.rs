//! Config subcommand handlers. These edit the coordinator defaults kept in
//! the record store, not the CLI settings file.

use serde::Serialize;

use simpleapi_core::{Coordinator, CoordinatorConfig, Headers, Method, ParamsEncoding};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts, HeaderCommand};
use crate::error::CliError;
use crate::output;

/// Serializable view of [`CoordinatorConfig`].
#[derive(Debug, Serialize)]
struct ConfigView {
    auto_persist: bool,
    replay_last_request_on_reconnect: bool,
    default_method: Method,
    default_encoding: ParamsEncoding,
    default_headers: Option<Headers>,
}

impl From<CoordinatorConfig> for ConfigView {
    fn from(c: CoordinatorConfig) -> Self {
        Self {
            auto_persist: c.auto_persist,
            replay_last_request_on_reconnect: c.replay_last_request_on_reconnect,
            default_method: c.default_method,
            default_encoding: c.default_encoding,
            default_headers: c.default_headers,
        }
    }
}

fn detail(view: &ConfigView) -> String {
    let headers = view.default_headers.as_ref().map_or_else(
        || "(none)".to_string(),
        |h| {
            h.iter()
                .map(|(k, v)| format!("{k}: {v}"))
                .collect::<Vec<_>>()
                .join("\n")
        },
    );
    output::render_pairs(&[
        ("auto_persist", view.auto_persist.to_string()),
        ("replay_on_reconnect", view.replay_last_request_on_reconnect.to_string()),
        ("default_method", view.default_method.to_string()),
        ("default_encoding", view.default_encoding.to_string()),
        ("default_headers", headers),
    ])
}

fn show(config: CoordinatorConfig, global: &GlobalOpts) -> Result<(), CliError> {
    let view = ConfigView::from(config);
    let out = output::render_single(global.output, &view, detail, |_| "config".into())?;
    output::print_output(&out, global.quiet);
    Ok(())
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    coordinator: &Coordinator,
    args: ConfigArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Show => show(coordinator.config(), global),

        ConfigCommand::Set(set) => {
            if set.auto_persist.is_none()
                && set.replay.is_none()
                && set.method.is_none()
                && set.encoding.is_none()
            {
                return Err(CliError::Validation {
                    field: "config set".into(),
                    reason: "nothing to change; pass at least one of --auto-persist, --replay, --method, --encoding".into(),
                });
            }

            let updated = coordinator
                .update_config(|c| {
                    if let Some(v) = set.auto_persist {
                        c.auto_persist = v;
                    }
                    if let Some(v) = set.replay {
                        c.replay_last_request_on_reconnect = v;
                    }
                    if let Some(m) = set.method {
                        c.default_method = m;
                    }
                    if let Some(e) = set.encoding {
                        c.default_encoding = e;
                    }
                })
                .await?;
            show(updated, global)
        }

        ConfigCommand::Header(header) => {
            let updated = match header.command {
                HeaderCommand::Set { name, value } => {
                    coordinator
                        .update_config(|c| {
                            c.default_headers
                                .get_or_insert_with(Headers::new)
                                .insert(name, value);
                        })
                        .await?
                }
                HeaderCommand::Remove { name } => {
                    coordinator
                        .update_config(|c| {
                            if let Some(headers) = c.default_headers.as_mut() {
                                headers.remove(&name);
                            }
                            if c.default_headers.as_ref().is_some_and(Headers::is_empty) {
                                c.default_headers = None;
                            }
                        })
                        .await?
                }
                HeaderCommand::Clear => {
                    coordinator.set_default_headers(None).await?;
                    coordinator.config()
                }
            };
            show(updated, global)
        }
    }
}
