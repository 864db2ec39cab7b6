//! Clap derive structures for the `simpleapi` CLI.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use simpleapi_core::{Method, ParamsEncoding};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// simpleapi -- typed fetch with offline-aware retry and local persistence
#[derive(Debug, Parser)]
#[command(
    name = "simpleapi",
    version,
    about = "Fetch JSON records, persist them locally, and manage coordinator defaults",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Record store file (overrides settings)
    #[arg(long, env = "SIMPLEAPI_STORE", global = true)]
    pub store: Option<PathBuf>,

    /// Reachability probe target as host:port (overrides settings)
    #[arg(long, env = "SIMPLEAPI_PROBE", global = true)]
    pub probe: Option<String>,

    /// Request timeout in seconds (overrides settings)
    #[arg(long, env = "SIMPLEAPI_TIMEOUT", global = true)]
    pub timeout: Option<u64>,

    /// Accept invalid TLS certificates
    #[arg(long, short = 'k', env = "SIMPLEAPI_INSECURE", global = true)]
    pub insecure: bool,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "SIMPLEAPI_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Plain text, one value per line (scripting)
    Plain,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch and inspect pet records
    #[command(alias = "p")]
    Pets(PetsArgs),

    /// Show or change coordinator defaults stored with the records
    Config(ConfigArgs),

    /// Show or initialize CLI settings
    Settings(SettingsArgs),

    /// Probe the network and report reachability
    Status,
}

// ── Pets ─────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct PetsArgs {
    #[command(subcommand)]
    pub command: PetsCommand,
}

#[derive(Debug, Subcommand)]
pub enum PetsCommand {
    /// Fetch pets from a URL
    Fetch(FetchArgs),

    /// List stored pets
    #[command(alias = "ls")]
    List,

    /// Delete every stored pet
    Clear,
}

#[derive(Debug, Args)]
pub struct FetchArgs {
    /// Endpoint URL
    pub url: String,

    /// Expect a single object instead of an array
    #[arg(long)]
    pub one: bool,

    /// HTTP method (defaults to the coordinator default)
    #[arg(long, short = 'X', value_parser = parse_method)]
    pub method: Option<Method>,

    /// Parameter encoding (defaults to the coordinator default)
    #[arg(long, value_parser = parse_encoding)]
    pub encoding: Option<ParamsEncoding>,

    /// Request parameter as key=value (repeatable)
    #[arg(long = "param", short = 'd', value_parser = parse_key_val)]
    pub params: Vec<(String, String)>,

    /// Request header as key=value (repeatable); replaces default headers
    #[arg(long = "header", short = 'H', value_parser = parse_key_val)]
    pub headers: Vec<(String, String)>,

    /// Always persist the response
    #[arg(long, conflicts_with = "no_persist")]
    pub persist: bool,

    /// Never persist the response
    #[arg(long)]
    pub no_persist: bool,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show the stored coordinator defaults
    Show,

    /// Change one or more defaults
    Set(ConfigSetArgs),

    /// Manage default headers
    Header(HeaderArgs),
}

#[derive(Debug, Args)]
pub struct ConfigSetArgs {
    /// Persist responses unless a request says otherwise
    #[arg(long)]
    pub auto_persist: Option<bool>,

    /// Replay the last offline request on reconnect
    #[arg(long)]
    pub replay: Option<bool>,

    /// Default HTTP method
    #[arg(long, value_parser = parse_method)]
    pub method: Option<Method>,

    /// Default parameter encoding
    #[arg(long, value_parser = parse_encoding)]
    pub encoding: Option<ParamsEncoding>,
}

#[derive(Debug, Args)]
pub struct HeaderArgs {
    #[command(subcommand)]
    pub command: HeaderCommand,
}

#[derive(Debug, Subcommand)]
pub enum HeaderCommand {
    /// Add or replace a default header
    Set { name: String, value: String },

    /// Remove a default header
    #[command(alias = "rm")]
    Remove { name: String },

    /// Remove every default header
    Clear,
}

// ── Settings ─────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct SettingsArgs {
    #[command(subcommand)]
    pub command: SettingsCommand,
}

#[derive(Debug, Subcommand)]
pub enum SettingsCommand {
    /// Show effective settings (file, environment, and flags merged)
    Show,

    /// Print the settings file path
    Path,

    /// Write a settings file with the current effective values
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

// ── Value parsers ────────────────────────────────────────────────────

fn parse_key_val(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{raw}'"))?;
    if key.is_empty() {
        return Err(format!("empty key in '{raw}'"));
    }
    Ok((key.to_owned(), value.to_owned()))
}

fn parse_method(raw: &str) -> Result<Method, String> {
    raw.parse()
        .map_err(|_| format!("unknown method '{raw}' (GET, POST, PUT, PATCH, DELETE)"))
}

fn parse_encoding(raw: &str) -> Result<ParamsEncoding, String> {
    raw.parse()
        .map_err(|_| format!("unknown encoding '{raw}' (standard, http_body, json)"))
}
