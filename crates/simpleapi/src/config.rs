//! CLI-owned settings: where the store lives and how reachability is
//! probed. Layered as built-in defaults, then the TOML settings file, then
//! `SIMPLEAPI_*` environment variables, then command-line flags.
//!
//! Coordinator defaults (method, headers, ...) are not here; they live in
//! the record store and are managed with `simpleapi config`.

use std::path::PathBuf;
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

use simpleapi_core::reachability::DEFAULT_PROBE_TARGET;
use simpleapi_api::TlsMode;
use simpleapi_core::{FileStore, ProbeMonitor, TransportConfig};

use crate::cli::GlobalOpts;
use crate::error::CliError;

// ── Settings ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Settings {
    /// Record store file. Falls back to the platform data directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store: Option<PathBuf>,

    /// `host:port` probed for reachability.
    #[serde(default = "default_probe")]
    pub probe: String,

    /// Seconds between reachability probes.
    #[serde(default = "default_probe_interval")]
    pub probe_interval: u64,

    /// Seconds before a probe connection attempt gives up.
    #[serde(default = "default_probe_timeout")]
    pub probe_timeout: u64,

    /// HTTP request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Skip TLS certificate verification.
    #[serde(default)]
    pub insecure: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            store: None,
            probe: default_probe(),
            probe_interval: default_probe_interval(),
            probe_timeout: default_probe_timeout(),
            timeout: default_timeout(),
            insecure: false,
        }
    }
}

fn default_probe() -> String {
    DEFAULT_PROBE_TARGET.into()
}

fn default_probe_interval() -> u64 {
    5
}

fn default_probe_timeout() -> u64 {
    3
}

fn default_timeout() -> u64 {
    30
}

impl Settings {
    /// Apply command-line overrides.
    fn with_flags(mut self, global: &GlobalOpts) -> Self {
        if let Some(ref store) = global.store {
            self.store = Some(store.clone());
        }
        if let Some(ref probe) = global.probe {
            self.probe.clone_from(probe);
        }
        if let Some(timeout) = global.timeout {
            self.timeout = timeout;
        }
        if global.insecure {
            self.insecure = true;
        }
        self
    }

    pub fn open_store(&self) -> Result<FileStore, CliError> {
        Ok(match self.store {
            Some(ref path) => FileStore::open(path.clone())?,
            None => FileStore::open_default()?,
        })
    }

    pub fn monitor(&self) -> ProbeMonitor {
        ProbeMonitor::new(self.probe.clone())
            .with_interval(Duration::from_secs(self.probe_interval.max(1)))
            .with_timeout(Duration::from_secs(self.probe_timeout.max(1)))
    }

    pub fn transport(&self) -> TransportConfig {
        let mut transport =
            TransportConfig::default().with_timeout(Duration::from_secs(self.timeout));
        if self.insecure {
            transport.tls = TlsMode::DangerAcceptInvalid;
        }
        transport
    }
}

// ── Settings file path ───────────────────────────────────────────────

/// Resolve the settings file path via XDG / platform conventions.
pub fn settings_path() -> PathBuf {
    ProjectDirs::from("com", "simpleapi", "simpleapi").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("settings.toml");
            p
        },
        |dirs| dirs.config_dir().join("settings.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("simpleapi");
    p
}

// ── Loading / saving ─────────────────────────────────────────────────

/// Load settings from defaults, file, and environment, then apply flags.
pub fn load_settings(global: &GlobalOpts) -> Result<Settings, CliError> {
    let settings: Settings = Figment::new()
        .merge(Serialized::defaults(Settings::default()))
        .merge(Toml::file(settings_path()))
        .merge(Env::prefixed("SIMPLEAPI_").only(&[
            "store",
            "probe",
            "probe_interval",
            "probe_timeout",
            "timeout",
            "insecure",
        ]))
        .extract()?;
    Ok(settings.with_flags(global))
}

/// Serialize settings to TOML and write them to the canonical path.
pub fn save_settings(settings: &Settings) -> Result<PathBuf, CliError> {
    let path = settings_path();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&path, render_toml(settings)?)?;
    Ok(path)
}

pub fn render_toml(settings: &Settings) -> Result<String, CliError> {
    toml::to_string_pretty(settings).map_err(|e| CliError::Validation {
        field: "settings".into(),
        reason: format!("failed to serialize settings: {e}"),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn toml_layer_overrides_defaults() {
        figment::Jail::expect_with(|jail| {
            jail.create_file("settings.toml", "probe = \"127.0.0.1:80\"\ntimeout = 5\n")?;
            let settings: Settings = Figment::new()
                .merge(Serialized::defaults(Settings::default()))
                .merge(Toml::file("settings.toml"))
                .extract()?;
            assert_eq!(settings.probe, "127.0.0.1:80");
            assert_eq!(settings.timeout, 5);
            assert_eq!(settings.probe_interval, default_probe_interval());
            Ok(())
        });
    }

    #[test]
    fn insecure_switches_tls_mode() {
        assert_eq!(Settings::default().transport().tls, TlsMode::System);
        let settings = Settings {
            insecure: true,
            timeout: 9,
            ..Settings::default()
        };
        let transport = settings.transport();
        assert_eq!(transport.tls, TlsMode::DangerAcceptInvalid);
        assert_eq!(transport.timeout, Duration::from_secs(9));
    }

    #[test]
    fn settings_render_as_toml() {
        let text = render_toml(&Settings::default()).unwrap();
        assert!(text.contains("probe = "));
        assert!(!text.contains("store"));
    }
}
