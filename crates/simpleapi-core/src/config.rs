// ── Coordinator-wide defaults and their persisted form ──
//
// The live config is a plain value. What lands in the store is
// `StoredConfig`, a single record under a fixed identity, with headers
// flattened into an ordered list of pairs.

use serde::{Deserialize, Serialize};

use simpleapi_api::{Headers, Method, ParamsEncoding};

use crate::record::Record;

/// Identity of the one persisted config record.
pub const CONFIG_KEY: &str = "coordinator";

/// Defaults applied to every request that does not override them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoordinatorConfig {
    /// Persist decoded responses when the call site leaves it unset.
    pub auto_persist: bool,
    /// Replay the remembered offline request when connectivity returns.
    pub replay_last_request_on_reconnect: bool,
    pub default_method: Method,
    pub default_encoding: ParamsEncoding,
    /// `None` means no default headers, which is distinct from an empty map.
    pub default_headers: Option<Headers>,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            auto_persist: true,
            replay_last_request_on_reconnect: true,
            default_method: Method::Get,
            default_encoding: ParamsEncoding::Standard,
            default_headers: None,
        }
    }
}

/// One persisted header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderPair {
    pub key: String,
    pub value: String,
}

/// Persisted form of [`CoordinatorConfig`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredConfig {
    pub id: String,
    pub auto_persist: bool,
    pub replay_last_request_on_reconnect: bool,
    pub default_method: Method,
    pub default_encoding: ParamsEncoding,
    #[serde(default)]
    pub default_headers: Vec<HeaderPair>,
}

impl Record for StoredConfig {
    const KIND: &'static str = "simpleapi.config";

    fn identity(&self) -> String {
        self.id.clone()
    }
}

impl Default for StoredConfig {
    fn default() -> Self {
        Self::from(&CoordinatorConfig::default())
    }
}

impl From<&CoordinatorConfig> for StoredConfig {
    fn from(config: &CoordinatorConfig) -> Self {
        Self {
            id: CONFIG_KEY.to_owned(),
            auto_persist: config.auto_persist,
            replay_last_request_on_reconnect: config.replay_last_request_on_reconnect,
            default_method: config.default_method,
            default_encoding: config.default_encoding,
            default_headers: config
                .default_headers
                .iter()
                .flatten()
                .map(|(key, value)| HeaderPair {
                    key: key.clone(),
                    value: value.clone(),
                })
                .collect(),
        }
    }
}

impl From<StoredConfig> for CoordinatorConfig {
    fn from(stored: StoredConfig) -> Self {
        let default_headers = (!stored.default_headers.is_empty()).then(|| {
            stored
                .default_headers
                .into_iter()
                .map(|pair| (pair.key, pair.value))
                .collect()
        });

        Self {
            auto_persist: stored.auto_persist,
            replay_last_request_on_reconnect: stored.replay_last_request_on_reconnect,
            default_method: stored.default_method,
            default_encoding: stored.default_encoding,
            default_headers,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn headers_survive_conversion() {
        let config = CoordinatorConfig {
            default_headers: Some(Headers::from([("token".into(), "abc".into())])),
            ..CoordinatorConfig::default()
        };

        let stored = StoredConfig::from(&config);
        assert_eq!(
            stored.default_headers,
            vec![HeaderPair {
                key: "token".into(),
                value: "abc".into()
            }]
        );

        let back = CoordinatorConfig::from(stored);
        assert_eq!(back, config);
    }

    #[test]
    fn absent_headers_stay_absent() {
        let stored = StoredConfig::from(&CoordinatorConfig::default());
        assert!(stored.default_headers.is_empty());
        assert_eq!(CoordinatorConfig::from(stored).default_headers, None);
    }

    #[test]
    fn empty_header_map_reloads_as_absent() {
        let config = CoordinatorConfig {
            default_headers: Some(Headers::new()),
            ..CoordinatorConfig::default()
        };
        let back = CoordinatorConfig::from(StoredConfig::from(&config));
        assert_eq!(back.default_headers, None);
    }

    #[test]
    fn stored_config_uses_fixed_identity() {
        let stored = StoredConfig::default();
        assert_eq!(stored.identity(), CONFIG_KEY);
    }

    #[test]
    fn stored_config_json_shape() {
        let json = serde_json::to_value(StoredConfig::default()).unwrap();
        assert_eq!(json["default_method"], "GET");
        assert_eq!(json["default_encoding"], "standard");
        assert_eq!(json["default_headers"], serde_json::json!([]));
    }
}
