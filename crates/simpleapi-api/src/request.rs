// ── Resolved request model ──
//
// What a transport receives once every per-call override and every
// coordinator-wide default has been applied.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::{Display, EnumString};

/// Query or body parameters.
pub type Params = serde_json::Map<String, Value>;

/// Request headers, name -> value.
pub type Headers = BTreeMap<String, String>;

/// HTTP method.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum Method {
    #[default]
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    /// Whether `Standard` encoding puts parameters in the query string.
    pub fn encodes_params_in_query(self) -> bool {
        matches!(self, Self::Get | Self::Delete)
    }
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => Self::GET,
            Method::Post => Self::POST,
            Method::Put => Self::PUT,
            Method::Patch => Self::PATCH,
            Method::Delete => Self::DELETE,
        }
    }
}

/// Where request parameters go.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum ParamsEncoding {
    /// Query string for GET and DELETE, form body for everything else.
    #[default]
    Standard,
    /// Always a form-urlencoded body.
    HttpBody,
    /// JSON object body.
    Json,
}

/// Where a given request's parameters end up once method and encoding are known.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamsPlacement {
    Query,
    Form,
    Json,
}

impl ParamsEncoding {
    pub fn placement(self, method: Method) -> ParamsPlacement {
        match self {
            Self::Standard if method.encodes_params_in_query() => ParamsPlacement::Query,
            Self::Standard | Self::HttpBody => ParamsPlacement::Form,
            Self::Json => ParamsPlacement::Json,
        }
    }
}

/// A fully resolved HTTP call.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub url: String,
    pub method: Method,
    pub params: Option<Params>,
    pub encoding: ParamsEncoding,
    pub headers: Option<Headers>,
}

impl HttpRequest {
    /// A bare request with no parameters or headers.
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method,
            params: None,
            encoding: ParamsEncoding::default(),
            headers: None,
        }
    }

    /// Parameters flattened to `(name, text)` pairs for query or form encoding.
    ///
    /// Strings are sent verbatim, other scalars as their JSON text, and
    /// arrays/objects as compact JSON.
    pub fn param_pairs(&self) -> Vec<(String, String)> {
        self.params
            .iter()
            .flatten()
            .map(|(name, value)| (name.clone(), param_text(value)))
            .collect()
    }
}

fn param_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
