// ── Per-call request description ──
//
// Every field except the URL may be left unset, in which case the
// coordinator-wide default applies at dispatch time.

use serde_json::Value;

use simpleapi_api::{Headers, HttpRequest, Method, Params, ParamsEncoding};

use crate::config::CoordinatorConfig;

/// Whether a successful response gets written to the store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Persist {
    /// Follow the coordinator's `auto_persist` setting.
    #[default]
    Default,
    Always,
    Never,
}

impl Persist {
    pub fn resolve(self, auto_persist: bool) -> bool {
        match self {
            Self::Default => auto_persist,
            Self::Always => true,
            Self::Never => false,
        }
    }
}

impl From<Option<bool>> for Persist {
    fn from(flag: Option<bool>) -> Self {
        match flag {
            None => Self::Default,
            Some(true) => Self::Always,
            Some(false) => Self::Never,
        }
    }
}

/// Full description of one HTTP call.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestSpec {
    pub url: String,
    pub method: Option<Method>,
    pub params: Option<Params>,
    pub encoding: Option<ParamsEncoding>,
    pub headers: Option<Headers>,
    pub persist: Persist,
}

impl RequestSpec {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: None,
            params: None,
            encoding: None,
            headers: None,
            persist: Persist::Default,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(url).method(Method::Get)
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self::new(url).method(Method::Post)
    }

    pub fn method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    pub fn param(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params
            .get_or_insert_with(Params::new)
            .insert(name.into(), value.into());
        self
    }

    pub fn params(mut self, params: Params) -> Self {
        self.params = Some(params);
        self
    }

    pub fn encoding(mut self, encoding: ParamsEncoding) -> Self {
        self.encoding = Some(encoding);
        self
    }

    /// Add one header. Any call-site header replaces the default header map
    /// as a whole, it is not merged into it.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .get_or_insert_with(Headers::new)
            .insert(name.into(), value.into());
        self
    }

    pub fn headers(mut self, headers: Headers) -> Self {
        self.headers = Some(headers);
        self
    }

    pub fn persist(mut self, persist: Persist) -> Self {
        self.persist = persist;
        self
    }

    /// Fill unset fields from `config`. Returns the request to send and
    /// whether the response should be persisted.
    pub fn resolve(&self, config: &CoordinatorConfig) -> (HttpRequest, bool) {
        let request = HttpRequest {
            url: self.url.clone(),
            method: self.method.unwrap_or(config.default_method),
            params: self.params.clone(),
            encoding: self.encoding.unwrap_or(config.default_encoding),
            headers: self
                .headers
                .clone()
                .or_else(|| config.default_headers.clone()),
        };
        (request, self.persist.resolve(config.auto_persist))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn config() -> CoordinatorConfig {
        CoordinatorConfig {
            auto_persist: true,
            replay_last_request_on_reconnect: true,
            default_method: Method::Post,
            default_encoding: ParamsEncoding::HttpBody,
            default_headers: Some(Headers::from([("token".into(), "default".into())])),
        }
    }

    #[test]
    fn unset_fields_take_defaults() {
        let (request, persist) = RequestSpec::new("http://api/pets").resolve(&config());

        assert_eq!(request.method, Method::Post);
        assert_eq!(request.encoding, ParamsEncoding::HttpBody);
        assert_eq!(
            request.headers,
            Some(Headers::from([("token".into(), "default".into())]))
        );
        assert!(persist);
    }

    #[test]
    fn call_site_values_win() {
        let spec = RequestSpec::get("http://api/pets")
            .encoding(ParamsEncoding::Standard)
            .header("token", "mine")
            .persist(Persist::Never);

        let (request, persist) = spec.resolve(&config());

        assert_eq!(request.method, Method::Get);
        assert_eq!(request.encoding, ParamsEncoding::Standard);
        assert_eq!(
            request.headers,
            Some(Headers::from([("token".into(), "mine".into())]))
        );
        assert!(!persist);
    }

    #[test]
    fn persist_is_tri_state() {
        assert!(Persist::Default.resolve(true));
        assert!(!Persist::Default.resolve(false));
        assert!(Persist::Always.resolve(false));
        assert!(!Persist::Never.resolve(true));
        assert_eq!(Persist::from(None), Persist::Default);
        assert_eq!(Persist::from(Some(false)), Persist::Never);
    }

    #[test]
    fn params_accumulate() {
        let spec = RequestSpec::new("http://api/pets")
            .param("type", "dog")
            .param("limit", 10);
        let params = spec.params.unwrap_or_default();
        assert_eq!(params.len(), 2);
        assert_eq!(params["limit"], 10);
    }
}
