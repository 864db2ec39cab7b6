// HTTP client
//
// Wraps `reqwest::Client`: applies method, parameter placement, and headers
// from a resolved `HttpRequest`, checks the status, and hands back the JSON
// body. Decoding into typed records happens one layer up.

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, trace};
use url::Url;

use crate::error::Error;
use crate::request::{HttpRequest, ParamsPlacement};
use crate::transport::TransportConfig;

/// Something that can perform a resolved HTTP request.
///
/// `Ok(None)` means the server answered 2xx with nothing to decode: an empty
/// body or a literal JSON `null`.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<Option<Value>, Error>;
}

/// `reqwest`-backed [`Transport`].
#[derive(Debug, Clone)]
pub struct HttpClient {
    http: reqwest::Client,
}

impl HttpClient {
    /// Create a new client from a `TransportConfig`.
    pub fn new(transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self { http })
    }

    /// Wrap an existing `reqwest::Client`.
    pub fn with_client(http: reqwest::Client) -> Self {
        Self { http }
    }

    fn build(&self, request: &HttpRequest) -> Result<reqwest::RequestBuilder, Error> {
        let url = Url::parse(&request.url)?;
        let mut builder = self.http.request(request.method.into(), url);

        if let Some(headers) = &request.headers {
            for (name, value) in headers {
                builder = builder.header(name.as_str(), value.as_str());
            }
        }

        if let Some(params) = request.params.as_ref().filter(|p| !p.is_empty()) {
            builder = match request.encoding.placement(request.method) {
                ParamsPlacement::Query => builder.query(&request.param_pairs()),
                ParamsPlacement::Form => builder.form(&request.param_pairs()),
                ParamsPlacement::Json => builder.json(params),
            };
        }

        Ok(builder)
    }

    async fn handle_response(&self, resp: reqwest::Response) -> Result<Option<Value>, Error> {
        let status = resp.status();
        let body = resp.text().await?;

        if !status.is_success() {
            return Err(Error::Status {
                status: status.as_u16(),
                body,
            });
        }

        if body.trim().is_empty() {
            trace!(status = status.as_u16(), "empty response body");
            return Ok(None);
        }

        let value: Value = serde_json::from_str(&body).map_err(|e| {
            let preview: String = body.chars().take(200).collect();
            Error::Deserialization {
                message: format!("{e} (body preview: {preview:?})"),
                body: body.clone(),
            }
        })?;

        Ok((!value.is_null()).then_some(value))
    }
}

#[async_trait]
impl Transport for HttpClient {
    async fn send(&self, request: HttpRequest) -> Result<Option<Value>, Error> {
        debug!(method = %request.method, url = %request.url, "sending request");

        let resp = self.build(&request)?.send().await?;
        self.handle_response(resp).await
    }
}
