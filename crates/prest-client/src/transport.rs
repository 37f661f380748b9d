//! HTTP transport.
//!
//! The query builder only needs "send a request, get status and body". That
//! capability is the [`Transport`] trait; [`UreqTransport`] is the default
//! implementation on top of a blocking `ureq` agent.

use std::time::Duration;

use serde_json::Value;
use tracing::trace;
use ureq::{
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        Response,
    },
    typestate::{WithBody, WithoutBody},
    Agent, Body, Proxy, RequestBuilder,
};

use crate::{
    error::{PrestError, Result},
    method::Method,
};

/// A fully rendered request.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    /// Value of the `Authorization` header, if any.
    pub authorization: Option<String>,
    /// JSON payload; only sent for methods with a body.
    pub body: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub status_text: String,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

pub trait Transport: Send + Sync {
    /// Perform one request. Non-success statuses are returned as responses;
    /// only faults below HTTP (connection, TLS, I/O) are errors.
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse>;
}

#[derive(Clone, Debug)]
pub struct TransportConfig {
    pub user_agent: Option<String>,
    pub proxy: Option<Proxy>,
    pub timeout: Option<Duration>,
    /// Largest response body read, in bytes. `None` reads bodies of any size.
    pub body_limit: Option<u64>,
}

impl Default for TransportConfig {
    /// Sets a user agent of `prest-client/<version>` and leaves proxy,
    /// timeout and body limit unset.
    ///
    /// # Examples
    ///
    /// ```
    /// use prest_client::transport::TransportConfig;
    ///
    /// let cfg = TransportConfig::default();
    /// assert!(cfg.user_agent.unwrap().starts_with("prest-client/"));
    /// assert!(cfg.proxy.is_none());
    /// assert!(cfg.timeout.is_none());
    /// assert!(cfg.body_limit.is_none());
    /// ```
    fn default() -> Self {
        Self {
            user_agent: Some(concat!("prest-client/", env!("CARGO_PKG_VERSION")).into()),
            proxy: None,
            timeout: None,
            body_limit: None,
        }
    }
}

impl TransportConfig {
    /// Builds an `Agent` with the configured proxy, global timeout and user
    /// agent. HTTP error statuses are handed back as responses so the status
    /// text can be reported.
    pub fn build(&self) -> Agent {
        let mut config = Agent::config_builder()
            .proxy(self.proxy.clone())
            .timeout_global(self.timeout)
            .http_status_as_error(false);

        if let Some(user_agent) = &self.user_agent {
            config = config.user_agent(user_agent);
        }

        config.build().into()
    }
}

/// [`Transport`] backed by a `ureq` agent.
#[derive(Clone)]
pub struct UreqTransport {
    agent: Agent,
    body_limit: u64,
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new(&TransportConfig::default())
    }
}

impl UreqTransport {
    pub fn new(config: &TransportConfig) -> Self {
        Self {
            agent: config.build(),
            body_limit: config.body_limit.unwrap_or(u64::MAX),
        }
    }

    /// Wraps an existing agent. Response bodies are read without a size limit.
    pub fn from_agent(agent: Agent) -> Self {
        Self {
            agent,
            body_limit: u64::MAX,
        }
    }

    fn without_body(
        req: RequestBuilder<WithoutBody>,
        request: &HttpRequest,
    ) -> Result<Response<Body>> {
        Ok(with_authorization(req, request).call()?)
    }

    fn with_body(req: RequestBuilder<WithBody>, request: &HttpRequest) -> Result<Response<Body>> {
        let req = with_authorization(req, request);
        let response = match &request.body {
            Some(body) => {
                let payload = serde_json::to_vec(body).map_err(|e| {
                    PrestError::request_failed(format!("failed to encode request body: {e}"))
                })?;
                req.header(CONTENT_TYPE, "application/json")
                    .send(&payload[..])?
            }
            None => req.send_empty()?,
        };
        Ok(response)
    }
}

fn with_authorization<B>(req: RequestBuilder<B>, request: &HttpRequest) -> RequestBuilder<B> {
    match &request.authorization {
        Some(value) => req.header(AUTHORIZATION, value),
        None => req,
    }
}

impl Transport for UreqTransport {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse> {
        let url = request.url.as_str();
        let result = match request.method {
            Method::Get => Self::without_body(self.agent.get(url), request),
            Method::Delete => Self::without_body(self.agent.delete(url), request),
            Method::Post => Self::with_body(self.agent.post(url), request),
            Method::Put => Self::with_body(self.agent.put(url), request),
        };

        let mut response = result?;
        let status = response.status();
        // ureq caps bodies at 10 MiB unless a limit is given
        let body = response
            .body_mut()
            .with_config()
            .limit(self.body_limit)
            .read_to_string()?;

        trace!(status = status.as_u16(), bytes = body.len(), "received response");

        Ok(HttpResponse {
            status: status.as_u16(),
            status_text: status
                .canonical_reason()
                .map(str::to_string)
                .unwrap_or_else(|| format!("HTTP {}", status.as_u16())),
            body,
        })
    }
}
