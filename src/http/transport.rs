//! Transport port and the reqwest-backed implementation
//!
//! A `Transport` carries one `Exchange` to completion and reports the final
//! status, status text and body. There are no progress notifications: the
//! returned future resolves only once the exchange is complete.

use std::sync::{Arc, OnceLock};

use futures_util::future::{BoxFuture, FutureExt};
use reqwest::{Client, ClientBuilder, Method};
use url::Url;

use crate::config::TransportConfig;
use crate::error::{FluentReqError, Result};

/// An opened exchange: method, URL, headers and the body to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exchange {
    pub method: String,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl Exchange {
    pub fn open(method: impl Into<String>, url: impl Into<String>) -> Self {
        Exchange {
            method: method.into(),
            url: url.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn set_request_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.headers.push((name.into(), value.into()));
    }

    pub fn with_body(mut self, body: Option<String>) -> Self {
        self.body = body;
        self
    }
}

/// The terminal state of an exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub status: u16,
    pub status_text: String,
    pub body: String,
}

impl Completion {
    /// An exchange that never produced an HTTP response.
    ///
    /// Status `0` mirrors what a browser reports for network failures.
    pub fn failed(reason: impl Into<String>) -> Self {
        Completion {
            status: 0,
            status_text: reason.into(),
            body: String::new(),
        }
    }
}

/// Carries an exchange over the wire.
pub trait Transport: Send + Sync {
    fn send(&self, exchange: Exchange) -> BoxFuture<'_, Result<Completion>>;
}

/// Transport backed by a shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
    base_url: Option<Url>,
}

impl ReqwestTransport {
    /// Create a new transport with the given configuration
    pub fn new(config: &TransportConfig) -> Result<Self> {
        let mut builder = ClientBuilder::new().redirect(if config.follow_redirects {
            reqwest::redirect::Policy::default()
        } else {
            reqwest::redirect::Policy::none()
        });

        if let Some(user_agent) = &config.user_agent {
            builder = builder.user_agent(user_agent);
        }

        if let Some(proxy_url) = &config.proxy {
            let proxy = reqwest::Proxy::all(proxy_url)
                .map_err(|e| FluentReqError::Config(format!("Invalid proxy: {}", e)))?;
            builder = builder.proxy(proxy);
        }

        if !config.verify_certs {
            builder = builder.danger_accept_invalid_certs(true);
        }

        let base_url = match &config.base_url {
            Some(raw) => Some(Url::parse(raw).map_err(|e| {
                FluentReqError::InvalidUrl(format!("Invalid base URL '{}': {}", raw, e))
            })?),
            None => None,
        };

        let client = builder.build().map_err(FluentReqError::Http)?;

        Ok(Self { client, base_url })
    }

    async fn execute(&self, exchange: Exchange) -> Result<Completion> {
        let method = Method::from_bytes(exchange.method.as_bytes())
            .map_err(|_| FluentReqError::InvalidMethod(exchange.method.clone()))?;
        let url = self.resolve_url(&exchange.url)?;

        log::debug!("> {} {}", method, url);
        let mut request = self.client.request(method, url);
        for (name, value) in &exchange.headers {
            log::trace!("> {}: {}", name, value);
            request = request.header(name.as_str(), value.as_str());
        }
        if let Some(body) = exchange.body {
            request = request.body(body);
        }

        let response = request.send().await.map_err(FluentReqError::Http)?;
        let status = response.status();
        log::debug!("< {}", status);

        let body = response.text().await.map_err(FluentReqError::Http)?;
        Ok(Completion {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
            body,
        })
    }

    fn resolve_url(&self, raw: &str) -> Result<Url> {
        match Url::parse(raw) {
            Ok(url) => Ok(url),
            Err(url::ParseError::RelativeUrlWithoutBase) => match &self.base_url {
                Some(base) => base.join(raw).map_err(|e| {
                    FluentReqError::InvalidUrl(format!("Invalid URL '{}': {}", raw, e))
                }),
                None => Err(FluentReqError::InvalidUrl(format!(
                    "Relative URL '{}' requires a base URL",
                    raw
                ))),
            },
            Err(e) => Err(FluentReqError::InvalidUrl(format!(
                "Invalid URL '{}': {}",
                raw, e
            ))),
        }
    }
}

impl Transport for ReqwestTransport {
    fn send(&self, exchange: Exchange) -> BoxFuture<'_, Result<Completion>> {
        self.execute(exchange).boxed()
    }
}

static DEFAULT_TRANSPORT: OnceLock<Arc<dyn Transport>> = OnceLock::new();

/// Install the process-wide transport used by builders without their own.
///
/// Returns `false` when a default was already installed or built.
pub fn set_default_transport(transport: Arc<dyn Transport>) -> bool {
    DEFAULT_TRANSPORT.set(transport).is_ok()
}

/// The process-wide transport, built from `TransportConfig::default()` on
/// first use unless one was installed.
pub fn default_transport() -> Result<Arc<dyn Transport>> {
    if let Some(transport) = DEFAULT_TRANSPORT.get() {
        return Ok(Arc::clone(transport));
    }
    let built: Arc<dyn Transport> = Arc::new(ReqwestTransport::new(&TransportConfig::default())?);
    Ok(Arc::clone(DEFAULT_TRANSPORT.get_or_init(|| built)))
}

#[cfg(test)]
mod tests {
    use super::{Completion, Exchange, ReqwestTransport};
    use crate::config::TransportConfig;
    use crate::error::FluentReqError;

    #[test]
    fn exchange_keeps_header_order() {
        let mut exchange = Exchange::open("GET", "/a");
        exchange.set_request_header("x-one", "1");
        exchange.set_request_header("x-two", "2");
        let exchange = exchange.with_body(Some("data".to_string()));
        assert_eq!(exchange.headers[0].0, "x-one");
        assert_eq!(exchange.headers[1].0, "x-two");
        assert_eq!(exchange.body.as_deref(), Some("data"));
    }

    #[test]
    fn failed_completion_has_status_zero() {
        let completion = Completion::failed("connection refused");
        assert_eq!(completion.status, 0);
        assert_eq!(completion.status_text, "connection refused");
        assert!(completion.body.is_empty());
    }

    #[test]
    fn resolve_url_joins_relative_paths() {
        let config = TransportConfig {
            base_url: Some("http://api.example.com/v1/".to_string()),
            ..TransportConfig::default()
        };
        let transport = ReqwestTransport::new(&config).expect("transport");
        let url = transport.resolve_url("users/42?sort=name").expect("url");
        assert_eq!(url.as_str(), "http://api.example.com/v1/users/42?sort=name");
    }

    #[test]
    fn resolve_url_requires_base_for_relative() {
        let transport = ReqwestTransport::new(&TransportConfig::default()).expect("transport");
        let err = transport.resolve_url("/users/42").expect_err("relative");
        assert!(matches!(err, FluentReqError::InvalidUrl(_)));
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let config = TransportConfig {
            base_url: Some("not a url".to_string()),
            ..TransportConfig::default()
        };
        let err = ReqwestTransport::new(&config).expect_err("invalid base");
        assert!(matches!(err, FluentReqError::InvalidUrl(_)));
    }
}
