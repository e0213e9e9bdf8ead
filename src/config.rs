//! Configuration management for fluentreq

use std::collections::HashMap;

/// Method every request starts with.
pub const DEFAULT_METHOD: &str = "GET";

/// Configuration of a single request, owned by one `RequestBuilder`.
///
/// The error callback lives on the builder itself; everything here is plain
/// data so it can be cloned into every `Response` as the originating request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestConfig {
    /// Fully resolved URL, placeholders already substituted.
    pub url: String,
    pub method: String,
    /// Raw payload, already JSON-encoded when a structured value was given.
    pub body: Option<String>,
    /// Header names are compared case-sensitively; last write wins.
    pub headers: HashMap<String, String>,
    pub debug: bool,
}

impl RequestConfig {
    pub fn new(url: impl Into<String>) -> Self {
        RequestConfig {
            url: url.into(),
            method: DEFAULT_METHOD.to_string(),
            body: None,
            headers: HashMap::new(),
            debug: false,
        }
    }

    /// Merge headers into the configuration, overwriting existing names.
    pub fn merge_headers<I, K, V>(&mut self, headers: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (name, value) in headers {
            self.headers.insert(name.into(), value.into());
        }
    }
}

/// Configuration of the reqwest-backed transport.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Base against which relative request URLs are resolved.
    pub base_url: Option<String>,
    pub user_agent: Option<String>,
    /// Proxy URL applied to every scheme.
    pub proxy: Option<String>,
    pub verify_certs: bool,
    pub follow_redirects: bool,
}

impl Default for TransportConfig {
    fn default() -> Self {
        TransportConfig {
            base_url: None,
            user_agent: Some(format!("fluentreq/{}", crate::VERSION)),
            proxy: None,
            verify_certs: true,
            follow_redirects: true,
        }
    }
}
