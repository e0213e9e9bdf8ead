//! Fluent request builder
//!
//! A `RequestBuilder` is configured through chained `with_*` calls and
//! consumed by one terminal call. The terminal call fires at most one
//! callback: `on_success` for a completed exchange, the registered error
//! callback for a failed one, never both.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use super::diagnostics;
use super::notify::{Notifier, StderrNotifier};
use super::response::Response;
use super::template;
use super::transport::{default_transport, Completion, Exchange, Transport};
use crate::config::RequestConfig;
use crate::error::Result;

type ErrorCallback = Box<dyn FnOnce(Response) + Send + 'static>;

/// Payload accepted by [`RequestBuilder::with_body`].
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// Sent unchanged, without a content type.
    Text(String),
    /// Arrays and objects are JSON-encoded and sent as `application/json`.
    /// Scalars are sent as their plain text; `null` sends no body.
    Json(Value),
}

impl From<String> for RequestBody {
    fn from(body: String) -> Self {
        RequestBody::Text(body)
    }
}

impl From<&str> for RequestBody {
    fn from(body: &str) -> Self {
        RequestBody::Text(body.to_string())
    }
}

impl From<Value> for RequestBody {
    fn from(body: Value) -> Self {
        RequestBody::Json(body)
    }
}

/// Start a new request; shorthand for [`RequestBuilder::new`].
pub fn http_req<I, K, V>(url_template: &str, params: I) -> Result<RequestBuilder>
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    RequestBuilder::new(url_template, params)
}

/// Builder for one request.
pub struct RequestBuilder {
    config: RequestConfig,
    on_error: Option<ErrorCallback>,
    transport: Option<Arc<dyn Transport>>,
    notifier: Arc<dyn Notifier>,
}

impl RequestBuilder {
    /// Expand `{name}` and `:name` placeholders in `url_template` from
    /// `params`, escaping each value.
    ///
    /// Fails with `MissingUrlParameter` when a placeholder has no value.
    pub fn new<I, K, V>(url_template: &str, params: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let params: HashMap<String, String> = params
            .into_iter()
            .map(|(name, value)| (name.into(), value.into()))
            .collect();
        let url = template::expand(url_template, &params)?;

        Ok(Self {
            config: RequestConfig::new(url),
            on_error: None,
            transport: None,
            notifier: Arc::new(StderrNotifier),
        })
    }

    /// Start from a template that needs no parameters.
    pub fn from_template(url_template: &str) -> Result<Self> {
        Self::new(url_template, HashMap::<String, String>::new())
    }

    /// Append query parameters. Repeated calls keep appending.
    pub fn with_params<I, K, V>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        template::append_query(&mut self.config.url, params);
        self
    }

    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.config.method = method.into();
        self
    }

    /// Set `authorization: bearer <token>`.
    pub fn with_bearer_token(self, token: impl AsRef<str>) -> Self {
        let value = format!("bearer {}", token.as_ref());
        self.with_headers([("authorization", value)])
    }

    /// Merge headers; existing names are overwritten.
    pub fn with_headers<I, K, V>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.config.merge_headers(headers);
        self
    }

    /// Attach a body. A `GET` request becomes a `POST`; any other method is
    /// left alone.
    pub fn with_body(mut self, body: impl Into<RequestBody>) -> Self {
        if self.config.method == "GET" {
            self.config.method = "POST".to_string();
        }

        let body: RequestBody = body.into();
        self.config.body = match body {
            RequestBody::Text(text) => Some(text),
            RequestBody::Json(value @ (Value::Array(_) | Value::Object(_))) => {
                self.config
                    .merge_headers([("content-type", "application/json")]);
                Some(value.to_string())
            }
            RequestBody::Json(Value::String(text)) => Some(text),
            RequestBody::Json(Value::Null) => None,
            RequestBody::Json(scalar) => Some(scalar.to_string()),
        };
        self
    }

    /// Serialize `value` and attach it through [`with_body`](Self::with_body).
    pub fn with_json_body<T: Serialize + ?Sized>(self, value: &T) -> Result<Self> {
        let value = serde_json::to_value(value)?;
        Ok(self.with_body(value))
    }

    /// Register the callback that receives failed exchanges.
    pub fn with_on_error<F>(mut self, callback: F) -> Self
    where
        F: FnOnce(Response) + Send + 'static,
    {
        self.on_error = Some(Box::new(callback));
        self
    }

    /// Log successful bodies at debug level and raise an alert on failure.
    pub fn with_debug(mut self) -> Self {
        self.config.debug = true;
        self
    }

    /// Use `transport` instead of the process-wide default.
    pub fn with_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn config(&self) -> &RequestConfig {
        &self.config
    }

    /// Dispatch the request and wait for it to complete.
    ///
    /// An exchange fails when its status is `0` (no response) or `>= 400`.
    /// A failure is logged as a warning and handed to the error callback if
    /// one is registered; it is never returned. Otherwise `on_success`
    /// receives the response.
    pub async fn send<F>(self, on_success: F)
    where
        F: FnOnce(Response),
    {
        let RequestBuilder {
            config,
            on_error,
            transport,
            notifier,
        } = self;
        let config = Arc::new(config);

        let completion = dispatch(&config, transport).await;
        let response = Response::new(
            completion.body,
            completion.status,
            completion.status_text,
            Arc::clone(&config),
        );

        if is_failure(response.status()) {
            let diagnostic = diagnostics::error_message(&response);
            log::warn!("{}", diagnostic);
            if config.debug {
                notifier.alert(&diagnostics::alert_message(&response));
            }
            if let Some(on_error) = on_error {
                on_error(response);
            }
            return;
        }

        if config.debug {
            log::debug!("{}", diagnostics::success_body(&response));
        }
        on_success(response);
    }

    /// Dispatch on the current tokio runtime and return immediately.
    pub fn spawn<F>(self, on_success: F) -> tokio::task::JoinHandle<()>
    where
        F: FnOnce(Response) + Send + 'static,
    {
        tokio::spawn(self.send(on_success))
    }

    /// Like [`send`](Self::send), handing `callback` the parsed JSON body.
    pub async fn send_expecting_json<F>(self, callback: F)
    where
        F: FnOnce(Result<Value>),
    {
        self.send(|response| callback(response.body_json())).await
    }

    /// Like [`send`](Self::send), handing `callback` the raw body.
    pub async fn send_expecting_text<F>(self, callback: F)
    where
        F: FnOnce(String),
    {
        self.send(|response| callback(response.into_body())).await
    }
}

impl fmt::Debug for RequestBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestBuilder")
            .field("config", &self.config)
            .field("on_error", &self.on_error.is_some())
            .field("transport", &self.transport.is_some())
            .finish()
    }
}

fn is_failure(status: u16) -> bool {
    status == 0 || status >= 400
}

async fn dispatch(config: &RequestConfig, transport: Option<Arc<dyn Transport>>) -> Completion {
    let transport = match transport {
        Some(transport) => transport,
        None => match default_transport() {
            Ok(transport) => transport,
            Err(err) => return Completion::failed(err.to_string()),
        },
    };

    let mut exchange = Exchange::open(&config.method, &config.url);
    for (name, value) in &config.headers {
        exchange.set_request_header(name, value);
    }
    let exchange = exchange.with_body(config.body.clone());

    match transport.send(exchange).await {
        Ok(completion) => completion,
        Err(err) => {
            log::debug!("exchange with {} failed: {}", config.url, err);
            Completion::failed(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{http_req, RequestBuilder};
    use crate::error::FluentReqError;
    use serde::Serialize;
    use serde_json::json;

    #[test]
    fn new_substitutes_params() {
        let builder = RequestBuilder::new("/users/{id}", [("id", "42")]).expect("builder");
        assert_eq!(builder.config().url, "/users/42");
        assert_eq!(builder.config().method, "GET");
        assert!(builder.config().headers.is_empty());
        assert!(!builder.config().debug);
    }

    #[test]
    fn new_fails_on_missing_param() {
        let err = RequestBuilder::from_template("/users/{id}").expect_err("missing");
        assert!(matches!(
            err,
            FluentReqError::MissingUrlParameter { ref name, .. } if name == "id"
        ));
    }

    #[test]
    fn http_req_matches_new() {
        let builder = http_req("/teams/:team", [("team", "core")]).expect("builder");
        assert_eq!(builder.config().url, "/teams/core");
    }

    #[test]
    fn with_params_appends_query() {
        let builder = RequestBuilder::new("/users/{id}", [("id", "42")])
            .expect("builder")
            .with_params([("sort", "name")]);
        assert_eq!(builder.config().url, "/users/42?sort=name");
    }

    #[test]
    fn with_headers_merges_last_write_wins() {
        let builder = RequestBuilder::from_template("/")
            .expect("builder")
            .with_headers([("a", "1")])
            .with_headers([("a", "2"), ("b", "3")]);
        let headers = &builder.config().headers;
        assert_eq!(headers.len(), 2);
        assert_eq!(headers["a"], "2");
        assert_eq!(headers["b"], "3");
    }

    #[test]
    fn with_bearer_token_sets_authorization() {
        let builder = RequestBuilder::from_template("/")
            .expect("builder")
            .with_bearer_token("abc")
            .with_bearer_token("xyz");
        assert_eq!(builder.config().headers["authorization"], "bearer xyz");
    }

    #[test]
    fn with_body_json_object_promotes_to_post() {
        let builder = RequestBuilder::from_template("/")
            .expect("builder")
            .with_body(json!({"x": 1}));
        let config = builder.config();
        assert_eq!(config.method, "POST");
        assert_eq!(config.headers["content-type"], "application/json");
        assert_eq!(config.body.as_deref(), Some(r#"{"x":1}"#));
    }

    #[test]
    fn with_body_array_is_json() {
        let builder = RequestBuilder::from_template("/")
            .expect("builder")
            .with_body(json!([1, 2]));
        assert_eq!(builder.config().body.as_deref(), Some("[1,2]"));
        assert_eq!(builder.config().headers["content-type"], "application/json");
    }

    #[test]
    fn with_body_text_keeps_method_and_skips_content_type() {
        let builder = RequestBuilder::from_template("/")
            .expect("builder")
            .with_method("PUT")
            .with_body("raw");
        let config = builder.config();
        assert_eq!(config.method, "PUT");
        assert_eq!(config.body.as_deref(), Some("raw"));
        assert!(!config.headers.contains_key("content-type"));
    }

    #[test]
    fn with_body_scalar_values_are_plain() {
        let builder = RequestBuilder::from_template("/")
            .expect("builder")
            .with_body(json!(5));
        assert_eq!(builder.config().body.as_deref(), Some("5"));
        assert!(builder.config().headers.is_empty());

        let builder = RequestBuilder::from_template("/")
            .expect("builder")
            .with_body(json!(null));
        assert_eq!(builder.config().body, None);
        assert_eq!(builder.config().method, "POST");
    }

    #[test]
    fn with_body_text_promotes_get_to_post() {
        let builder = RequestBuilder::from_template("/")
            .expect("builder")
            .with_body("raw");
        let config = builder.config();
        assert_eq!(config.method, "POST");
        assert_eq!(config.body.as_deref(), Some("raw"));
        assert!(config.headers.is_empty());
    }

    #[test]
    fn with_method_after_body_wins() {
        let builder = RequestBuilder::from_template("/")
            .expect("builder")
            .with_body("raw")
            .with_method("PATCH");
        assert_eq!(builder.config().method, "PATCH");
    }

    #[test]
    fn with_json_body_serializes_structs() {
        #[derive(Serialize)]
        struct NewUser<'a> {
            name: &'a str,
        }

        let builder = RequestBuilder::from_template("/users")
            .expect("builder")
            .with_json_body(&NewUser { name: "ada" })
            .expect("serializable");
        assert_eq!(builder.config().body.as_deref(), Some(r#"{"name":"ada"}"#));
        assert_eq!(builder.config().method, "POST");
    }

    #[test]
    fn with_debug_enables_debug() {
        let builder = RequestBuilder::from_template("/")
            .expect("builder")
            .with_debug();
        assert!(builder.config().debug);
    }
}
