//! HTTP response handling

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::config::RequestConfig;
use crate::error::Result;

/// A completed exchange, handed to exactly one callback.
#[derive(Debug, Clone)]
pub struct Response {
    body: String,
    status: u16,
    status_text: String,
    request: Arc<RequestConfig>,
}

impl Response {
    pub fn new(
        body: impl Into<String>,
        status: u16,
        status_text: impl Into<String>,
        request: Arc<RequestConfig>,
    ) -> Self {
        Self {
            body: body.into(),
            status,
            status_text: status_text.into(),
            request,
        }
    }

    /// The raw body, unchanged.
    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn into_body(self) -> String {
        self.body
    }

    /// Parse the body as JSON.
    pub fn body_json(&self) -> Result<Value> {
        Ok(serde_json::from_str(&self.body)?)
    }

    /// Parse the body as JSON into a typed value.
    pub fn body_json_as<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_str(&self.body)?)
    }

    /// True only for status `200`; other 2xx codes are not ok.
    pub fn is_ok(&self) -> bool {
        self.status == 200
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    /// Reason phrase, or the failure reason when status is `0`.
    pub fn status_text(&self) -> &str {
        &self.status_text
    }

    /// Configuration of the request that produced this response.
    pub fn request(&self) -> &RequestConfig {
        &self.request
    }
}
