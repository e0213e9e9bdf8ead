//! Utility functions and helpers

use crate::error::{FluentReqError, Result};
use url::Url;

/// URL validation utilities
pub struct UrlUtils;

impl UrlUtils {
    /// Validate a base URL, adding `http://` if no scheme is given
    pub fn validate_base_url(input: &str) -> Result<Url> {
        let url_str = if input.contains("://") {
            input.to_string()
        } else {
            format!("http://{}", input)
        };

        let url = Url::parse(&url_str)
            .map_err(|e| FluentReqError::InvalidUrl(format!("Invalid URL '{}': {}", input, e)))?;
        if url.cannot_be_a_base() {
            return Err(FluentReqError::InvalidUrl(format!(
                "URL '{}' cannot be used as a base",
                input
            )));
        }
        Ok(url)
    }
}

/// String utilities
pub struct StringUtils;

impl StringUtils {
    /// Parse `Name: value` header syntax
    pub fn parse_header(input: &str) -> Result<(String, String)> {
        let parts: Vec<&str> = input.splitn(2, ':').collect();
        match parts.as_slice() {
            [key, value] if !key.trim().is_empty() => {
                Ok((key.trim().to_string(), value.trim().to_string()))
            }
            _ => Err(FluentReqError::InvalidHeader(format!(
                "Invalid header format: '{}'. Expected 'key: value'",
                input
            ))),
        }
    }

    /// Parse `name=value` parameter syntax; the value may be empty
    pub fn parse_pair(input: &str) -> Result<(String, String)> {
        match input.split_once('=') {
            Some((name, value)) if !name.is_empty() => Ok((name.to_string(), value.to_string())),
            _ => Err(FluentReqError::Config(format!(
                "Invalid parameter format: '{}'. Expected 'name=value'",
                input
            ))),
        }
    }
}
