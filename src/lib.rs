//! fluentreq - a fluent HTTP request builder
//!
//! Requests are configured by chaining calls on a `RequestBuilder` (URL
//! templating, query parameters, method, headers, bearer auth, body, error
//! callback, debug mode) and dispatched once; the outcome is delivered to a
//! success or error callback as a `Response`.

pub mod cli;
pub mod config;
pub mod error;
pub mod exit_code;
pub mod http;
pub mod logging;
pub mod output;
pub mod utils;

pub use error::{FluentReqError, Result};
pub use http::{http_req, RequestBuilder, Response};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
