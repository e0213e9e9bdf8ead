//! HTTP request/response module
//!
//! This module provides the fluent request builder, the response wrapper and
//! the transport port the builder dispatches through.

pub mod diagnostics;
pub mod notify;
pub mod request;
pub mod response;
pub mod template;
pub mod transport;

pub use notify::{Notifier, StderrNotifier};
pub use request::{http_req, RequestBody, RequestBuilder};
pub use response::Response;
pub use transport::{
    default_transport, set_default_transport, Completion, Exchange, ReqwestTransport, Transport,
};
