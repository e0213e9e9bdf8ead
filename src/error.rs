//! Error handling for fluentreq

use thiserror::Error;

/// Main error type for fluentreq operations
#[derive(Error, Debug)]
pub enum FluentReqError {
    #[error("parameter '{name}' missing in url '{template}'")]
    MissingUrlParameter { name: String, template: String },

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Invalid HTTP method: {0}")]
    InvalidMethod(String),

    #[error("Invalid header: {0}")]
    InvalidHeader(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Runtime error: {0}")]
    Runtime(String),
}

/// Result type alias for fluentreq operations
pub type Result<T> = std::result::Result<T, FluentReqError>;
