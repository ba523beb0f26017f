//! Error types for twicat-webhook

use thiserror::Error;

/// twicat-webhook error type
#[derive(Error, Debug)]
pub enum WebhookError {
    #[error("Failed to bind listener on {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Server error: {0}")]
    Serve(#[from] std::io::Error),
}

/// Malformed form-encoded callback data
#[derive(Error, Debug, PartialEq, Eq)]
pub enum FormError {
    #[error("invalid URL escape {0:?}")]
    InvalidEscape(String),

    #[error("invalid semicolon separator in query")]
    Semicolon,

    #[error("form data is not valid UTF-8")]
    Utf8,
}

/// Result type alias
pub type Result<T> = std::result::Result<T, WebhookError>;
