//! Error types for twicat-provider

use thiserror::Error;

/// twicat-provider error type
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Transport failure (DNS, TLS, timeout, connection reset)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider answered with a non-2xx status
    #[error("Twilio API error {status}: {message}")]
    Api {
        status: u16,
        code: Option<i64>,
        message: String,
    },

    /// The provider answered 2xx but the body was not what we expected
    #[error("Failed to decode response: {0}")]
    Decode(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, ProviderError>;
