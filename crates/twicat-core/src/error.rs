//! Error types for twicat-core

use thiserror::Error;

/// twicat-core error type
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Invalid Account SID")]
    InvalidAccountSid,

    #[error("Invalid Auth Token")]
    InvalidAuthToken,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, CoreError>;
