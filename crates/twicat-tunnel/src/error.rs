//! Error types for twicat-tunnel

use thiserror::Error;

/// twicat-tunnel error type
#[derive(Error, Debug)]
pub enum TunnelError {
    #[error("Failed to start {binary}: {source}")]
    Launch {
        binary: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to stop tunnel process: {0}")]
    Kill(#[source] std::io::Error),

    #[error("Failed to get tunnels: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Tunnel status API returned {0}")]
    Status(reqwest::StatusCode),

    #[error("Failed to decode tunnels: {0}")]
    Decode(String),

    #[error("couldn't find the correct Public URL for port {port}")]
    NotFound { port: u16 },
}

/// Result type alias
pub type Result<T> = std::result::Result<T, TunnelError>;
