//! Error types for the twicat binary

use thiserror::Error;
use twicat_provider::ProviderError;
use twicat_tunnel::TunnelError;
use twicat_webhook::WebhookError;

/// Interactive prompt failure
#[derive(Error, Debug)]
pub enum PromptError {
    #[error("^C")]
    Interrupted,

    #[error("^D")]
    Eof,

    #[error("no SMS-capable numbers on this account")]
    NoChoices,

    #[error("terminal error: {0}")]
    Io(#[from] std::io::Error),

    #[error("prompt task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Fatal failure of one step of the startup sequence
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Unable to run server: {0}")]
    Server(WebhookError),

    #[error("Unable to run tunnel: {0}")]
    Tunnel(TunnelError),

    #[error("Failed to read Account SID: {0}")]
    AccountSid(PromptError),

    #[error("Failed to read Auth Token: {0}")]
    AuthToken(PromptError),

    #[error("Failed to fetch numbers. Check your credentials. {0}")]
    FetchNumbers(ProviderError),

    #[error("Failed to select number: {0}")]
    SelectPrompt(PromptError),

    #[error("failed to select number: {0} is not one of the fetched numbers")]
    NumberNotFound(String),

    #[error("Couldn't find the tunnel URL: {0}")]
    TunnelUrl(TunnelError),

    #[error("Couldn't set callback URL: {0}")]
    Callback(ProviderError),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, AppError>;
