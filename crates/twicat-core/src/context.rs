//! Run context shared between the main sequence and background tasks
//!
//! Replaces process-wide signal and route registration: the listener and
//! the tunnel watcher both receive a clone and observe the same
//! cancellation.

use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Lifecycle handle for one twicat run
#[derive(Debug, Clone, Default)]
pub struct RunContext {
    token: CancellationToken,
}

impl RunContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request shutdown of everything bound to this context
    pub fn shutdown(&self) {
        debug!("Run context cancelled");
        self.token.cancel();
    }

    pub fn is_shutdown(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Resolves once `shutdown` has been called on any clone
    pub async fn cancelled(&self) {
        self.token.cancelled().await
    }
}
