//! twicat-core: shared building blocks for twicat
//!
//! Configuration loading, credential validation and the run context that
//! ties the background listener and tunnel watcher to the main sequence.

pub mod config;
pub mod context;
pub mod credentials;
pub mod error;

pub use config::{Config, ListenerConfig, ProviderConfig, TunnelConfig};
pub use context::RunContext;
pub use credentials::{AccountSid, AuthToken, Credentials};
pub use error::{CoreError, Result};
