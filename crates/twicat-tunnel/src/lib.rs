//! twicat-tunnel: public exposure of the callback listener
//!
//! Starts the tunnel daemon (`ngrok http <port>`) and asks its local status
//! API for the HTTPS URL bound to that port.

pub mod error;
pub mod inspector;
pub mod launcher;
pub mod types;

pub use error::{Result, TunnelError};
pub use inspector::{TunnelInspector, select_tunnel};
pub use launcher::{TunnelHandle, TunnelLauncher};
pub use types::{Tunnel, TunnelsResponse};
