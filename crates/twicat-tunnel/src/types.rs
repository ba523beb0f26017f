//! Tunnel daemon status API types

use serde::Deserialize;

/// `GET /api/tunnels` response
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TunnelsResponse {
    #[serde(default)]
    pub tunnels: Vec<Tunnel>,
}

/// One active tunnel
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Tunnel {
    #[serde(default)]
    pub public_url: String,
    #[serde(default)]
    pub proto: String,
    #[serde(default)]
    pub config: TunnelAddr,
}

/// Local side of a tunnel
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TunnelAddr {
    /// e.g. `http://localhost:9000`
    #[serde(default)]
    pub addr: String,
}

impl Tunnel {
    /// True for the HTTPS tunnel forwarding to `port`
    pub fn is_https_for_port(&self, port: u16) -> bool {
        self.proto == "https" && self.config.addr.ends_with(&format!(":{}", port))
    }
}
