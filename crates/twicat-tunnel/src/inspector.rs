//! Tunnel daemon status API client

use std::time::Duration;

use reqwest::Client;
use tracing::{debug, info, warn};

use crate::error::{Result, TunnelError};
use crate::types::{Tunnel, TunnelsResponse};

/// Pick the HTTPS tunnel whose local address ends with `:<port>`
pub fn select_tunnel(tunnels: &[Tunnel], port: u16) -> Option<&Tunnel> {
    tunnels.iter().find(|t| t.is_https_for_port(port))
}

/// Queries the daemon's local API for the public URL of a port.
///
/// The query races the daemon's own startup. With the default single
/// attempt a daemon that is not ready yet surfaces as an error; raise
/// `attempts` to poll with doubling backoff instead.
#[derive(Debug, Clone)]
pub struct TunnelInspector {
    client: Client,
    base_url: String,
    attempts: u32,
    backoff: Duration,
}

impl TunnelInspector {
    /// Create an inspector making exactly one attempt per lookup
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            attempts: 1,
            backoff: Duration::ZERO,
        })
    }

    /// Retry up to `attempts` times, sleeping `backoff`, `2 * backoff`, ...
    pub fn with_retry(mut self, attempts: u32, backoff: Duration) -> Self {
        self.attempts = attempts.max(1);
        self.backoff = backoff;
        self
    }

    /// Public HTTPS URL forwarding to `port`
    pub async fn public_url(&self, port: u16) -> Result<String> {
        let mut delay = self.backoff;
        let mut attempt = 1;

        loop {
            match self.query(port).await {
                Ok(url) => {
                    info!(port, url = %url, "Found tunnel");
                    return Ok(url);
                }
                Err(e) if attempt < self.attempts => {
                    warn!(attempt, "Tunnel not ready: {}", e);
                    tokio::time::sleep(delay).await;
                    delay = delay.saturating_mul(2);
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn query(&self, port: u16) -> Result<String> {
        let url = format!("{}/api/tunnels", self.base_url);
        debug!("Querying tunnels at {}", url);

        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(TunnelError::Status(response.status()));
        }

        let tunnels: TunnelsResponse = response
            .json()
            .await
            .map_err(|e| TunnelError::Decode(e.to_string()))?;

        select_tunnel(&tunnels.tunnels, port)
            .map(|t| t.public_url.clone())
            .ok_or(TunnelError::NotFound { port })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn tunnel(proto: &str, addr: &str, url: &str) -> Tunnel {
        serde_json::from_value(json!({
            "public_url": url,
            "proto": proto,
            "config": { "addr": addr }
        }))
        .unwrap()
    }

    fn tunnels_body() -> serde_json::Value {
        json!({
            "tunnels": [
                { "name": "command_line (http)", "public_url": "http://a.ngrok.io", "proto": "http", "config": { "addr": ":9000", "inspect": true } },
                { "name": "command_line", "public_url": "https://b.ngrok.io", "proto": "https", "config": { "addr": "x:9000", "inspect": true } },
                { "name": "other", "public_url": "https://c.ngrok.io", "proto": "https", "config": { "addr": "y:9001", "inspect": true } }
            ],
            "uri": "/api/tunnels"
        })
    }

    #[test]
    fn test_select_tunnel() {
        let tunnels = vec![
            tunnel("http", ":9000", "http://a"),
            tunnel("https", "x:9000", "https://b"),
            tunnel("https", "y:9001", "https://c"),
        ];

        assert_eq!(select_tunnel(&tunnels, 9000).unwrap().public_url, "https://b");
        assert_eq!(select_tunnel(&tunnels, 9001).unwrap().public_url, "https://c");
        assert!(select_tunnel(&tunnels, 9002).is_none());
    }

    #[test]
    fn test_select_tunnel_requires_port_suffix() {
        // :19000 ends with "9000" but not ":9000"
        let tunnels = vec![tunnel("https", "localhost:19000", "https://wrong")];
        assert!(select_tunnel(&tunnels, 9000).is_none());
        assert!(select_tunnel(&tunnels, 19000).is_some());
    }

    #[tokio::test]
    async fn test_public_url() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/tunnels"))
            .respond_with(ResponseTemplate::new(200).set_body_json(tunnels_body()))
            .expect(1)
            .mount(&server)
            .await;

        let inspector = TunnelInspector::new(&server.uri(), Duration::from_secs(5)).unwrap();
        let url = inspector.public_url(9000).await.unwrap();
        assert_eq!(url, "https://b.ngrok.io");
    }

    #[tokio::test]
    async fn test_public_url_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/tunnels"))
            .respond_with(ResponseTemplate::new(200).set_body_json(tunnels_body()))
            .expect(1)
            .mount(&server)
            .await;

        let inspector = TunnelInspector::new(&server.uri(), Duration::from_secs(5)).unwrap();
        let err = inspector.public_url(1234).await.unwrap_err();
        assert!(matches!(err, TunnelError::NotFound { port: 1234 }));
    }

    #[tokio::test]
    async fn test_public_url_bad_json() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/tunnels"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let inspector = TunnelInspector::new(&server.uri(), Duration::from_secs(5)).unwrap();
        let err = inspector.public_url(9000).await.unwrap_err();
        assert!(matches!(err, TunnelError::Decode(_)));
    }

    #[tokio::test]
    async fn test_single_attempt_by_default() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/tunnels"))
            .respond_with(ResponseTemplate::new(502))
            .expect(1)
            .mount(&server)
            .await;

        let inspector = TunnelInspector::new(&server.uri(), Duration::from_secs(5)).unwrap();
        let err = inspector.public_url(9000).await.unwrap_err();
        assert!(matches!(err, TunnelError::Status(s) if s.as_u16() == 502));
    }

    #[tokio::test]
    async fn test_retry_until_tunnel_appears() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/tunnels"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "tunnels": [] })))
            .up_to_n_times(2)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/tunnels"))
            .respond_with(ResponseTemplate::new(200).set_body_json(tunnels_body()))
            .mount(&server)
            .await;

        let inspector = TunnelInspector::new(&server.uri(), Duration::from_secs(5))
            .unwrap()
            .with_retry(3, Duration::from_millis(10));
        let url = inspector.public_url(9000).await.unwrap();
        assert_eq!(url, "https://b.ngrok.io");
    }

    #[tokio::test]
    async fn test_unreachable_daemon() {
        // Nothing listens on port 9 of the loopback
        let inspector = TunnelInspector::new("http://127.0.0.1:9", Duration::from_secs(2)).unwrap();
        let err = inspector.public_url(9000).await.unwrap_err();
        assert!(matches!(err, TunnelError::Http(_)));
    }
}
