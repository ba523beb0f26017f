//! Configuration management
//!
//! Settings are resolved in this order:
//! 1. Environment variables
//! 2. `twicat.toml` in the current directory
//! 3. Defaults
//!
//! `${VAR_NAME}` inside the TOML file is expanded from the environment.
//! Credentials are never part of the configuration; they are always prompted.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{CoreError, Result};

/// Default config file name
pub const CONFIG_FILE: &str = "twicat.toml";

/// Telephony provider settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProviderConfig {
    /// REST API base URL
    #[serde(default = "default_provider_base_url")]
    pub base_url: String,

    /// Request timeout applied to every HTTP call
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: default_provider_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl ProviderConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Tunnel daemon settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TunnelConfig {
    /// Executable started as `<binary> http <port>`
    #[serde(default = "default_tunnel_binary")]
    pub binary: String,

    /// Base URL of the daemon's local status API
    #[serde(default = "default_inspector_url")]
    pub inspector_url: String,

    /// Number of status API queries before giving up (1 = single attempt)
    #[serde(default = "default_inspect_attempts")]
    pub inspect_attempts: u32,

    /// Initial delay between status API queries, doubled after each miss
    #[serde(default = "default_inspect_backoff_ms")]
    pub inspect_backoff_ms: u64,
}

impl Default for TunnelConfig {
    fn default() -> Self {
        Self {
            binary: default_tunnel_binary(),
            inspector_url: default_inspector_url(),
            inspect_attempts: default_inspect_attempts(),
            inspect_backoff_ms: default_inspect_backoff_ms(),
        }
    }
}

impl TunnelConfig {
    pub fn inspect_backoff(&self) -> Duration {
        Duration::from_millis(self.inspect_backoff_ms)
    }
}

/// Callback listener settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ListenerConfig {
    /// Interface to bind; the port is always picked by the OS
    #[serde(default = "default_listener_host")]
    pub host: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            host: default_listener_host(),
        }
    }
}

/// Main configuration for twicat
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    #[serde(default)]
    pub provider: ProviderConfig,

    #[serde(default)]
    pub tunnel: TunnelConfig,

    #[serde(default)]
    pub listener: ListenerConfig,
}

fn default_provider_base_url() -> String {
    "https://api.twilio.com".to_string()
}

fn default_timeout_secs() -> u64 {
    5
}

fn default_tunnel_binary() -> String {
    "ngrok".to_string()
}

fn default_inspector_url() -> String {
    "http://127.0.0.1:4040".to_string()
}

fn default_inspect_attempts() -> u32 {
    1
}

fn default_inspect_backoff_ms() -> u64 {
    500
}

fn default_listener_host() -> String {
    "0.0.0.0".to_string()
}

impl Config {
    /// Expand `${VAR_NAME}` references from the environment.
    ///
    /// Unknown variables expand to an empty string.
    fn expand_env_vars(value: &str) -> String {
        let mut result = String::new();
        let mut chars = value.chars().peekable();

        while let Some(c) = chars.next() {
            if c == '$' && chars.peek() == Some(&'{') {
                chars.next();

                let mut var_name = String::new();
                for c in chars.by_ref() {
                    if c == '}' {
                        break;
                    }
                    var_name.push(c);
                }

                if let Ok(env_value) = std::env::var(&var_name) {
                    result.push_str(&env_value);
                }
            } else {
                result.push(c);
            }
        }

        result
    }

    /// Parse TOML text (after env expansion)
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let expanded = Self::expand_env_vars(content);
        toml::from_str(&expanded)
            .map_err(|e| CoreError::Config(format!("Failed to parse TOML: {}", e)))
    }

    /// Load a TOML file, then apply environment overrides
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| CoreError::Config(format!("Failed to read config file: {}", e)))?;

        let mut config = Self::from_toml_str(&content)?;
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Load `twicat.toml` if present, otherwise defaults plus environment
    pub fn load() -> Result<Self> {
        if Path::new(CONFIG_FILE).exists() {
            debug!("Loading configuration from {}", CONFIG_FILE);
            return Self::from_toml_file(CONFIG_FILE);
        }
        Self::from_env()
    }

    /// Defaults with environment overrides applied
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env_overrides()?;
        Ok(config)
    }

    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Some(url) = non_empty_var("TWICAT_PROVIDER_BASE_URL") {
            self.provider.base_url = url;
        }
        if let Some(secs) = non_empty_var("TWICAT_HTTP_TIMEOUT_SECS") {
            self.provider.timeout_secs = parse_var("TWICAT_HTTP_TIMEOUT_SECS", &secs)?;
        }

        if let Some(binary) = non_empty_var("TWICAT_TUNNEL_BINARY") {
            self.tunnel.binary = binary;
        }
        if let Some(url) = non_empty_var("TWICAT_INSPECTOR_URL") {
            self.tunnel.inspector_url = url;
        }
        if let Some(attempts) = non_empty_var("TWICAT_INSPECT_ATTEMPTS") {
            self.tunnel.inspect_attempts = parse_var("TWICAT_INSPECT_ATTEMPTS", &attempts)?;
        }
        if let Some(ms) = non_empty_var("TWICAT_INSPECT_BACKOFF_MS") {
            self.tunnel.inspect_backoff_ms = parse_var("TWICAT_INSPECT_BACKOFF_MS", &ms)?;
        }

        if let Some(host) = non_empty_var("TWICAT_LISTENER_HOST") {
            self.listener.host = host;
        }

        self.validate()
    }

    /// Reject values that would make the run meaningless
    pub fn validate(&self) -> Result<()> {
        if self.provider.timeout_secs == 0 {
            return Err(CoreError::Config("provider.timeout_secs must be > 0".to_string()));
        }
        if self.tunnel.inspect_attempts == 0 {
            return Err(CoreError::Config("tunnel.inspect_attempts must be > 0".to_string()));
        }
        if self.tunnel.binary.trim().is_empty() {
            return Err(CoreError::Config("tunnel.binary must not be empty".to_string()));
        }
        Ok(())
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

fn parse_var<T: std::str::FromStr>(name: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| CoreError::Config(format!("{} has an invalid value: {}", name, value)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.provider.base_url, "https://api.twilio.com");
        assert_eq!(config.provider.timeout(), Duration::from_secs(5));
        assert_eq!(config.tunnel.binary, "ngrok");
        assert_eq!(config.tunnel.inspector_url, "http://127.0.0.1:4040");
        assert_eq!(config.tunnel.inspect_attempts, 1);
        assert_eq!(config.listener.host, "0.0.0.0");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_toml_partial() {
        let config = Config::from_toml_str(
            r#"
            [tunnel]
            inspect_attempts = 4
            inspect_backoff_ms = 250
            "#,
        )
        .unwrap();

        assert_eq!(config.tunnel.inspect_attempts, 4);
        assert_eq!(config.tunnel.inspect_backoff(), Duration::from_millis(250));
        assert_eq!(config.tunnel.binary, "ngrok");
        assert_eq!(config.provider, ProviderConfig::default());
    }

    #[test]
    fn test_from_toml_invalid() {
        let err = Config::from_toml_str("[provider]\ntimeout_secs = \"soon\"").unwrap_err();
        assert!(matches!(err, CoreError::Config(_)));
    }

    #[test]
    fn test_expand_env_vars() {
        unsafe {
            std::env::set_var("TWICAT_TEST_EXPAND_VAR", "/opt/bin/ngrok");
        }

        let result = Config::expand_env_vars("binary = \"${TWICAT_TEST_EXPAND_VAR}\"");
        assert_eq!(result, "binary = \"/opt/bin/ngrok\"");

        let result = Config::expand_env_vars("prefix_${TWICAT_TEST_MISSING_VAR}_suffix");
        assert_eq!(result, "prefix__suffix");

        unsafe {
            std::env::remove_var("TWICAT_TEST_EXPAND_VAR");
        }
    }

    #[test]
    fn test_expand_env_vars_no_braces() {
        assert_eq!(Config::expand_env_vars("$HOME and $"), "$HOME and $");
    }

    #[test]
    fn test_from_toml_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[listener]\nhost = \"127.0.0.1\"").unwrap();

        let config = Config::from_toml_file(file.path()).unwrap();
        assert_eq!(config.listener.host, "127.0.0.1");
    }

    #[test]
    fn test_validate_rejects_zero_attempts() {
        let mut config = Config::default();
        config.tunnel.inspect_attempts = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.provider.timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_parse_var() {
        assert_eq!(parse_var::<u32>("X", " 3 ").unwrap(), 3);
        assert!(parse_var::<u32>("X", "three").is_err());
    }
}
