//! Runtime server configuration.

use std::path::PathBuf;
use std::time::Duration;

use relay_settings::ServerSettings;

/// Configuration the running server reads.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServerConfig {
    /// Host to bind.
    pub host: String,
    /// Port to bind (`0` for auto-assign).
    pub port: u16,
    /// Time between keep-alive writes on each event stream.
    pub keepalive_interval: Duration,
    /// Frames buffered per subscriber before it counts as stalled.
    pub subscriber_buffer: usize,
    /// Directory served at `/`, if any.
    pub static_dir: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 0,
            keepalive_interval: Duration::from_secs(10),
            subscriber_buffer: 256,
            static_dir: None,
        }
    }
}

impl From<&ServerSettings> for ServerConfig {
    fn from(settings: &ServerSettings) -> Self {
        Self {
            host: settings.host.clone(),
            port: settings.port,
            keepalive_interval: Duration::from_millis(settings.keepalive_interval_ms),
            subscriber_buffer: settings.subscriber_buffer,
            static_dir: settings.static_dir.clone(),
        }
    }
}

impl ServerConfig {
    /// `host:port` as passed to the listener.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
