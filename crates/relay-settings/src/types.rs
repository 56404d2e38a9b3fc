//! Settings type definitions.
//!
//! Field names are camelCase on the wire. Every struct is `#[serde(default)]`
//! so a settings file may name only the keys it wants to change.

use std::ops::RangeInclusive;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::errors::{Result, SettingsError};

/// Accepted keep-alive interval, in milliseconds, from any source.
pub const KEEPALIVE_MS_RANGE: RangeInclusive<u64> = 100..=600_000;

/// Root settings type.
///
/// ```json
/// { "server": { "port": 9000 }, "logging": { "level": "debug" } }
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RelaySettings {
    /// HTTP listener and stream settings.
    pub server: ServerSettings,
    /// Log output settings.
    pub logging: LoggingSettings,
}

impl RelaySettings {
    /// Reject values that parse but cannot work.
    pub fn validate(&self) -> Result<()> {
        if !KEEPALIVE_MS_RANGE.contains(&self.server.keepalive_interval_ms) {
            return Err(SettingsError::InvalidValue(format!(
                "server.keepaliveIntervalMs must be within {}..={}, got {}",
                KEEPALIVE_MS_RANGE.start(),
                KEEPALIVE_MS_RANGE.end(),
                self.server.keepalive_interval_ms
            )));
        }
        if self.server.subscriber_buffer == 0 {
            return Err(SettingsError::InvalidValue(
                "server.subscriberBuffer must be greater than zero".into(),
            ));
        }
        if self.logging.level.trim().is_empty() {
            return Err(SettingsError::InvalidValue("logging.level is empty".into()));
        }
        Ok(())
    }
}

/// HTTP listener and stream settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerSettings {
    /// Bind address.
    pub host: String,
    /// Bind port (`0` picks a free port).
    pub port: u16,
    /// Interval between keep-alive writes on each event stream, in
    /// milliseconds. Also the worst-case delay before a vanished client is
    /// noticed.
    pub keepalive_interval_ms: u64,
    /// Frames buffered per subscriber before it counts as dead.
    pub subscriber_buffer: usize,
    /// Directory of static assets served at `/`. Disabled when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub static_dir: Option<PathBuf>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            keepalive_interval_ms: 10_000,
            subscriber_buffer: 256,
            static_dir: None,
        }
    }
}

/// Log output settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoggingSettings {
    /// `EnvFilter` directive, e.g. `"info"` or `"relay_server=debug"`.
    /// `RUST_LOG` wins when set.
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}
