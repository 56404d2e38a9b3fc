//! # relay-settings
//!
//! Configuration with layered sources.
//!
//! Settings are resolved in priority order:
//! 1. **Compiled defaults**: [`RelaySettings::default()`]
//! 2. **Settings file**: `~/.relay/settings.json` or an explicit path,
//!    deep-merged over the defaults
//! 3. **Environment**: `RELAY_*` overrides
//!
//! The binary applies command-line flags on top of the result. There is no
//! process-wide settings singleton: the loaded value is passed down.

#![deny(unsafe_code)]

pub mod errors;
pub mod loader;
pub mod types;

pub use errors::{Result, SettingsError};
pub use loader::{
    apply_env_overrides, apply_overrides, deep_merge, load_settings, load_settings_from_path,
    settings_path,
};
pub use types::{KEEPALIVE_MS_RANGE, LoggingSettings, RelaySettings, ServerSettings};
