//! Settings loading with deep merge and environment variable overrides.
//!
//! Loading flow:
//! 1. Start with compiled [`RelaySettings::default()`]
//! 2. If the settings file exists, deep-merge its values over the defaults
//! 3. Apply `RELAY_*` environment variable overrides (highest priority)
//! 4. Validate
//!
//! Deep merge rules:
//! - Objects are merged recursively (source overrides target per-key)
//! - Arrays and primitives are replaced entirely by source
//! - Null values in source are skipped (preserving target)

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, warn};

use crate::errors::Result;
use crate::types::{KEEPALIVE_MS_RANGE, RelaySettings};

/// Resolve the default settings file (`~/.relay/settings.json`).
pub fn settings_path() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
    PathBuf::from(home).join(".relay").join("settings.json")
}

/// Load settings from the default path with env var overrides.
pub fn load_settings() -> Result<RelaySettings> {
    load_settings_from_path(&settings_path())
}

/// Load settings from `path` with env var overrides.
///
/// A missing file yields the defaults; a malformed one is an error.
pub fn load_settings_from_path(path: &Path) -> Result<RelaySettings> {
    let defaults = serde_json::to_value(RelaySettings::default())?;

    let merged = if path.exists() {
        debug!(?path, "loading settings from file");
        let content = std::fs::read_to_string(path)?;
        let user: Value = serde_json::from_str(&content)?;
        deep_merge(defaults, user)
    } else {
        debug!(?path, "settings file not found, using defaults");
        defaults
    };

    let mut settings: RelaySettings = serde_json::from_value(merged)?;
    apply_env_overrides(&mut settings);
    settings.validate()?;
    Ok(settings)
}

/// Recursive deep merge of two JSON values.
pub fn deep_merge(target: Value, source: Value) -> Value {
    match (target, source) {
        (Value::Object(mut target_map), Value::Object(source_map)) => {
            for (key, source_val) in source_map {
                if source_val.is_null() {
                    continue;
                }
                let merged = if let Some(target_val) = target_map.remove(&key) {
                    deep_merge(target_val, source_val)
                } else {
                    source_val
                };
                let _ = target_map.insert(key, merged);
            }
            Value::Object(target_map)
        }
        (_, source) => source,
    }
}

/// Apply `RELAY_*` overrides from the process environment.
pub fn apply_env_overrides(settings: &mut RelaySettings) {
    apply_overrides(settings, |name| std::env::var(name).ok());
}

/// Apply `RELAY_*` overrides read through `lookup`.
///
/// Empty values count as unset. Values that fail to parse or fall outside
/// their range are logged and ignored, leaving the file/default value.
pub fn apply_overrides(settings: &mut RelaySettings, lookup: impl Fn(&str) -> Option<String>) {
    let read = |name: &str| lookup(name).filter(|v| !v.is_empty());

    if let Some(v) = read("RELAY_HOST") {
        settings.server.host = v;
    }
    if let Some(v) = read("RELAY_PORT") {
        match parse_u16_range(&v, 1, 65535) {
            Some(port) => settings.server.port = port,
            None => warn!(key = "RELAY_PORT", value = %v, "invalid port env var, ignoring"),
        }
    }
    if let Some(v) = read("RELAY_KEEPALIVE_MS") {
        match parse_u64_range(&v, *KEEPALIVE_MS_RANGE.start(), *KEEPALIVE_MS_RANGE.end()) {
            Some(ms) => settings.server.keepalive_interval_ms = ms,
            None => warn!(key = "RELAY_KEEPALIVE_MS", value = %v, "invalid u64 env var, ignoring"),
        }
    }
    if let Some(v) = read("RELAY_SUBSCRIBER_BUFFER") {
        match parse_usize_range(&v, 1, 65_536) {
            Some(n) => settings.server.subscriber_buffer = n,
            None => {
                warn!(
                    key = "RELAY_SUBSCRIBER_BUFFER",
                    value = %v,
                    "invalid usize env var, ignoring"
                );
            }
        }
    }
    if let Some(v) = read("RELAY_STATIC_DIR") {
        settings.server.static_dir = Some(PathBuf::from(v));
    }
    if let Some(v) = read("RELAY_LOG_LEVEL") {
        settings.logging.level = v;
    }
}

/// Parse a string as a `u16` within a range.
pub fn parse_u16_range(val: &str, min: u16, max: u16) -> Option<u16> {
    let n: u16 = val.trim().parse().ok()?;
    (min..=max).contains(&n).then_some(n)
}

/// Parse a string as a `u64` within a range.
pub fn parse_u64_range(val: &str, min: u64, max: u64) -> Option<u64> {
    let n: u64 = val.trim().parse().ok()?;
    (min..=max).contains(&n).then_some(n)
}

/// Parse a string as a `usize` within a range.
pub fn parse_usize_range(val: &str, min: usize, max: usize) -> Option<usize> {
    let n: usize = val.trim().parse().ok()?;
    (min..=max).contains(&n).then_some(n)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::SettingsError;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    // ── deep_merge ──────────────────────────────────────────────────

    #[test]
    fn merge_nested_override() {
        let target = serde_json::json!({"server": {"port": 8080, "host": "localhost"}});
        let source = serde_json::json!({"server": {"port": 9090}});
        let merged = deep_merge(target, source);
        assert_eq!(merged["server"]["port"], 9090);
        assert_eq!(merged["server"]["host"], "localhost");
    }

    #[test]
    fn merge_null_preserves_target() {
        let target = serde_json::json!({"a": 1, "b": 2});
        let merged = deep_merge(target, serde_json::json!({"a": null}));
        assert_eq!(merged["a"], 1);
        assert_eq!(merged["b"], 2);
    }

    #[test]
    fn merge_primitive_replaces_object() {
        let target = serde_json::json!({"a": {"nested": true}});
        let merged = deep_merge(target, serde_json::json!({"a": 42}));
        assert_eq!(merged["a"], 42);
    }

    #[test]
    fn merge_adds_new_keys() {
        let merged = deep_merge(serde_json::json!({"a": 1}), serde_json::json!({"b": 2}));
        assert_eq!(merged, serde_json::json!({"a": 1, "b": 2}));
    }

    // ── load_settings_from_path ─────────────────────────────────────

    #[test]
    fn load_missing_file_returns_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = load_settings_from_path(&dir.path().join("absent.json")).unwrap();
        assert_eq!(settings.server.keepalive_interval_ms, 10_000);
        assert!(!settings.logging.level.is_empty());
    }

    #[test]
    fn load_partial_json_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(
            &path,
            r#"{
                "server": {"keepaliveIntervalMs": 2500, "staticDir": "public"},
                "logging": {"level": "debug"}
            }"#,
        )
        .unwrap();

        let settings = load_settings_from_path(&path).unwrap();
        assert_eq!(settings.server.keepalive_interval_ms, 2500);
        assert_eq!(settings.server.static_dir, Some(PathBuf::from("public")));
        assert_eq!(settings.server.subscriber_buffer, 256);
        assert_eq!(settings.logging.level, "debug");
    }

    #[test]
    fn load_null_keeps_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"server": {"host": null}}"#).unwrap();
        let settings = load_settings_from_path(&path).unwrap();
        assert_eq!(settings.server.host, "0.0.0.0");
    }

    #[test]
    fn load_invalid_json_returns_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "not valid json").unwrap();
        let err = load_settings_from_path(&path).unwrap_err();
        assert!(matches!(err, SettingsError::Json(_)));
    }

    #[test]
    fn load_wrong_type_returns_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"server": {"port": "eighty"}}"#).unwrap();
        assert!(matches!(
            load_settings_from_path(&path).unwrap_err(),
            SettingsError::Json(_)
        ));
    }

    #[test]
    fn load_zero_keepalive_fails_validation() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"server": {"keepaliveIntervalMs": 0}}"#).unwrap();
        assert!(matches!(
            load_settings_from_path(&path).unwrap_err(),
            SettingsError::InvalidValue(_)
        ));
    }

    #[test]
    fn load_huge_keepalive_fails_validation() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"server": {"keepaliveIntervalMs": 86400000000}}"#).unwrap();
        assert!(matches!(
            load_settings_from_path(&path).unwrap_err(),
            SettingsError::InvalidValue(_)
        ));
    }

    // ── apply_overrides ─────────────────────────────────────────────

    #[test]
    fn overrides_apply() {
        let mut s = RelaySettings::default();
        apply_overrides(
            &mut s,
            env(&[
                ("RELAY_HOST", "127.0.0.1"),
                ("RELAY_PORT", "9001"),
                ("RELAY_KEEPALIVE_MS", "500"),
                ("RELAY_SUBSCRIBER_BUFFER", "16"),
                ("RELAY_STATIC_DIR", "/srv/chat"),
                ("RELAY_LOG_LEVEL", "trace"),
            ]),
        );
        assert_eq!(s.server.host, "127.0.0.1");
        assert_eq!(s.server.port, 9001);
        assert_eq!(s.server.keepalive_interval_ms, 500);
        assert_eq!(s.server.subscriber_buffer, 16);
        assert_eq!(s.server.static_dir, Some(PathBuf::from("/srv/chat")));
        assert_eq!(s.logging.level, "trace");
    }

    #[test]
    fn invalid_overrides_are_ignored() {
        let mut s = RelaySettings::default();
        apply_overrides(
            &mut s,
            env(&[
                ("RELAY_PORT", "0"),
                ("RELAY_KEEPALIVE_MS", "fast"),
                ("RELAY_SUBSCRIBER_BUFFER", "0"),
                ("RELAY_HOST", ""),
            ]),
        );
        assert_eq!(s, RelaySettings::default());
    }

    // ── parse_*_range ───────────────────────────────────────────────

    #[test]
    fn parse_ranges() {
        assert_eq!(parse_u16_range("65535", 1, 65535), Some(65535));
        assert_eq!(parse_u16_range("99999", 1, 65535), None);
        assert_eq!(parse_u64_range(" 1000 ", 100, 600_000), Some(1000));
        assert_eq!(parse_u64_range("50", 100, 600_000), None);
        assert_eq!(parse_usize_range("abc", 1, 10), None);
        assert_eq!(parse_usize_range("10", 1, 10), Some(10));
    }
}
