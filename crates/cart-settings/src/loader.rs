//! Settings loading with deep merge and environment variable overrides.
//!
//! Deep merge rules:
//! - Objects are merged recursively (source overrides target per-key)
//! - Arrays and primitives are replaced entirely by source
//! - Null values in source are skipped (preserving target)

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, warn};

use crate::errors::Result;
use crate::types::{cart_dir, CartSettings};

/// Resolve the path to the settings file (`~/.cart/settings.json`).
pub fn settings_path() -> PathBuf {
    cart_dir().join("settings.json")
}

/// Load settings from the default path with env var overrides.
pub fn load_settings() -> Result<CartSettings> {
    load_settings_from_path(&settings_path())
}

/// Load settings from a specific path with env var overrides.
///
/// If the file does not exist, returns defaults. If the file contains
/// invalid JSON, returns an error.
pub fn load_settings_from_path(path: &Path) -> Result<CartSettings> {
    let mut settings = load_file(path)?;
    let _ = apply_env_overrides(&mut settings);
    settings.validate()?;
    Ok(settings)
}

fn load_file(path: &Path) -> Result<CartSettings> {
    let defaults = serde_json::to_value(CartSettings::default())?;

    let merged = if path.exists() {
        debug!(?path, "loading settings from file");
        let content = std::fs::read_to_string(path)?;
        let user: Value = serde_json::from_str(&content)?;
        deep_merge(defaults, user)
    } else {
        debug!(?path, "settings file not found, using defaults");
        defaults
    };

    Ok(serde_json::from_value(merged)?)
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

/// Apply `CART_*` environment variable overrides.
///
/// Invalid values are ignored with a warning and the file/default value stays.
/// Returns the names of the ignored variables.
pub fn apply_env_overrides(settings: &mut CartSettings) -> Vec<&'static str> {
    apply_overrides(settings, |name| std::env::var(name).ok())
}

/// Apply overrides read through `lookup`, which maps a variable name to its value.
/// Returns the names of the variables whose values were rejected.
pub fn apply_overrides(
    settings: &mut CartSettings,
    lookup: impl Fn(&str) -> Option<String>,
) -> Vec<&'static str> {
    let read = |name: &str| lookup(name).filter(|v| !v.is_empty());
    let mut rejected = Vec::new();

    if let Some(v) = read("CART_DB_PATH") {
        settings.database.path = v;
    }
    if let Some(v) = read("CART_BUSY_TIMEOUT_MS") {
        let range = CartSettings::BUSY_TIMEOUT_MS;
        match parse_u64_range(&v, *range.start(), *range.end()) {
            Some(ms) => settings.database.busy_timeout_ms = ms,
            None => {
                warn!(key = "CART_BUSY_TIMEOUT_MS", value = %v, "invalid u64 env var, ignoring");
                rejected.push("CART_BUSY_TIMEOUT_MS");
            }
        }
    }
    if let Some(v) = read("CART_LOG_LEVEL") {
        settings.logging.level = v;
    }
    if let Some(v) = read("CART_LOG_JSON") {
        match parse_bool(&v) {
            Some(json) => settings.logging.json = json,
            None => {
                warn!(key = "CART_LOG_JSON", value = %v, "invalid boolean env var, ignoring");
                rejected.push("CART_LOG_JSON");
            }
        }
    }
    rejected
}

/// Parse a string as a boolean.
///
/// Accepts (case-insensitive): `true`/`1`/`yes`/`on` or `false`/`0`/`no`/`off`.
pub fn parse_bool(val: &str) -> Option<bool> {
    match val.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Parse a string as a `u64` within a range.
pub fn parse_u64_range(val: &str, min: u64, max: u64) -> Option<u64> {
    let n: u64 = val.parse().ok()?;
    (n >= min && n <= max).then_some(n)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::errors::SettingsError;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    // ── deep_merge ──────────────────────────────────────────────────

    #[test]
    fn merge_nested_override() {
        let target = serde_json::json!({"database": {"path": "a.db", "busyTimeoutMs": 5000}});
        let source = serde_json::json!({"database": {"path": "b.db"}});
        let merged = deep_merge(target, source);
        assert_eq!(merged["database"]["path"], "b.db");
        assert_eq!(merged["database"]["busyTimeoutMs"], 5000);
    }

    #[test]
    fn merge_null_preserves_target() {
        let target = serde_json::json!({"a": 1, "b": 2});
        let source = serde_json::json!({"a": null});
        let merged = deep_merge(target, source);
        assert_eq!(merged["a"], 1);
        assert_eq!(merged["b"], 2);
    }

    #[test]
    fn merge_array_replace() {
        let target = serde_json::json!({"items": [1, 2, 3]});
        let source = serde_json::json!({"items": [4]});
        assert_eq!(deep_merge(target, source)["items"], serde_json::json!([4]));
    }

    // ── load_settings_from_path ─────────────────────────────────────

    #[test]
    fn load_missing_file_returns_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = load_file(&dir.path().join("missing.json")).unwrap();
        assert_eq!(settings, CartSettings::default());
    }

    #[test]
    fn load_partial_json_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"database": {"busyTimeoutMs": 250}}"#).unwrap();

        let settings = load_file(&path).unwrap();
        assert_eq!(settings.database.busy_timeout_ms, 250);
        assert_eq!(settings.database.path, CartSettings::default().database.path);
    }

    #[test]
    fn load_invalid_json_returns_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "not valid json").unwrap();

        let result = load_settings_from_path(&path);
        assert!(matches!(result.unwrap_err(), SettingsError::Json(_)));
    }

    #[test]
    fn load_rejects_oversized_busy_timeout() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"database": {"busyTimeoutMs": 3000000000}}"#).unwrap();

        let result = load_settings_from_path(&path);
        assert!(matches!(result.unwrap_err(), SettingsError::InvalidValue(_)));
    }

    #[test]
    fn load_rejects_invalid_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"database": {"busyTimeoutMs": 0}}"#).unwrap();

        let result = load_settings_from_path(&path);
        assert!(matches!(result.unwrap_err(), SettingsError::InvalidValue(_)));
    }

    // ── overrides ───────────────────────────────────────────────────

    #[test]
    fn overrides_apply() {
        let mut settings = CartSettings::default();
        let rejected = apply_overrides(
            &mut settings,
            env(&[
                ("CART_DB_PATH", "/srv/cart.db"),
                ("CART_BUSY_TIMEOUT_MS", "2500"),
                ("CART_LOG_LEVEL", "debug"),
                ("CART_LOG_JSON", "yes"),
            ]),
        );
        assert_eq!(settings.database.path, "/srv/cart.db");
        assert_eq!(settings.database.busy_timeout_ms, 2500);
        assert_eq!(settings.logging.level, "debug");
        assert!(settings.logging.json);
        assert!(rejected.is_empty());
    }

    #[test]
    fn invalid_overrides_ignored() {
        let mut settings = CartSettings::default();
        let rejected = apply_overrides(
            &mut settings,
            env(&[
                ("CART_DB_PATH", ""),
                ("CART_BUSY_TIMEOUT_MS", "5"),
                ("CART_LOG_JSON", "maybe"),
            ]),
        );
        assert_eq!(settings, CartSettings::default());
        assert_eq!(rejected, vec!["CART_BUSY_TIMEOUT_MS", "CART_LOG_JSON"]);
    }

    #[test]
    fn oversized_timeout_override_reported() {
        let mut settings = CartSettings::default();
        let rejected = apply_overrides(
            &mut settings,
            env(&[("CART_BUSY_TIMEOUT_MS", "3000000000"), ("CART_LOG_LEVEL", "trace")]),
        );
        assert_eq!(rejected, vec!["CART_BUSY_TIMEOUT_MS"]);
        assert_eq!(settings.database.busy_timeout_ms, 5_000);
        assert_eq!(settings.logging.level, "trace");
    }

    #[test]
    fn parse_bool_variants() {
        assert_eq!(parse_bool("ON"), Some(true));
        assert_eq!(parse_bool("0"), Some(false));
        assert_eq!(parse_bool("nah"), None);
    }

    #[test]
    fn parse_u64_range_bounds() {
        assert_eq!(parse_u64_range("100", 100, 200), Some(100));
        assert_eq!(parse_u64_range("201", 100, 200), None);
        assert_eq!(parse_u64_range("-1", 100, 200), None);
    }
}
