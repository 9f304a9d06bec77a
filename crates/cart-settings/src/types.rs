//! Settings type definitions.
//!
//! Field names are camelCase in JSON. Every struct is `#[serde(default)]`, so
//! a partial file only overrides the keys it names.

use std::ops::RangeInclusive;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::errors::{Result, SettingsError};

/// Root settings type.
///
/// ```json
/// {
///   "database": { "path": "/var/lib/cart/cart.db", "busyTimeoutMs": 2000 },
///   "logging": { "level": "debug", "json": true }
/// }
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CartSettings {
    pub database: DatabaseSettings,
    pub logging: LoggingSettings,
}

impl CartSettings {
    /// Accepted `database.busyTimeoutMs` values, from file or environment.
    pub const BUSY_TIMEOUT_MS: RangeInclusive<u64> = 100..=600_000;

    /// Reject values the store cannot be opened with.
    pub fn validate(&self) -> Result<()> {
        if self.database.path.trim().is_empty() {
            return Err(SettingsError::InvalidValue("database.path is empty".into()));
        }
        let ms = self.database.busy_timeout_ms;
        if !Self::BUSY_TIMEOUT_MS.contains(&ms) {
            return Err(SettingsError::InvalidValue(format!(
                "database.busyTimeoutMs must be within {}..={}, got {ms}",
                Self::BUSY_TIMEOUT_MS.start(),
                Self::BUSY_TIMEOUT_MS.end()
            )));
        }
        Ok(())
    }
}

/// SQLite database settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DatabaseSettings {
    /// Database file path.
    pub path: String,
    /// Busy timeout in milliseconds.
    pub busy_timeout_ms: u64,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            path: cart_dir().join("cart.db").to_string_lossy().into_owned(),
            busy_timeout_ms: 5_000,
        }
    }
}

/// Log output settings. `RUST_LOG` takes precedence over `level`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoggingSettings {
    pub level: String,
    /// Emit JSON lines instead of human-readable output.
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// `~/.cart`, falling back to `/tmp/.cart` without a home directory.
pub fn cart_dir() -> PathBuf {
    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/tmp"))
        .join(".cart")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let settings = CartSettings::default();
        assert!(settings.database.path.ends_with("cart.db"));
        assert_eq!(settings.database.busy_timeout_ms, 5_000);
        assert_eq!(settings.logging.level, "info");
        assert!(!settings.logging.json);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn camel_case_keys() {
        let json = serde_json::to_value(CartSettings::default()).unwrap();
        assert!(json["database"].get("busyTimeoutMs").is_some());
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let settings: CartSettings =
            serde_json::from_str(r#"{"logging": {"json": true}}"#).unwrap();
        assert!(settings.logging.json);
        assert_eq!(settings.logging.level, "info");
        assert_eq!(settings.database, DatabaseSettings::default());
    }

    #[test]
    fn validate_rejects_empty_path() {
        let mut settings = CartSettings::default();
        settings.database.path = "  ".into();
        assert!(matches!(settings.validate(), Err(SettingsError::InvalidValue(_))));
    }

    #[test]
    fn validate_rejects_zero_timeout() {
        let mut settings = CartSettings::default();
        settings.database.busy_timeout_ms = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn validate_busy_timeout_bounds() {
        let mut settings = CartSettings::default();
        for ms in [100, 600_000] {
            settings.database.busy_timeout_ms = ms;
            assert!(settings.validate().is_ok(), "{ms}");
        }
        for ms in [99, 600_001, 3_000_000_000, u64::MAX] {
            settings.database.busy_timeout_ms = ms;
            assert!(
                matches!(settings.validate(), Err(SettingsError::InvalidValue(_))),
                "{ms}"
            );
        }
    }
}
